mod crossings;
mod layers;
mod ordering;
mod positions;

use crate::graph::Graph;
use crate::{Canvas, Point};
use petgraph::graphmap::DiGraphMap;
use petgraph::stable_graph::NodeIndex;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use layers::{assign_depths, insert_routing_nodes};

pub use ordering::{OrderingReport, OrderingStrategy, RankHeuristic, Sweep};
pub use positions::{
    ArrangementSearch, DistanceMetric, EvenSpread, Placement, PositionStrategy, Spot,
};

/// Errors that prevent a graph from being laid out
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("graph has a cycle through node {0}")]
    GraphHasCycle(String),

    #[error("node {0} is not reachable from any root")]
    Unreachable(String),

    #[error("none of the root keys name a node of the graph")]
    NoRoots,
}

/// What to do with nodes no root leads to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnreachablePolicy {
    /// Leave them out of the layout, at the origin
    #[default]
    Exclude,

    /// Fail the layout
    Reject,
}

/// Configuration for the layered layout of a rooted DAG
///
/// Layering assigns every node its longest-path depth from the roots and
/// breaks long edges with routing nodes. The ordering strategy then reduces
/// crossings between adjacent layers and the positioning strategy picks the
/// final vertical coordinates.
#[derive(Debug, Clone)]
pub struct LayeredLayout<O = Sweep, P = ArrangementSearch> {
    pub canvas: Canvas,
    pub ordering: O,
    pub positioning: P,
    pub unreachable: UnreachablePolicy,
}

impl<O: Default, P: Default> Default for LayeredLayout<O, P> {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            ordering: O::default(),
            positioning: P::default(),
            unreachable: UnreachablePolicy::default(),
        }
    }
}

impl LayeredLayout {
    /// Create a new layered layout for the given canvas
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            ..Default::default()
        }
    }
}

impl<O, P> LayeredLayout<O, P> {
    /// Replace the ordering strategy
    pub fn with_ordering<T>(self, ordering: T) -> LayeredLayout<T, P> {
        LayeredLayout {
            canvas: self.canvas,
            ordering,
            positioning: self.positioning,
            unreachable: self.unreachable,
        }
    }

    /// Replace the positioning strategy
    pub fn with_positioning<T>(self, positioning: T) -> LayeredLayout<O, T> {
        LayeredLayout {
            canvas: self.canvas,
            ordering: self.ordering,
            positioning,
            unreachable: self.unreachable,
        }
    }

    /// Assign depths and insert routing nodes, without ordering the layers
    ///
    /// # Errors
    /// Returns an error if the graph has a cycle, or if it has unreachable
    /// nodes and the layout rejects them
    pub fn prepare<A: Clone>(&self, graph: &mut Graph<A>) -> Result<Layers, LayoutError> {
        let depth = assign_depths(graph, self.unreachable)?;
        let routing_nodes = insert_routing_nodes(graph);
        debug!("Layered graph of depth {depth:?} with {routing_nodes} routing nodes");

        let mut layers = Layers::from_graph(graph);
        layers.routing_nodes = routing_nodes;
        Ok(layers)
    }
}

impl<O: OrderingStrategy, P: PositionStrategy> LayeredLayout<O, P> {
    /// Compute the ordered layer structure of a graph
    ///
    /// Adds the routing nodes to the graph. Only depends on the graph
    /// structure, so the result can be cached while the structure is unchanged.
    ///
    /// # Errors
    /// See [`LayeredLayout::prepare`]
    pub fn compute_layers<A: Clone>(&self, graph: &mut Graph<A>) -> Result<Layers, LayoutError> {
        let mut layers = self.prepare(graph)?;
        let report = self.ordering.order(&mut layers, &self.canvas);
        layers.crossings = report.crossings;
        layers.rounds = report.rounds;
        Ok(layers)
    }

    /// Compute the coordinates of every layered node
    pub fn compute_positions(&self, layers: &Layers) -> Positions {
        let placement = self.positioning.place(layers, &self.canvas);
        let graph_depth = layers.depth();

        let mut positions = Positions {
            crossings: placement.crossings,
            edge_length: placement.edge_length,
            ..Positions::default()
        };
        for (depth, layer) in placement.layers.iter().enumerate() {
            let x = self.canvas.layer_x(depth, graph_depth);

            let mut spots = layer.clone();
            spots.sort_by(|a, b| a.y.total_cmp(&b.y));
            for (order, spot) in spots.iter().enumerate() {
                positions
                    .points
                    .insert(spot.node, Point::new(x, spot.y).floor());
                positions.order.insert(spot.node, order + 1);
                positions.target_y.insert(spot.node, spot.target_y);
            }
        }
        positions
    }

    /// Write positions back into the graph and derive the edge curves
    pub fn apply<A>(&self, graph: &mut Graph<A>, positions: &Positions) {
        for (&index, &point) in &positions.points {
            let node = graph.node_mut(index);
            node.position = point;
            node.order = positions.order.get(&index).copied().unwrap_or_default();
            node.target_y = positions.target_y.get(&index).copied().unwrap_or(point.y);
        }
        graph.update_bezier_points();
    }
}

/// Layer structure that can be cached and reused
#[derive(Debug, Clone, Default)]
pub struct Layers {
    /// Edges between layered nodes, for neighbor lookups
    pub(crate) graph: DiGraphMap<NodeIndex, ()>,

    /// Nodes of each layer from the roots outwards, in layer order
    pub nodes: Vec<Vec<NodeIndex>>,

    /// Number of edge crossings (quality metric)
    pub crossings: usize,

    pub routing_nodes: usize,

    /// Best crossing count after each ordering round
    pub rounds: Vec<usize>,
}

impl Layers {
    /// Snapshot the layers of a graph whose depths are assigned
    ///
    /// Nodes without a depth and the edges touching them are left out.
    pub fn from_graph<A>(graph: &Graph<A>) -> Self {
        let nodes = graph.layers();

        let mut edges = DiGraphMap::new();
        for &node in nodes.iter().flatten() {
            edges.add_node(node);
        }
        for &node in nodes.iter().flatten() {
            for succ in graph.successors(node) {
                if edges.contains_node(succ) {
                    edges.add_edge(node, succ, ());
                }
            }
        }

        Self {
            graph: edges,
            nodes,
            ..Self::default()
        }
    }

    /// Index of the deepest layer
    pub fn depth(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn successors(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(node, Direction::Outgoing)
    }

    pub fn predecessors(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(node, Direction::Incoming)
    }
}

/// Coordinates computed for the layered nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Positions {
    pub points: HashMap<NodeIndex, Point>,

    /// 1-based rank of every node within its layer, top to bottom
    pub order: HashMap<NodeIndex, usize>,
    pub target_y: HashMap<NodeIndex, f32>,
    pub crossings: usize,
    pub edge_length: f32,
}

/// Figures describing a committed layout
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutSummary {
    pub depth: Option<usize>,
    pub routing_nodes: usize,
    pub crossings: usize,
    pub edge_length: f32,
}
