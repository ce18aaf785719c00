//! Graph model the layout engine works on
//!
//! A [`Graph`] is rebuilt from the host graph on every structural update.
//! Routing nodes inserted during layering live only inside that instance.

mod change;
mod edge;
mod node;

pub use edge::{Edge, LogicalEdge, SharedState};
pub use node::{InteractionState, Node, RoutingRef};

use crate::BezierPoints;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;
use std::ops::Index;
use std::rc::Rc;
use tracing::{error, warn};

/// Keyed directed graph with a designated set of root keys
#[derive(Debug)]
pub struct Graph<A> {
    graph: StableDiGraph<Node<A>, Edge>,
    keys: HashMap<String, NodeIndex>,
    roots: Vec<String>,
    depth_set: bool,
}

impl<A> Default for Graph<A> {
    fn default() -> Self {
        Self {
            graph: StableDiGraph::new(),
            keys: HashMap::new(),
            roots: Vec::new(),
            depth_set: false,
        }
    }
}

impl<A> Index<NodeIndex> for Graph<A> {
    type Output = Node<A>;

    fn index(&self, index: NodeIndex) -> &Node<A> {
        &self.graph[index]
    }
}

impl<A> Index<EdgeIndex> for Graph<A> {
    type Output = Edge;

    fn index(&self, index: EdgeIndex) -> &Edge {
        &self.graph[index]
    }
}

impl<A> Graph<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, or replace the attributes of the node already using `key`
    pub fn add_node(&mut self, key: impl Into<String>, attributes: Option<A>) -> NodeIndex {
        let key = key.into();
        if let Some(&index) = self.keys.get(&key) {
            self.graph[index].attributes = attributes;
            return index;
        }
        let index = self.graph.add_node(Node::new(key.clone(), attributes));
        self.keys.insert(key, index);
        self.depth_set = false;
        index
    }

    /// Add an edge between two existing nodes with its own interaction state
    ///
    /// An edge naming an unknown node is dropped and `None` is returned.
    pub fn add_edge(&mut self, src: &str, dest: &str) -> Option<EdgeIndex> {
        self.add_edge_with_state(src, dest, Rc::new(InteractionState::new()))
    }

    /// Add an edge that shares `state` with other edges
    pub fn add_edge_with_state(
        &mut self,
        src: &str,
        dest: &str,
        state: SharedState,
    ) -> Option<EdgeIndex> {
        let (Some(&src_index), Some(&dest_index)) = (self.keys.get(src), self.keys.get(dest))
        else {
            error!("Can not add edge {src} -> {dest}, source or destination node doesn't exist");
            return None;
        };
        Some(self.connect(src_index, dest_index, state))
    }

    pub(crate) fn connect(&mut self, src: NodeIndex, dest: NodeIndex, state: SharedState) -> EdgeIndex {
        self.depth_set = false;
        self.graph.add_edge(src, dest, Edge::new(state))
    }

    pub(crate) fn add_routing_node(
        &mut self,
        key: String,
        reference: RoutingRef<A>,
        depth: usize,
    ) -> NodeIndex {
        let mut unique = key.clone();
        let mut suffix = 1;
        while self.keys.contains_key(&unique) {
            suffix += 1;
            unique = format!("{key}_{suffix}");
        }
        let index = self.graph.add_node(Node::routing(unique.clone(), reference, depth));
        self.keys.insert(unique, index);
        index
    }

    pub(crate) fn remove_edge(&mut self, edge: EdgeIndex) -> Option<Edge> {
        self.graph.remove_edge(edge)
    }

    /// Replace the root keys, the depth-0 entry points of the layout
    pub fn set_roots<I, S>(&mut self, roots: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roots = roots.into_iter().map(Into::into).collect();
        self.depth_set = false;
    }

    pub fn root_keys(&self) -> &[String] {
        &self.roots
    }

    /// Indices of the root nodes, skipping root keys that name no node
    pub fn root_nodes(&self) -> Vec<NodeIndex> {
        let mut roots = Vec::with_capacity(self.roots.len());
        for key in &self.roots {
            match self.keys.get(key) {
                Some(index) if !roots.contains(index) => roots.push(*index),
                Some(_) => {}
                None => warn!("Root {key} is not a node of the graph"),
            }
        }
        roots
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn index_of(&self, key: &str) -> Option<NodeIndex> {
        self.keys.get(key).copied()
    }

    pub fn node(&self, key: &str) -> Option<&Node<A>> {
        self.index_of(key).map(|index| &self.graph[index])
    }

    /// The underlying petgraph storage, for the traversal algorithms
    pub(crate) fn as_petgraph(&self) -> &StableDiGraph<Node<A>, Edge> {
        &self.graph
    }

    pub(crate) fn node_mut(&mut self, index: NodeIndex) -> &mut Node<A> {
        &mut self.graph[index]
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &Node<A>)> {
        self.graph.node_indices().map(move |index| (index, &self.graph[index]))
    }

    /// Nodes supplied by the host, skipping routing nodes
    pub fn host_nodes(&self) -> impl Iterator<Item = (NodeIndex, &Node<A>)> {
        self.nodes().filter(|(_, node)| !node.is_routing())
    }

    pub fn edge_indices(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    pub fn edge_endpoints(&self, edge: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(edge)
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains_edge(&self, src: &str, dest: &str) -> bool {
        match (self.index_of(src), self.index_of(dest)) {
            (Some(src), Some(dest)) => self.graph.find_edge(src, dest).is_some(),
            _ => false,
        }
    }

    /// Outgoing edges of a node as `(edge, destination)` pairs
    pub fn out_edges(&self, index: NodeIndex) -> impl Iterator<Item = (EdgeIndex, NodeIndex)> + '_ {
        self.graph
            .edges_directed(index, Direction::Outgoing)
            .map(|edge| (edge.id(), edge.target()))
    }

    /// Incoming edges of a node as `(edge, source)` pairs
    pub fn in_edges(&self, index: NodeIndex) -> impl Iterator<Item = (EdgeIndex, NodeIndex)> + '_ {
        self.graph
            .edges_directed(index, Direction::Incoming)
            .map(|edge| (edge.id(), edge.source()))
    }

    pub fn successors(&self, index: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(index, Direction::Outgoing)
    }

    pub fn predecessors(&self, index: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(index, Direction::Incoming)
    }

    /// Destination keys of a node's outgoing edges, looking through routing chains
    pub fn logical_successors(&self, index: NodeIndex) -> Vec<&str> {
        self.successors(index)
            .map(|dest| {
                let node = &self.graph[dest];
                match &node.routing {
                    Some(reference) => reference.dest_key.as_str(),
                    None => node.key.as_str(),
                }
            })
            .collect()
    }

    /// Resolve the host-level endpoints of an edge
    pub fn logical_edge(&self, edge: EdgeIndex) -> Option<LogicalEdge<'_, A>> {
        let (src, dest) = self.graph.edge_endpoints(edge)?;
        let (src, dest) = (&self.graph[src], &self.graph[dest]);
        let state = self.graph[edge].state.as_ref();

        let logical = match src.routing.as_ref().or(dest.routing.as_ref()) {
            Some(reference) => LogicalEdge {
                src_key: &reference.src_key,
                src_attributes: reference.src_attributes.as_ref(),
                dest_key: &reference.dest_key,
                dest_attributes: reference.dest_attributes.as_ref(),
                state,
            },
            None => LogicalEdge {
                src_key: &src.key,
                src_attributes: src.attributes.as_ref(),
                dest_key: &dest.key,
                dest_attributes: dest.attributes.as_ref(),
                state,
            },
        };
        Some(logical)
    }

    /// Largest assigned depth, `None` until depths are assigned
    pub fn depth(&self) -> Option<usize> {
        if !self.depth_set {
            return None;
        }
        self.nodes().filter_map(|(_, node)| node.depth).max()
    }

    pub fn is_depth_set(&self) -> bool {
        self.depth_set
    }

    pub(crate) fn mark_depth_set(&mut self) {
        self.depth_set = true;
    }

    /// Nodes of one layer, sorted by their order within the layer
    pub fn nodes_at_depth(&self, depth: usize) -> Vec<NodeIndex> {
        let mut nodes: Vec<_> = self
            .nodes()
            .filter(|(_, node)| node.depth == Some(depth))
            .map(|(index, node)| (node.order, index))
            .collect();
        nodes.sort();
        nodes.into_iter().map(|(_, index)| index).collect()
    }

    /// All layers from the roots outwards, each sorted by order
    pub fn layers(&self) -> Vec<Vec<NodeIndex>> {
        match self.depth() {
            Some(depth) => (0..=depth).map(|d| self.nodes_at_depth(d)).collect(),
            None => Vec::new(),
        }
    }

    /// Recompute every edge's bezier control points from its endpoints' positions
    pub(crate) fn update_bezier_points(&mut self) {
        let edges: Vec<_> = self.graph.edge_indices().collect();
        for edge in edges {
            let Some((src, dest)) = self.graph.edge_endpoints(edge) else {
                continue;
            };
            let bezier =
                BezierPoints::between(self.graph[src].position, self.graph[dest].position);
            self.graph[edge].bezier = bezier;
        }
    }
}

impl<A: Clone> Graph<A> {
    /// Copy host payloads from a freshly converted graph into this one
    ///
    /// Positions, depths and routing nodes are left untouched; the copies of
    /// the payloads held by routing references are refreshed as well.
    pub fn refresh_attributes(&mut self, other: &Graph<A>) {
        for (key, &index) in &self.keys {
            if self.graph[index].is_routing() {
                continue;
            }
            if let Some(source) = other.node(key) {
                self.graph[index].attributes = source.attributes.clone();
            }
        }

        let routing: Vec<_> = self
            .nodes()
            .filter(|(_, node)| node.is_routing())
            .map(|(index, _)| index)
            .collect();
        for index in routing {
            let Some(reference) = self.graph[index].routing.clone() else {
                continue;
            };
            let src_attributes = self.node(&reference.src_key).and_then(|n| n.attributes.clone());
            let dest_attributes = self.node(&reference.dest_key).and_then(|n| n.attributes.clone());
            if let Some(reference) = self.graph[index].routing.as_mut() {
                reference.src_attributes = src_attributes;
                reference.dest_attributes = dest_attributes;
            }
        }
    }
}
