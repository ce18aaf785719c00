use super::crossings::{boundary_segments, count_crossings, count_segment_crossings};
use super::Layers;
use crate::Canvas;
use petgraph::stable_graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// Chooses the vertical position of every layered node
pub trait PositionStrategy: fmt::Debug {
    fn place(&self, layers: &Layers, canvas: &Canvas) -> Placement;
}

impl<S: PositionStrategy + ?Sized> PositionStrategy for Box<S> {
    fn place(&self, layers: &Layers, canvas: &Canvas) -> Placement {
        (**self).place(layers, canvas)
    }
}

/// Vertical coordinates chosen for the layers, top to bottom in each layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placement {
    pub layers: Vec<Vec<Spot>>,
    pub crossings: usize,

    /// Sum of the vertical distances covered by all edges
    pub edge_length: f32,
}

/// Where one node sits in a placement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spot {
    pub node: NodeIndex,
    pub y: f32,

    /// Position the upstream neighbors pull the node towards
    pub target_y: f32,
}

impl Placement {
    fn compare(&self, other: &Self) -> Ordering {
        self.crossings
            .cmp(&other.crossings)
            .then_with(|| self.edge_length.total_cmp(&other.edge_length))
    }
}

/// Spread every layer evenly in the order left by the ordering step
#[derive(Debug, Clone, Copy, Default)]
pub struct EvenSpread;

impl PositionStrategy for EvenSpread {
    fn place(&self, layers: &Layers, canvas: &Canvas) -> Placement {
        let spots: Vec<Vec<Spot>> = layers
            .nodes
            .iter()
            .map(|layer| {
                layer
                    .iter()
                    .zip(canvas.spread_y(layer.len()))
                    .map(|(&node, y)| Spot { node, y, target_y: y })
                    .collect()
            })
            .collect();

        let edge_length = (1..spots.len())
            .map(|depth| edge_length(layers, &spots[depth - 1], &spots[depth]))
            .sum();
        Placement {
            layers: spots,
            crossings: count_crossings(layers, canvas),
            edge_length,
        }
    }
}

/// Distance measure minimized when looking for a node's target position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Squared,
    Absolute,
}

impl DistanceMetric {
    fn distance(self, a: f32, b: f32) -> f64 {
        let delta = f64::from(a) - f64::from(b);
        match self {
            DistanceMetric::Squared => delta * delta,
            DistanceMetric::Absolute => delta.abs(),
        }
    }
}

/// Bounded layer-by-layer search over node arrangements
///
/// Layers are placed from the roots outwards. Each retained arrangement is
/// extended with candidate orders of the next layer: nodes are grouped by
/// the position their upstream neighbors pull them towards, groups keep
/// their relative order and only nodes sharing a target are permuted. Every
/// layer is spread evenly over the canvas height. After each layer the best
/// `max_arrangements` arrangements by (crossings, edge length) are kept.
///
/// At most `max_arrangements` orders are explored per arrangement and layer,
/// in lexicographic order starting from the ordering step's result, so a cap
/// of 1 simply commits to that result.
#[derive(Debug, Clone)]
pub struct ArrangementSearch {
    pub max_arrangements: usize,

    /// Step between candidate target positions
    pub y_step: f32,
    pub metric: DistanceMetric,
}

impl Default for ArrangementSearch {
    fn default() -> Self {
        Self {
            max_arrangements: 100,
            y_step: 1.0,
            metric: DistanceMetric::Squared,
        }
    }
}

impl PositionStrategy for ArrangementSearch {
    fn place(&self, layers: &Layers, canvas: &Canvas) -> Placement {
        let cap = self.max_arrangements.max(1);
        let Some(first) = layers.nodes.first() else {
            return Placement::default();
        };

        let groups = [first.clone()];
        let positions = canvas.spread_y(first.len());
        let mut arrangements: Vec<Placement> = LayerOrders::new(&groups)
            .take(cap)
            .map(|order| Placement {
                layers: vec![order
                    .into_iter()
                    .zip(&positions)
                    .map(|(node, &y)| Spot { node, y, target_y: y })
                    .collect()],
                crossings: 0,
                edge_length: 0.0,
            })
            .collect();

        for depth in 1..layers.nodes.len() {
            let positions = canvas.spread_y(layers.nodes[depth].len());
            let mut candidates = Vec::new();

            for arrangement in &arrangements {
                let previous = &arrangement.layers[depth - 1];
                let groups = self.group_by_target(layers, depth, previous, canvas);

                for order in LayerOrders::new(&groups).take(cap) {
                    let spots: Vec<_> = order
                        .into_iter()
                        .zip(&positions)
                        .map(|((node, target_y), &y)| Spot { node, y, target_y })
                        .collect();

                    let crossings = layer_crossings(layers, depth, previous, &spots, canvas);
                    let length = edge_length(layers, previous, &spots);

                    let mut extended = arrangement.clone();
                    extended.layers.push(spots);
                    extended.crossings += crossings;
                    extended.edge_length += length;
                    candidates.push(extended);
                }
            }

            candidates.sort_by(Placement::compare);
            let explored = candidates.len();
            candidates.truncate(cap);
            debug!(
                "Layer {depth}: kept {} of {explored} arrangements",
                candidates.len()
            );
            arrangements = candidates;
        }

        arrangements.sort_by(Placement::compare);
        arrangements.into_iter().next().unwrap_or_default()
    }
}

impl ArrangementSearch {
    /// Group a layer's nodes by target position, groups sorted by ascending target
    fn group_by_target(
        &self,
        layers: &Layers,
        depth: usize,
        previous: &[Spot],
        canvas: &Canvas,
    ) -> Vec<Vec<(NodeIndex, f32)>> {
        let placed: HashMap<NodeIndex, f32> =
            previous.iter().map(|spot| (spot.node, spot.y)).collect();

        let mut targets: Vec<_> = layers.nodes[depth]
            .iter()
            .map(|&node| {
                let sources: Vec<_> = layers
                    .predecessors(node)
                    .filter_map(|pred| placed.get(&pred).copied())
                    .collect();
                (node, self.target_y(&sources, canvas.height))
            })
            .collect();
        targets.sort_by(|a, b| a.1.total_cmp(&b.1));

        let mut groups: Vec<Vec<(NodeIndex, f32)>> = Vec::new();
        for target in targets {
            match groups.last_mut() {
                Some(group) if group[0].1 == target.1 => group.push(target),
                _ => groups.push(vec![target]),
            }
        }
        groups
    }

    /// Stepped search for the y minimizing the distance to the upstream neighbors
    ///
    /// Candidates run from 0 up to `height`, exclusive. A height that is not
    /// finite yields 0 like an empty canvas.
    pub(crate) fn target_y(&self, sources: &[f32], height: f32) -> f32 {
        if sources.is_empty() {
            return 0.0;
        }
        let step = if self.y_step.is_finite() && self.y_step > 0.0 {
            self.y_step
        } else {
            1.0
        };
        if !height.is_finite() {
            warn!("Canvas height {height} is not finite, placing nodes at 0");
            return 0.0;
        }
        let steps = (height / step).ceil().max(0.0) as usize;

        let mut best = (f64::INFINITY, 0.0);
        for i in 0..steps {
            let y = i as f32 * step;
            let distance: f64 = sources.iter().map(|&s| self.metric.distance(s, y)).sum();
            if distance < best.0 {
                best = (distance, y);
            }
        }
        best.1
    }
}

fn layer_crossings(
    layers: &Layers,
    depth: usize,
    previous: &[Spot],
    current: &[Spot],
    canvas: &Canvas,
) -> usize {
    let upper_y: HashMap<_, _> = previous.iter().map(|spot| (spot.node, spot.y)).collect();
    let lower_y: HashMap<_, _> = current.iter().map(|spot| (spot.node, spot.y)).collect();
    count_segment_crossings(&boundary_segments(
        layers,
        depth - 1,
        &upper_y,
        &lower_y,
        canvas,
    ))
}

/// Vertical distance covered by the edges between two placed layers
fn edge_length(layers: &Layers, previous: &[Spot], current: &[Spot]) -> f32 {
    let current_y: HashMap<_, _> = current.iter().map(|spot| (spot.node, spot.y)).collect();
    previous
        .iter()
        .flat_map(|spot| {
            layers
                .successors(spot.node)
                .filter_map(|succ| current_y.get(&succ))
                .map(move |&y| (spot.y - y).abs())
        })
        .sum()
}

/// Lazily enumerates layer orders where only members of the same group permute
///
/// Groups stay in place relative to each other. Orders come out in
/// lexicographic order of the in-group positions, the unpermuted order first.
struct LayerOrders<'a, T> {
    groups: &'a [Vec<T>],
    indices: Vec<Vec<usize>>,
    exhausted: bool,
}

impl<'a, T> LayerOrders<'a, T> {
    fn new(groups: &'a [Vec<T>]) -> Self {
        Self {
            groups,
            indices: groups.iter().map(|group| (0..group.len()).collect()).collect(),
            exhausted: false,
        }
    }
}

impl<T: Clone> Iterator for LayerOrders<'_, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        if self.exhausted {
            return None;
        }
        let order = self
            .groups
            .iter()
            .zip(&self.indices)
            .flat_map(|(group, indices)| indices.iter().map(move |&i| group[i].clone()))
            .collect();

        // Advance like an odometer, last group fastest
        self.exhausted = true;
        for indices in self.indices.iter_mut().rev() {
            if next_permutation(indices) {
                self.exhausted = false;
                break;
            }
        }
        Some(order)
    }
}

/// Step to the next lexicographic permutation
///
/// Returns `false` after the last permutation, leaving the slice sorted again.
fn next_permutation(values: &mut [usize]) -> bool {
    let Some(pivot) = values.windows(2).rposition(|pair| pair[0] < pair[1]) else {
        values.reverse();
        return false;
    };
    let Some(successor) = values.iter().rposition(|&v| v > values[pivot]) else {
        return false;
    };
    values.swap(pivot, successor);
    values[pivot + 1..].reverse();
    true
}
