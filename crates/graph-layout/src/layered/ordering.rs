use super::crossings::{adjacent_crossings, count_crossings};
use super::Layers;
use crate::Canvas;
use petgraph::stable_graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, trace};

/// Orders the nodes of every layer to reduce edge crossings
pub trait OrderingStrategy: fmt::Debug {
    /// Reorder `layers.nodes` in place, leaving the best order found
    fn order(&self, layers: &mut Layers, canvas: &Canvas) -> OrderingReport;
}

impl<S: OrderingStrategy + ?Sized> OrderingStrategy for Box<S> {
    fn order(&self, layers: &mut Layers, canvas: &Canvas) -> OrderingReport {
        (**self).order(layers, canvas)
    }
}

/// Outcome of an ordering pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderingReport {
    /// Crossings of the retained order
    pub crossings: usize,

    /// Best crossing count known after each round
    pub rounds: Vec<usize>,
}

/// How a node's rank is derived from its neighbors' ranks in the adjacent layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankHeuristic {
    #[default]
    Median,
    Barycenter,
}

impl RankHeuristic {
    fn rank(self, values: &mut [f32]) -> Option<f32> {
        match self {
            RankHeuristic::Median => median(values),
            RankHeuristic::Barycenter => {
                (!values.is_empty()).then(|| values.iter().sum::<f32>() / values.len() as f32)
            }
        }
    }
}

/// Median of a list, the mean of the two middle values for even lengths
pub(crate) fn median(values: &mut [f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f32::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

/// Alternating layer sweeps followed by adjacent swaps
///
/// Even rounds sweep from the roots outwards ranking nodes by their upstream
/// neighbors, odd rounds sweep back using downstream neighbors. After each
/// sweep, adjacent nodes are swapped while that strictly reduces crossings.
/// The best order seen over all rounds is kept.
#[derive(Debug, Clone)]
pub struct Sweep {
    pub rounds: usize,
    pub heuristic: RankHeuristic,

    /// Stop early once the best order has at most this many crossings
    pub max_intersections: usize,
}

impl Default for Sweep {
    fn default() -> Self {
        Self {
            rounds: 3,
            heuristic: RankHeuristic::Median,
            max_intersections: 0,
        }
    }
}

impl OrderingStrategy for Sweep {
    fn order(&self, layers: &mut Layers, canvas: &Canvas) -> OrderingReport {
        let mut best = layers.nodes.clone();
        let mut best_crossings = count_crossings(layers, canvas);
        let mut rounds = Vec::with_capacity(self.rounds);

        for round in 0..self.rounds {
            if best_crossings <= self.max_intersections {
                debug!("Ordering reached {best_crossings} crossings after {round} rounds");
                break;
            }

            if round % 2 == 0 {
                self.sweep_down(layers);
            } else {
                self.sweep_up(layers);
            }
            transpose(layers, canvas);

            let crossings = count_crossings(layers, canvas);
            debug!("Ordering round {round}: {crossings} crossings, best {best_crossings}");
            if crossings < best_crossings {
                best = layers.nodes.clone();
                best_crossings = crossings;
            }
            rounds.push(best_crossings);
        }

        layers.nodes = best;
        OrderingReport {
            crossings: best_crossings,
            rounds,
        }
    }
}

impl Sweep {
    fn sweep_down(&self, layers: &mut Layers) {
        for depth in 1..layers.nodes.len() {
            let ranks = ranks(&layers.nodes[depth - 1]);
            let keys: Vec<_> = layers.nodes[depth]
                .iter()
                .map(|&node| {
                    let mut values: Vec<_> = layers
                        .predecessors(node)
                        .filter_map(|pred| ranks.get(&pred).copied())
                        .collect();
                    self.heuristic.rank(&mut values)
                })
                .collect();
            reorder(&mut layers.nodes[depth], &keys);
        }
    }

    fn sweep_up(&self, layers: &mut Layers) {
        for depth in (0..layers.nodes.len().saturating_sub(1)).rev() {
            let ranks = ranks(&layers.nodes[depth + 1]);
            let keys: Vec<_> = layers.nodes[depth]
                .iter()
                .map(|&node| {
                    let mut values: Vec<_> = layers
                        .successors(node)
                        .filter_map(|succ| ranks.get(&succ).copied())
                        .collect();
                    self.heuristic.rank(&mut values)
                })
                .collect();
            reorder(&mut layers.nodes[depth], &keys);
        }
    }
}

/// 1-based rank of every node of a layer
fn ranks(layer: &[NodeIndex]) -> HashMap<NodeIndex, f32> {
    layer
        .iter()
        .enumerate()
        .map(|(i, &node)| (node, (i + 1) as f32))
        .collect()
}

/// Sort a layer by the computed keys
///
/// Nodes without a key keep their current rank as key; ties keep the current order.
fn reorder(layer: &mut Vec<NodeIndex>, keys: &[Option<f32>]) {
    let mut keyed: Vec<_> = layer
        .iter()
        .zip(keys)
        .enumerate()
        .map(|(i, (&node, key))| (key.unwrap_or((i + 1) as f32), node))
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    *layer = keyed.into_iter().map(|(_, node)| node).collect();
}

/// Swap adjacent nodes while it strictly reduces crossings around their layer
///
/// Every kept swap lowers the total crossing count, so this stops at a local
/// optimum.
pub(crate) fn transpose(layers: &mut Layers, canvas: &Canvas) {
    loop {
        let mut improved = false;

        for depth in 0..layers.nodes.len() {
            for i in 0..layers.nodes[depth].len().saturating_sub(1) {
                let crossings_before = adjacent_crossings(layers, depth, canvas);
                layers.nodes[depth].swap(i, i + 1);
                let crossings_after = adjacent_crossings(layers, depth, canvas);

                if crossings_after < crossings_before {
                    trace!("Transposed position {i} of layer {depth}: {crossings_before} -> {crossings_after}");
                    improved = true;
                } else {
                    layers.nodes[depth].swap(i, i + 1);
                }
            }
        }

        if !improved {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::layered::{LayeredLayout, UnreachablePolicy};
    use test_log::test;

    fn layers(edges: &[(&str, &str)]) -> (Graph<()>, Layers) {
        let mut graph = Graph::new();
        for (src, dest) in edges {
            graph.add_node(*src, None);
            graph.add_node(*dest, None);
        }
        for (src, dest) in edges {
            graph.add_edge(src, dest);
        }
        graph.set_roots(["1"]);
        let layers = LayeredLayout::new(Canvas::default())
            .prepare(&mut graph)
            .expect("acyclic graph");
        (graph, layers)
    }

    fn keys(graph: &Graph<()>, layer: &[NodeIndex]) -> Vec<String> {
        layer.iter().map(|&node| graph[node].key().to_string()).collect()
    }

    #[test]
    fn median_of_odd_and_even_lists() {
        assert_eq!(median(&mut []), None);
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn barycenter_is_the_mean() {
        assert_eq!(RankHeuristic::Barycenter.rank(&mut [1.0, 2.0, 6.0]), Some(3.0));
        assert_eq!(RankHeuristic::Barycenter.rank(&mut []), None);
    }

    #[test]
    fn sweep_untangles_a_crossing() {
        // "c" is added before "d", so the seeded order crosses a->d and b->c
        let (graph, mut layers) = layers(&[("1", "a"), ("1", "b"), ("b", "c"), ("a", "d")]);
        let canvas = Canvas::default();
        assert_eq!(keys(&graph, &layers.nodes[2]), ["c", "d"]);
        assert_eq!(count_crossings(&layers, &canvas), 1);

        let report = Sweep::default().order(&mut layers, &canvas);

        assert_eq!(report.crossings, 0);
        assert_eq!(count_crossings(&layers, &canvas), 0);
        assert_eq!(keys(&graph, &layers.nodes[1]), ["a", "b"]);
        assert_eq!(keys(&graph, &layers.nodes[2]), ["d", "c"]);
    }

    #[test]
    fn crossing_free_seed_skips_the_sweeps() {
        let (_, mut layers) = layers(&[("1", "2"), ("1", "3"), ("1", "4")]);
        let report = Sweep::default().order(&mut layers, &Canvas::default());
        assert_eq!(report.crossings, 0);
        assert!(report.rounds.is_empty());
    }

    #[test]
    fn best_crossings_never_regress() {
        let (_, mut layers) = layers(&[
            ("1", "a"),
            ("1", "b"),
            ("1", "c"),
            ("a", "f"),
            ("a", "e"),
            ("b", "d"),
            ("c", "d"),
            ("c", "f"),
            ("e", "g"),
            ("d", "g"),
            ("f", "h"),
        ]);
        let canvas = Canvas::default();
        let seeded = count_crossings(&layers, &canvas);
        let sweep = Sweep {
            rounds: 6,
            heuristic: RankHeuristic::Barycenter,
            max_intersections: 0,
        };
        let report = sweep.order(&mut layers, &canvas);

        assert!(report.rounds.windows(2).all(|pair| pair[1] <= pair[0]));
        assert!(report.crossings <= seeded);
        assert_eq!(count_crossings(&layers, &canvas), report.crossings);
    }

    #[test]
    fn transpose_reaches_a_local_optimum() {
        let (_, mut layers) = layers(&[("1", "a"), ("1", "b"), ("b", "c"), ("a", "d")]);
        let canvas = Canvas::default();
        transpose(&mut layers, &canvas);

        assert_eq!(count_crossings(&layers, &canvas), 0);
        for depth in 0..layers.nodes.len() {
            for i in 0..layers.nodes[depth].len().saturating_sub(1) {
                let before = adjacent_crossings(&layers, depth, &canvas);
                layers.nodes[depth].swap(i, i + 1);
                assert!(adjacent_crossings(&layers, depth, &canvas) >= before);
                layers.nodes[depth].swap(i, i + 1);
            }
        }
    }

    #[test]
    fn unreachable_nodes_are_not_ordered() {
        let mut graph: Graph<()> = Graph::new();
        for key in ["1", "2", "x"] {
            graph.add_node(key, None);
        }
        graph.add_edge("1", "2");
        graph.set_roots(["1"]);
        let layout: LayeredLayout = LayeredLayout {
            unreachable: UnreachablePolicy::Exclude,
            ..LayeredLayout::new(Canvas::default())
        };
        let layers = layout.prepare(&mut graph).unwrap();
        assert_eq!(layers.nodes.iter().map(Vec::len).sum::<usize>(), 2);
    }
}
