use super::{LayoutError, UnreachablePolicy};
use crate::graph::{Graph, RoutingRef};
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::Dfs;
use petgraph::Direction;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Assign every node reachable from a root its longest-path distance from the roots
///
/// Depths are propagated in topological order over the reachable part of the
/// graph, keeping the maximum over all incoming paths.
///
/// Returns the depth of the graph, `None` if no node is reachable.
pub(crate) fn assign_depths<A>(
    graph: &mut Graph<A>,
    unreachable: UnreachablePolicy,
) -> Result<Option<usize>, LayoutError> {
    let roots = graph.root_nodes();
    if roots.is_empty() && !graph.is_empty() && unreachable == UnreachablePolicy::Reject {
        return Err(LayoutError::NoRoots);
    }

    let mut reachable = HashSet::new();
    for &root in &roots {
        let mut dfs = Dfs::new(graph.as_petgraph(), root);
        while let Some(node) = dfs.next(graph.as_petgraph()) {
            reachable.insert(node);
        }
    }

    let unreached: Vec<_> = graph
        .nodes()
        .filter(|(index, _)| !reachable.contains(index))
        .map(|(_, node)| node.key().to_string())
        .collect();
    if let Some(key) = unreached.first() {
        if unreachable == UnreachablePolicy::Reject {
            return Err(LayoutError::Unreachable(key.clone()));
        }
        for key in &unreached {
            warn!("Node {key} is not reachable from a root, leaving it out of the layout");
        }
    }

    let mut reached = DiGraphMap::new();
    for &node in &reachable {
        reached.add_node(node);
    }
    for &node in &reachable {
        for succ in graph.successors(node) {
            reached.add_edge(node, succ, ());
        }
    }

    let topo_order = toposort(&reached, None)
        .map_err(|cycle| LayoutError::GraphHasCycle(graph[cycle.node_id()].key().to_string()))?;

    let mut depths: HashMap<NodeIndex, usize> = HashMap::new();
    for &node in &topo_order {
        let depth = reached
            .neighbors_directed(node, Direction::Incoming)
            .map(|pred| depths.get(&pred).copied().unwrap_or(0) + 1)
            .max()
            .unwrap_or(0);
        depths.insert(node, depth);
    }

    let indices: Vec<_> = graph.nodes().map(|(index, _)| index).collect();
    for index in indices {
        graph.node_mut(index).depth = depths.get(&index).copied();
    }
    graph.mark_depth_set();

    Ok(depths.values().copied().max())
}

/// Replace every edge spanning more than one layer with a chain of routing nodes
///
/// Each segment of a chain shares the interaction state of the edge it
/// replaces. Returns the number of routing nodes created.
pub(crate) fn insert_routing_nodes<A: Clone>(graph: &mut Graph<A>) -> usize {
    let long_edges: Vec<_> = graph
        .edge_indices()
        .filter_map(|edge| {
            let (src, dest) = graph.edge_endpoints(edge)?;
            let (src_depth, dest_depth) = (graph[src].depth()?, graph[dest].depth()?);
            (dest_depth > src_depth + 1).then_some((edge, src, dest, src_depth, dest_depth))
        })
        .collect();

    let mut created = 0;
    for (edge, src, dest, src_depth, dest_depth) in long_edges {
        let Some(removed) = graph.remove_edge(edge) else {
            continue;
        };
        let reference = RoutingRef {
            src_key: graph[src].key().to_string(),
            src_attributes: graph[src].attributes().cloned(),
            dest_key: graph[dest].key().to_string(),
            dest_attributes: graph[dest].attributes().cloned(),
        };

        let mut previous = src;
        for step in 1..dest_depth - src_depth {
            let key = format!(
                "src_{}_dest_{}_nr{step}",
                reference.src_key, reference.dest_key
            );
            let routing = graph.add_routing_node(key, reference.clone(), src_depth + step);
            graph.connect(previous, routing, removed.state.clone());
            previous = routing;
            created += 1;
        }
        graph.connect(previous, dest, removed.state);
    }

    // Connecting nodes clears the flag, but every depth is still valid
    graph.mark_depth_set();
    debug!("Inserted {created} routing nodes");
    created
}
