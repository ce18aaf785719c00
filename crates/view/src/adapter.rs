//! Reading a host graph into the layout model

use dagview_layout::Graph;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Read access to the graph representation of the host application
pub trait GraphSource {
    type Attributes;

    /// Unique keys of every node
    fn node_keys(&self) -> Vec<String>;

    /// Keys of the destinations of a node's outgoing edges
    fn dest_node_keys(&self, key: &str) -> Vec<String>;

    /// Keys of the sources of a node's incoming edges, when the host tracks them
    fn src_node_keys(&self, _key: &str) -> Option<Vec<String>> {
        None
    }

    fn node_attribute(&self, _key: &str) -> Option<Self::Attributes> {
        None
    }
}

/// Build a fresh layout graph from a host graph
///
/// Edges are defined by the outgoing destinations; edges to unknown keys are
/// dropped. Incoming sources, when the host supplies them, are only checked
/// against the outgoing edges.
pub fn convert<S, I, R>(source: &S, roots: I) -> Graph<S::Attributes>
where
    S: GraphSource + ?Sized,
    I: IntoIterator<Item = R>,
    R: Into<String>,
{
    let mut graph = Graph::new();
    let keys = source.node_keys();
    for key in &keys {
        graph.add_node(key.as_str(), source.node_attribute(key));
    }

    for key in &keys {
        for dest in source.dest_node_keys(key) {
            graph.add_edge(key, &dest);
        }
    }

    for key in &keys {
        let Some(sources) = source.src_node_keys(key) else {
            continue;
        };
        let declared: HashSet<&str> = sources.iter().map(String::as_str).collect();
        let Some(index) = graph.index_of(key) else {
            continue;
        };
        let actual: HashSet<&str> = graph
            .predecessors(index)
            .map(|pred| graph[pred].key())
            .collect();
        if declared != actual {
            warn!("Incoming edges of {key} disagree with the outgoing edges of its sources");
        }
    }

    graph.set_roots(roots);
    debug!(
        "Converted host graph: {} nodes, {} edges",
        graph.len(),
        graph.edge_count()
    );
    graph
}

/// Adjacency lists keyed by node, without payloads
impl GraphSource for BTreeMap<String, Vec<String>> {
    type Attributes = ();

    fn node_keys(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }

    fn dest_node_keys(&self, key: &str) -> Vec<String> {
        self.get(key).cloned().unwrap_or_default()
    }
}

/// Serializable graph description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument<A> {
    pub roots: Vec<String>,
    pub nodes: Vec<NodeEntry<A>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeEntry<A> {
    pub key: String,

    /// Destinations of the node's outgoing edges
    #[serde(default)]
    pub dest: Vec<String>,

    pub attributes: Option<A>,
}

impl<A> GraphDocument<A> {
    fn entry(&self, key: &str) -> Option<&NodeEntry<A>> {
        self.nodes.iter().find(|node| node.key == key)
    }
}

impl<A: Clone> GraphSource for GraphDocument<A> {
    type Attributes = A;

    fn node_keys(&self) -> Vec<String> {
        self.nodes.iter().map(|node| node.key.clone()).collect()
    }

    fn dest_node_keys(&self, key: &str) -> Vec<String> {
        self.entry(key)
            .map(|node| node.dest.clone())
            .unwrap_or_default()
    }

    fn node_attribute(&self, key: &str) -> Option<A> {
        self.entry(key).and_then(|node| node.attributes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn adjacency(edges: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        edges
            .iter()
            .map(|(key, dest)| (key.to_string(), dest.iter().map(|d| d.to_string()).collect()))
            .collect()
    }

    #[test]
    fn adjacency_lists_convert_to_a_graph() {
        let host = adjacency(&[("a", &["b", "c"]), ("b", &["c"]), ("c", &[])]);
        let graph = convert(&host, ["a"]);

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert!(graph.contains_edge("a", "c"));
        assert_eq!(graph.root_keys(), ["a".to_string()]);
    }

    #[test]
    fn edges_to_unknown_nodes_are_dropped() {
        let host = adjacency(&[("a", &["b", "ghost"]), ("b", &[])]);
        let graph = convert(&host, ["a"]);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.node("ghost").is_none());
    }

    #[test]
    fn documents_carry_attributes() {
        let document: GraphDocument<u32> = ron::from_str(
            r#"(
                roots: ["a"],
                nodes: [
                    (key: "a", dest: ["b"], attributes: Some(3)),
                    (key: "b"),
                ],
            )"#,
        )
        .unwrap();
        let graph = convert(&document, document.roots.clone());

        assert_eq!(graph.node("a").unwrap().attributes(), Some(&3));
        assert_eq!(graph.node("b").unwrap().attributes(), None);
        assert!(graph.contains_edge("a", "b"));
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Stage {
        name: String,
    }

    #[test]
    fn attributes_need_not_have_a_default() {
        let document: GraphDocument<Stage> = ron::from_str(
            r#"(
                roots: ["fetch"],
                nodes: [
                    (key: "fetch", dest: ["build"], attributes: Some((name: "Fetch"))),
                    (key: "build"),
                ],
            )"#,
        )
        .unwrap();

        assert_eq!(document.nodes[0].attributes.as_ref().unwrap().name, "Fetch");
        assert_eq!(document.nodes[1].attributes, None);
    }

    struct Tracked;

    impl GraphSource for Tracked {
        type Attributes = ();

        fn node_keys(&self) -> Vec<String> {
            vec!["a".into(), "b".into()]
        }

        fn dest_node_keys(&self, key: &str) -> Vec<String> {
            match key {
                "a" => vec!["b".into()],
                _ => Vec::new(),
            }
        }

        fn src_node_keys(&self, key: &str) -> Option<Vec<String>> {
            match key {
                "b" => Some(vec!["a".into()]),
                _ => Some(Vec::new()),
            }
        }
    }

    #[test]
    fn incoming_keys_do_not_add_edges() {
        let graph = convert(&Tracked, Vec::<String>::new());
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.root_keys().is_empty());
    }
}
