//! Change detection between a committed graph and a fresh conversion
//!
//! Both predicates only look at host nodes: a laid out graph carries routing
//! nodes that its fresh conversion does not, and the two must still compare
//! equal when the host graph did not change.

use super::Graph;
use std::collections::HashSet;

impl<A> Graph<A> {
    /// Same root set, same node keys and same outgoing destinations per node
    pub fn equal_structure(&self, other: &Graph<A>) -> bool {
        let roots: HashSet<&str> = self.roots.iter().map(String::as_str).collect();
        let other_roots: HashSet<&str> = other.roots.iter().map(String::as_str).collect();
        if roots != other_roots {
            return false;
        }

        if self.host_nodes().count() != other.host_nodes().count() {
            return false;
        }

        self.host_nodes().all(|(index, node)| {
            let Some(other_index) = other.index_of(&node.key) else {
                return false;
            };
            if other[other_index].is_routing() {
                return false;
            }
            let successors: HashSet<&str> = self.logical_successors(index).into_iter().collect();
            let other_successors: HashSet<&str> =
                other.logical_successors(other_index).into_iter().collect();
            successors == other_successors
        })
    }
}

impl<A: PartialEq> Graph<A> {
    /// Same node keys carrying equal payloads
    pub fn equal_values(&self, other: &Graph<A>) -> bool {
        if self.host_nodes().count() != other.host_nodes().count() {
            return false;
        }

        self.host_nodes().all(|(_, node)| match other.node(&node.key) {
            Some(other_node) => !other_node.is_routing() && node.attributes == other_node.attributes,
            None => false,
        })
    }
}
