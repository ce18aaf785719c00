//! Layered layout for rooted directed acyclic graphs
//!
//! Nodes are keyed by strings and carry an optional payload. The layout
//! places every node reachable from the roots on a canvas: one column per
//! longest-path depth, long edges broken up by routing nodes, layers ordered
//! to reduce edge crossings and spread vertically by a bounded search.
//!
//! # Layout Engines
//!
//! - [`LayeredLayout`]: layered layout, with swappable ordering
//!   ([`Sweep`]) and positioning ([`ArrangementSearch`], [`EvenSpread`])
//!   strategies
//!
//! # Example
//!
//! ```
//! use dagview_layout::{Canvas, Graph, LayeredLayout, LayoutEngine};
//!
//! // Create a graph
//! let mut graph: Graph<()> = Graph::new();
//! for key in ["a", "b", "c"] {
//!     graph.add_node(key, None);
//! }
//! graph.add_edge("a", "b");
//! graph.add_edge("b", "c");
//! graph.add_edge("a", "c");
//! graph.set_roots(["a"]);
//!
//! // Use the LayoutEngine trait (simple, single-phase):
//! let engine = LayeredLayout::new(Canvas::new(400.0, 400.0, 10.0));
//! let summary = engine.layout(&mut graph).unwrap();
//! assert_eq!(summary.routing_nodes, 1);
//! assert_eq!(graph.node("c").unwrap().position().x, 390.0);
//!
//! // Or directly by calling each step for better control
//! let mut graph: Graph<()> = Graph::new();
//! graph.add_node("a", None);
//! graph.set_roots(["a"]);
//! let layers = engine.compute_layers(&mut graph).unwrap();
//! let positions = engine.compute_positions(&layers);
//! engine.apply(&mut graph, &positions);
//! ```

mod engine;
mod geometry;

pub mod graph;
pub mod layered;

// Re-export core types and traits
pub use engine::LayoutEngine;
pub use geometry::{BezierPoints, Canvas, Point};
pub use graph::{Graph, InteractionState, LogicalEdge, Node, RoutingRef, SharedState};

// Re-export the index types graphs are addressed with
pub use petgraph::stable_graph::{EdgeIndex, NodeIndex};

// Re-export layered layout types
pub use layered::{
    ArrangementSearch, EvenSpread, LayeredLayout, Layers, LayoutError, LayoutSummary,
    OrderingStrategy, PositionStrategy, Positions, Sweep, UnreachablePolicy,
};
