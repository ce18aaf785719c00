use crate::graph::Graph;
use crate::layered::{
    LayeredLayout, LayoutError, LayoutSummary, OrderingStrategy, PositionStrategy,
};

/// A layout engine that places the nodes of a [`Graph`]
///
/// Engines write the positions into the graph itself, so renderers can read
/// everything they need from it. The output describes the committed layout.
pub trait LayoutEngine<A> {
    type Output;

    /// Compute and commit node positions for the given graph
    ///
    /// # Errors
    /// Returns an error if the layout constraints are violated (e.g. the graph
    /// contains a cycle for DAG layouts)
    fn layout(&self, graph: &mut Graph<A>) -> Result<Self::Output, LayoutError>;
}

impl<A, O, P> LayoutEngine<A> for LayeredLayout<O, P>
where
    A: Clone,
    O: OrderingStrategy,
    P: PositionStrategy,
{
    type Output = LayoutSummary;

    fn layout(&self, graph: &mut Graph<A>) -> Result<LayoutSummary, LayoutError> {
        let layers = self.compute_layers(graph)?;
        let positions = self.compute_positions(&layers);
        self.apply(graph, &positions);

        Ok(LayoutSummary {
            depth: graph.depth(),
            routing_nodes: layers.routing_nodes,
            crossings: positions.crossings,
            edge_length: positions.edge_length,
        })
    }
}
