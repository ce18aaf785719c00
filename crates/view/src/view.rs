use crate::{convert, GraphSource, Styles, ViewConfig, ViewLayout};
use dagview_layout::{Graph, LayoutEngine, LayoutError, LayoutSummary};
use tracing::debug;

/// Draws a laid out graph
pub trait Renderer<A> {
    fn draw(&mut self, graph: &Graph<A>, styles: &Styles<A>);
}

impl<A, F> Renderer<A> for F
where
    F: FnMut(&Graph<A>, &Styles<A>),
{
    fn draw(&mut self, graph: &Graph<A>, styles: &Styles<A>) {
        self(graph, styles)
    }
}

/// What an update did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    /// Same structure and values, nothing was drawn
    Unchanged,

    /// Only values changed: payloads refreshed and redrawn with the kept layout
    Redrawn,

    /// Structure changed: laid out again and redrawn
    Relaid,
}

/// A laid out graph kept in sync with a host graph
///
/// The committed graph is the only one renderers ever see. It is replaced
/// when the host structure changes and the new structure lays out.
pub struct GraphView<A, R, E = ViewLayout> {
    graph: Graph<A>,
    engine: E,
    styles: Styles<A>,
    renderer: R,
    summary: Option<LayoutSummary>,
}

impl<A: 'static, R> GraphView<A, R> {
    pub fn new(config: &ViewConfig, renderer: R) -> Self {
        Self::with_engine(config.layout(), Styles::from_config(config), renderer)
    }
}

impl<A, R, E> GraphView<A, R, E> {
    pub fn with_engine(engine: E, styles: Styles<A>, renderer: R) -> Self {
        Self {
            graph: Graph::new(),
            engine,
            styles,
            renderer,
            summary: None,
        }
    }

    /// The committed graph
    pub fn graph(&self) -> &Graph<A> {
        &self.graph
    }

    /// Figures of the committed layout, `None` before the first layout
    pub fn summary(&self) -> Option<LayoutSummary> {
        self.summary
    }

    pub fn styles(&self) -> &Styles<A> {
        &self.styles
    }

    pub fn styles_mut(&mut self) -> &mut Styles<A> {
        &mut self.styles
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

impl<A, R: Renderer<A>, E> GraphView<A, R, E> {
    /// Draw the committed graph again, e.g. after an interaction state change
    pub fn redraw(&mut self) {
        self.renderer.draw(&self.graph, &self.styles);
    }
}

impl<A, R, E> GraphView<A, R, E>
where
    A: Clone + PartialEq,
    R: Renderer<A>,
    E: LayoutEngine<A, Output = LayoutSummary>,
{
    /// Bring the view in line with the host graph
    ///
    /// Layout only runs when the structure differs from the committed graph;
    /// a value change alone refreshes the payloads and redraws. The first
    /// update always lays out.
    ///
    /// # Errors
    /// Returns the layout error of a changed structure, the previous graph
    /// stays committed
    pub fn update<S, I, K>(&mut self, host: &S, roots: I) -> Result<Update, LayoutError>
    where
        S: GraphSource<Attributes = A> + ?Sized,
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let mut fresh = convert(host, roots);

        if self.summary.is_some() && self.graph.equal_structure(&fresh) {
            if self.graph.equal_values(&fresh) {
                debug!("Graph unchanged");
                return Ok(Update::Unchanged);
            }
            debug!("Graph values changed, redrawing");
            self.graph.refresh_attributes(&fresh);
            self.redraw();
            return Ok(Update::Redrawn);
        }

        debug!("Graph structure changed, laying out");
        let summary = self.engine.layout(&mut fresh)?;
        self.graph = fresh;
        self.summary = Some(summary);
        self.redraw();
        Ok(Update::Relaid)
    }
}
