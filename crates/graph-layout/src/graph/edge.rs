use super::InteractionState;
use crate::BezierPoints;
use std::rc::Rc;

/// Interaction state shared by every segment of one logical edge
pub type SharedState = Rc<InteractionState>;

/// Edge weight stored in the layout graph
///
/// Endpoints are owned by the graph; the weight only carries derived drawing
/// data and the interaction state handle.
#[derive(Debug, Clone)]
pub struct Edge {
    pub(crate) bezier: BezierPoints,
    pub(crate) state: SharedState,
}

impl Edge {
    pub(crate) fn new(state: SharedState) -> Self {
        Self {
            bezier: BezierPoints::default(),
            state,
        }
    }

    /// Control points derived from the endpoints after the last layout
    pub fn bezier(&self) -> BezierPoints {
        self.bezier
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }
}

/// An edge as the host sees it: routing nodes are resolved to the original endpoints
#[derive(Debug)]
pub struct LogicalEdge<'a, A> {
    pub src_key: &'a str,
    pub src_attributes: Option<&'a A>,
    pub dest_key: &'a str,
    pub dest_attributes: Option<&'a A>,
    pub state: &'a InteractionState,
}
