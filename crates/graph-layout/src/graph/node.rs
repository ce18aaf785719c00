use crate::Point;
use std::cell::Cell;

/// Selection and hover flags toggled by the interaction layer
///
/// Flags use interior mutability so they can be flipped through a shared
/// reference to a committed graph without re-running the layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionState {
    selected: Cell<bool>,
    hovered: Cell<bool>,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self) -> bool {
        self.selected.get()
    }

    pub fn set_selected(&self, selected: bool) {
        self.selected.set(selected);
    }

    /// Flip the selection flag and return the new value
    pub fn toggle_selected(&self) -> bool {
        let selected = !self.selected.get();
        self.selected.set(selected);
        selected
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered.get()
    }

    pub fn set_hovered(&self, hovered: bool) {
        self.hovered.set(hovered);
    }
}

/// The host edge a routing node stands in for
///
/// Style lookups on routing nodes and their edges resolve through this record,
/// so a split edge is styled as one continuous edge.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingRef<A> {
    pub src_key: String,
    pub src_attributes: Option<A>,
    pub dest_key: String,
    pub dest_attributes: Option<A>,
}

/// A node of the layout graph
#[derive(Debug, Clone)]
pub struct Node<A> {
    pub(crate) key: String,
    pub(crate) depth: Option<usize>,
    pub(crate) position: Point,
    pub(crate) attributes: Option<A>,
    pub(crate) routing: Option<RoutingRef<A>>,
    pub(crate) order: usize,
    pub(crate) target_y: f32,
    pub(crate) state: InteractionState,
}

impl<A> Node<A> {
    pub(crate) fn new(key: String, attributes: Option<A>) -> Self {
        Self {
            key,
            depth: None,
            position: Point::default(),
            attributes,
            routing: None,
            order: 0,
            target_y: 0.0,
            state: InteractionState::new(),
        }
    }

    pub(crate) fn routing(key: String, reference: RoutingRef<A>, depth: usize) -> Self {
        Self {
            depth: Some(depth),
            routing: Some(reference),
            ..Self::new(key, None)
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Longest-path distance from a root, `None` while unassigned or unreachable
    pub fn depth(&self) -> Option<usize> {
        self.depth
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Host supplied payload, always `None` for routing nodes
    pub fn attributes(&self) -> Option<&A> {
        self.attributes.as_ref()
    }

    pub fn routing_ref(&self) -> Option<&RoutingRef<A>> {
        self.routing.as_ref()
    }

    /// Whether this node was synthesized to split a long edge
    pub fn is_routing(&self) -> bool {
        self.routing.is_some()
    }

    /// 1-based rank within the node's layer after the last layout
    pub fn order(&self) -> usize {
        self.order
    }

    /// Vertical position the node was pulled towards by its upstream neighbors
    pub fn target_y(&self) -> f32 {
        self.target_y
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }
}
