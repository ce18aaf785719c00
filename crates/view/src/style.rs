use crate::ViewConfig;
use dagview_layout::{BezierPoints, EdgeIndex, Graph, Node, Point};
use serde::Serialize;
use std::fmt;

/// What a node style is computed from
#[derive(Debug, Clone, Copy)]
pub struct NodeContext<'a, A> {
    pub key: &'a str,
    pub attributes: Option<&'a A>,
    pub selected: bool,
    pub hovered: bool,
}

/// What an edge style is computed from, with routing nodes resolved
#[derive(Debug, Clone, Copy)]
pub struct EdgeContext<'a, A> {
    pub src_key: &'a str,
    pub dest_key: &'a str,
    pub src_attributes: Option<&'a A>,
    pub dest_attributes: Option<&'a A>,
    pub selected: bool,
    pub hovered: bool,
}

/// A node style property, constant or computed per node
pub enum NodeStyle<T, A> {
    Const(T),
    Fn(Box<dyn Fn(&NodeContext<'_, A>) -> T>),
}

/// An edge style property, constant or computed per edge
pub enum EdgeStyle<T, A> {
    Const(T),
    Fn(Box<dyn Fn(&EdgeContext<'_, A>) -> T>),
}

impl<T: Clone, A> NodeStyle<T, A> {
    pub fn func(f: impl Fn(&NodeContext<'_, A>) -> T + 'static) -> Self {
        Self::Fn(Box::new(f))
    }

    pub fn resolve(&self, context: &NodeContext<'_, A>) -> T {
        match self {
            Self::Const(value) => value.clone(),
            Self::Fn(f) => f(context),
        }
    }
}

impl<T: Clone, A> EdgeStyle<T, A> {
    pub fn func(f: impl Fn(&EdgeContext<'_, A>) -> T + 'static) -> Self {
        Self::Fn(Box::new(f))
    }

    pub fn resolve(&self, context: &EdgeContext<'_, A>) -> T {
        match self {
            Self::Const(value) => value.clone(),
            Self::Fn(f) => f(context),
        }
    }
}

impl<T: fmt::Debug, A> fmt::Debug for NodeStyle<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Const(value) => f.debug_tuple("Const").field(value).finish(),
            Self::Fn(_) => f.write_str("Fn"),
        }
    }
}

impl<T: fmt::Debug, A> fmt::Debug for EdgeStyle<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Const(value) => f.debug_tuple("Const").field(value).finish(),
            Self::Fn(_) => f.write_str("Fn"),
        }
    }
}

/// Style properties a renderer resolves per node and per edge
#[derive(Debug)]
pub struct Styles<A> {
    pub background_color: String,
    pub node_radius: NodeStyle<f32, A>,
    pub node_border_width: NodeStyle<f32, A>,
    pub node_border_color: NodeStyle<String, A>,
    pub node_color: NodeStyle<String, A>,

    /// Label drawn next to the node, `None` for no label
    pub node_text: NodeStyle<Option<String>, A>,
    pub node_text_offset: Point,
    pub node_font_color: String,
    pub node_font_size: f32,
    pub node_font: String,
    pub edge_width: EdgeStyle<f32, A>,
    pub edge_color: EdgeStyle<String, A>,
}

impl<A: 'static> Default for Styles<A> {
    fn default() -> Self {
        Self::from_config(&ViewConfig::default())
    }
}

impl<A: 'static> Styles<A> {
    /// Constant styles from the configured values
    ///
    /// Nodes are labelled with their key when the configuration asks for text.
    pub fn from_config(config: &ViewConfig) -> Self {
        let node_text = if config.node_has_text {
            NodeStyle::func(|node: &NodeContext<'_, A>| Some(node.key.to_string()))
        } else {
            NodeStyle::Const(None)
        };

        Self {
            background_color: config.background_color.clone(),
            node_radius: NodeStyle::Const(config.node_radius),
            node_border_width: NodeStyle::Const(config.node_border_width),
            node_border_color: NodeStyle::Const(config.node_border_color.clone()),
            node_color: NodeStyle::Const(config.node_color.clone()),
            node_text,
            node_text_offset: config.node_text_offset,
            node_font_color: config.node_font_color.clone(),
            node_font_size: config.node_font_size,
            node_font: config.node_font.clone(),
            edge_width: EdgeStyle::Const(config.edge_width),
            edge_color: EdgeStyle::Const(config.edge_color.clone()),
        }
    }
}

impl<A> Styles<A> {
    /// Resolve the styles of a node, `None` for routing nodes which are never drawn
    pub fn node(&self, node: &Node<A>) -> Option<ResolvedNode> {
        if node.is_routing() {
            return None;
        }
        let context = NodeContext {
            key: node.key(),
            attributes: node.attributes(),
            selected: node.state().is_selected(),
            hovered: node.state().is_hovered(),
        };

        let position = node.position();
        Some(ResolvedNode {
            key: node.key().to_string(),
            position,
            radius: self.node_radius.resolve(&context),
            color: self.node_color.resolve(&context),
            border_width: self.node_border_width.resolve(&context),
            border_color: self.node_border_color.resolve(&context),
            text: self.node_text.resolve(&context).map(|text| {
                let anchor = Point::new(
                    position.x + self.node_text_offset.x,
                    position.y + self.node_text_offset.y,
                );
                (text, anchor)
            }),
        })
    }

    /// Resolve the styles of one drawn edge segment
    pub fn edge(&self, graph: &Graph<A>, edge: EdgeIndex) -> Option<ResolvedEdge> {
        let (src, dest) = graph.edge_endpoints(edge)?;
        let logical = graph.logical_edge(edge)?;
        let context = EdgeContext {
            src_key: logical.src_key,
            dest_key: logical.dest_key,
            src_attributes: logical.src_attributes,
            dest_attributes: logical.dest_attributes,
            selected: logical.state.is_selected(),
            hovered: logical.state.is_hovered(),
        };

        Some(ResolvedEdge {
            src_key: logical.src_key.to_string(),
            dest_key: logical.dest_key.to_string(),
            from: graph[src].position(),
            to: graph[dest].position(),
            bezier: graph[edge].bezier(),
            width: self.edge_width.resolve(&context),
            color: self.edge_color.resolve(&context),
        })
    }
}

/// A node with every style property evaluated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedNode {
    pub key: String,
    pub position: Point,
    pub radius: f32,
    pub color: String,
    pub border_width: f32,
    pub border_color: String,

    /// Label and where it is anchored
    pub text: Option<(String, Point)>,
}

/// An edge segment with every style property evaluated
///
/// Keys name the logical edge: segments of a routed edge report the keys of
/// the original endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedEdge {
    pub src_key: String,
    pub dest_key: String,
    pub from: Point,
    pub to: Point,
    pub bezier: BezierPoints,
    pub width: f32,
    pub color: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn graph() -> Graph<u32> {
        let mut graph = Graph::new();
        graph.add_node("a", Some(1));
        graph.add_node("b", Some(7));
        graph.add_edge("a", "b");
        graph.set_roots(["a"]);
        graph
    }

    #[test]
    fn constants_come_from_the_config() {
        let graph = graph();
        let styles: Styles<u32> = Styles::default();
        let node = styles.node(graph.node("a").unwrap()).unwrap();

        assert_eq!(node.radius, 5.0);
        assert_eq!(node.color, "white");
        assert_eq!(node.border_width, 2.0);
        assert_eq!(node.text, None);
    }

    #[test]
    fn functions_see_payload_and_interaction() {
        let graph = graph();
        let mut styles: Styles<u32> = Styles::default();
        styles.node_radius = NodeStyle::func(|node: &NodeContext<'_, u32>| match node.attributes {
            Some(value) => *value as f32,
            None => 0.0,
        });
        styles.node_color = NodeStyle::func(|node: &NodeContext<'_, u32>| {
            let color = if node.selected { "red" } else { "white" };
            color.to_string()
        });

        let b = graph.node("b").unwrap();
        assert_eq!(styles.node(b).unwrap().radius, 7.0);
        assert_eq!(styles.node(b).unwrap().color, "white");

        b.state().set_selected(true);
        assert_eq!(styles.node(b).unwrap().color, "red");
    }

    #[test]
    fn labels_are_offset_from_the_node() {
        let graph = graph();
        let config = ViewConfig {
            node_has_text: true,
            ..ViewConfig::default()
        };
        let styles: Styles<u32> = Styles::from_config(&config);
        let node = styles.node(graph.node("a").unwrap()).unwrap();
        assert_eq!(node.text, Some(("a".to_string(), Point::new(8.0, 4.0))));
    }

    #[test]
    fn edges_resolve_their_endpoints() {
        let graph = graph();
        let mut styles: Styles<u32> = Styles::default();
        styles.edge_width = EdgeStyle::func(|edge: &EdgeContext<'_, u32>| {
            let sum = edge.src_attributes.copied().unwrap_or(0)
                + edge.dest_attributes.copied().unwrap_or(0);
            sum as f32
        });

        let index = graph.edge_indices().next().unwrap();
        let edge = styles.edge(&graph, index).unwrap();
        assert_eq!((edge.src_key.as_str(), edge.dest_key.as_str()), ("a", "b"));
        assert_eq!(edge.width, 8.0);
        assert_eq!(edge.color, "white");
    }
}
