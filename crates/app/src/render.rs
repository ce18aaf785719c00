use dagview::{Renderer, ResolvedEdge, ResolvedNode, Styles};
use dagview_layout::Graph;
use serde::Serialize;
use std::fmt::Write;
use tracing::error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Table,
    Ron,
}

/// Everything drawn for one graph
#[derive(Debug, Serialize)]
struct Frame {
    background: String,
    nodes: Vec<ResolvedNode>,
    edges: Vec<ResolvedEdge>,
}

/// Renders the laid out graph as text
#[derive(Debug, Default)]
pub struct TextRenderer {
    format: Format,
    output: String,
}

impl TextRenderer {
    pub fn new(format: Format) -> Self {
        Self {
            format,
            output: String::new(),
        }
    }

    /// Text of the last draw
    pub fn output(&self) -> &str {
        &self.output
    }

    fn table(&mut self, frame: &Frame) -> std::fmt::Result {
        let out = &mut self.output;
        writeln!(out, "background {}", frame.background)?;
        writeln!(out)?;
        writeln!(out, "{:<16} {:>6} {:>6} {:>6}  {:<10} label", "node", "x", "y", "radius", "color")?;
        for node in &frame.nodes {
            let label = node.text.as_ref().map(|(text, _)| text.as_str()).unwrap_or("");
            writeln!(
                out,
                "{:<16} {:>6} {:>6} {:>6}  {:<10} {label}",
                node.key, node.position.x, node.position.y, node.radius, node.color
            )?;
        }
        writeln!(out)?;
        writeln!(out, "{:<16} {:<16} {:>15} {:>15}  {:>5}  color", "from", "to", "start", "end", "width")?;
        for edge in &frame.edges {
            writeln!(
                out,
                "{:<16} {:<16} {:>15} {:>15}  {:>5}  {}",
                edge.src_key,
                edge.dest_key,
                format!("({}, {})", edge.from.x, edge.from.y),
                format!("({}, {})", edge.to.x, edge.to.y),
                edge.width,
                edge.color
            )?;
        }
        Ok(())
    }
}

impl<A> Renderer<A> for TextRenderer {
    fn draw(&mut self, graph: &Graph<A>, styles: &Styles<A>) {
        let mut nodes: Vec<_> = graph
            .nodes()
            .filter_map(|(_, node)| styles.node(node))
            .collect();
        nodes.sort_by(|a, b| {
            (a.position.x, a.position.y)
                .partial_cmp(&(b.position.x, b.position.y))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let edges = graph
            .edge_indices()
            .filter_map(|edge| styles.edge(graph, edge))
            .collect();
        let frame = Frame {
            background: styles.background_color.clone(),
            nodes,
            edges,
        };

        self.output.clear();
        match self.format {
            Format::Table => {
                if let Err(e) = self.table(&frame) {
                    error!("Failed to render the graph: {e}");
                }
            }
            Format::Ron => {
                match ron::ser::to_string_pretty(&frame, ron::ser::PrettyConfig::default()) {
                    Ok(text) => self.output = text,
                    Err(e) => error!("Failed to serialize the graph: {e}"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dagview::ViewConfig;
    use dagview_layout::{Canvas, LayeredLayout, LayoutEngine};
    use test_log::test;

    fn graph() -> Graph<()> {
        let mut graph = Graph::new();
        for key in ["root", "leaf"] {
            graph.add_node(key, None);
        }
        graph.add_edge("root", "leaf");
        graph.set_roots(["root"]);
        LayeredLayout::new(Canvas::default())
            .layout(&mut graph)
            .unwrap();
        graph
    }

    #[test]
    fn table_lists_nodes_and_edges() {
        let styles: Styles<()> = Styles::from_config(&ViewConfig::default());
        let mut renderer = TextRenderer::new(Format::Table);
        renderer.draw(&graph(), &styles);

        let lines: Vec<_> = renderer.output().lines().collect();
        assert_eq!(lines[0], "background black");
        assert!(lines.iter().any(|line| line.starts_with("root") && line.contains("10")));
        assert!(lines
            .iter()
            .any(|line| line.starts_with("root") && line.contains("leaf") && line.contains("(390, 200)")));
    }

    #[test]
    fn ron_output_names_every_field() {
        let styles: Styles<()> = Styles::from_config(&ViewConfig::default());
        let mut renderer = TextRenderer::new(Format::Ron);
        renderer.draw(&graph(), &styles);

        let output = renderer.output();
        assert!(output.contains(r#"background: "black""#));
        assert!(output.contains(r#"key: "root""#));
        assert!(output.contains(r#"dest_key: "leaf""#));
    }
}
