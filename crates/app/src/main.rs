mod render;

use anyhow::{ensure, Context, Result};
use clap::{Parser, ValueEnum};
use dagview::{GraphDocument, GraphView, Positioning, ViewConfig};
use render::{Format, TextRenderer};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Strategy {
    Search,
    Spread,
}

/// Lay out a rooted DAG and print where every node goes
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Graph document in RON: `(roots: [..], nodes: [(key: .., dest: [..], attributes: ..)])`
    input: PathBuf,

    /// View configuration in RON, command line options take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    width: Option<f32>,

    #[arg(long)]
    height: Option<f32>,

    /// Horizontal margin of the graph
    #[arg(long)]
    padding: Option<f32>,

    #[arg(long)]
    max_arrangements: Option<usize>,

    #[arg(long)]
    max_intersections: Option<usize>,

    #[arg(long, value_enum)]
    strategy: Option<Strategy>,

    /// Print the drawn graph as RON instead of a table
    #[arg(long)]
    ron: bool,
}

impl Args {
    fn view_config(&self) -> Result<ViewConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = read(path)?;
                ron::from_str(&text)
                    .with_context(|| format!("Invalid configuration in {}", path.display()))?
            }
            None => ViewConfig::default(),
        };

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(padding) = self.padding {
            config.padding_graph = padding;
        }
        if let Some(max_arrangements) = self.max_arrangements {
            config.max_arrangements = max_arrangements;
        }
        if let Some(max_intersections) = self.max_intersections {
            config.max_intersections = max_intersections;
        }
        if let Some(strategy) = self.strategy {
            config.positioning = match strategy {
                Strategy::Search => Positioning::Search,
                Strategy::Spread => Positioning::Spread,
            };
        }
        ensure!(
            config.canvas().is_finite(),
            "Canvas dimensions must be finite, got {:?}",
            config.canvas()
        );
        Ok(config)
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let config = args.view_config()?;
    let document: GraphDocument<ron::Value> = ron::from_str(&read(&args.input)?)
        .with_context(|| format!("Invalid graph document {}", args.input.display()))?;

    let format = if args.ron { Format::Ron } else { Format::Table };
    let mut view = GraphView::new(&config, TextRenderer::new(format));
    view.update(&document, document.roots.clone())
        .context("Failed to lay out the graph")?;

    if let Some(summary) = view.summary() {
        info!(
            "Laid out {} nodes: depth {:?}, {} routing nodes, {} crossings, edge length {}",
            document.nodes.len(),
            summary.depth,
            summary.routing_nodes,
            summary.crossings,
            summary.edge_length
        );
    }
    print!("{}", view.renderer().output());
    Ok(())
}
