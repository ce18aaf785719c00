use dagview_layout::layered::{DistanceMetric, RankHeuristic};
use dagview_layout::{
    ArrangementSearch, Canvas, EvenSpread, LayeredLayout, Point, PositionStrategy, Sweep,
    UnreachablePolicy,
};
use serde::{Deserialize, Serialize};

/// Layout engine built from a [`ViewConfig`]
pub type ViewLayout = LayeredLayout<Sweep, Box<dyn PositionStrategy>>;

/// How the vertical positions are chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Positioning {
    /// Bounded search over arrangements
    #[default]
    Search,

    /// Even spread in ordering order
    Spread,
}

/// Options of a graph view, every field optional when deserialized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub width: f32,
    pub height: f32,

    /// Horizontal margin on both sides of the graph
    pub padding_graph: f32,

    /// Breadth of the position search, lower is faster but more crossing-prone
    pub max_arrangements: usize,

    /// Crossing count at which the ordering stops early
    pub max_intersections: usize,
    pub unreachable: UnreachablePolicy,
    pub ordering_heuristic: RankHeuristic,
    pub sweep_rounds: usize,
    pub positioning: Positioning,
    pub y_step: f32,
    pub distance_metric: DistanceMetric,

    pub background_color: String,
    pub node_radius: f32,
    pub node_border_width: f32,
    pub node_border_color: String,
    pub node_color: String,
    pub edge_width: f32,
    pub edge_color: String,
    pub node_has_text: bool,
    pub node_text_offset: Point,
    pub node_font_color: String,
    pub node_font_size: f32,
    pub node_font: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 400.0,
            padding_graph: 10.0,
            max_arrangements: 100,
            max_intersections: 0,
            unreachable: UnreachablePolicy::Exclude,
            ordering_heuristic: RankHeuristic::Median,
            sweep_rounds: 3,
            positioning: Positioning::Search,
            y_step: 1.0,
            distance_metric: DistanceMetric::Squared,
            background_color: "black".into(),
            node_radius: 5.0,
            node_border_width: 2.0,
            node_border_color: "white".into(),
            node_color: "white".into(),
            edge_width: 2.0,
            edge_color: "white".into(),
            node_has_text: false,
            node_text_offset: Point::new(8.0, 4.0),
            node_font_color: "white".into(),
            node_font_size: 12.0,
            node_font: "sans-serif".into(),
        }
    }
}

impl ViewConfig {
    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.width, self.height, self.padding_graph)
    }

    /// Build the layout engine these options describe
    pub fn layout(&self) -> ViewLayout {
        let positioning: Box<dyn PositionStrategy> = match self.positioning {
            Positioning::Search => Box::new(ArrangementSearch {
                max_arrangements: self.max_arrangements,
                y_step: self.y_step,
                metric: self.distance_metric,
            }),
            Positioning::Spread => Box::new(EvenSpread),
        };

        LayeredLayout {
            canvas: self.canvas(),
            ordering: Sweep {
                rounds: self.sweep_rounds,
                heuristic: self.ordering_heuristic,
                max_intersections: self.max_intersections,
            },
            positioning,
            unreachable: self.unreachable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn missing_options_fall_back_to_defaults() {
        let config: ViewConfig =
            ron::from_str("(width: 800.0, max_arrangements: 5, unreachable: reject)").unwrap();

        assert_eq!(config.width, 800.0);
        assert_eq!(config.height, 400.0);
        assert_eq!(config.max_arrangements, 5);
        assert_eq!(config.unreachable, UnreachablePolicy::Reject);
        assert_eq!(config.node_color, "white");
    }

    #[test]
    fn layout_follows_the_options() {
        let config = ViewConfig {
            padding_graph: 30.0,
            max_intersections: 2,
            sweep_rounds: 5,
            ..ViewConfig::default()
        };
        let layout = config.layout();

        assert_eq!(layout.canvas, Canvas::new(400.0, 400.0, 30.0));
        assert_eq!(layout.ordering.rounds, 5);
        assert_eq!(layout.ordering.max_intersections, 2);
        assert_eq!(layout.unreachable, UnreachablePolicy::Exclude);
    }
}
