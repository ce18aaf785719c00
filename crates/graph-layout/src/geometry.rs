use serde::{Deserialize, Serialize};

/// Fraction of the horizontal gap at which bezier control points sit
const CONTROL_POINT: f64 = 0.7;

/// Vertical spacing factor used when spreading a layer over the canvas
const Y_SCALING: f64 = 1.6;

/// 2D point with f32 coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Round both coordinates down to whole units
    pub fn floor(self) -> Self {
        Self {
            x: self.x.floor(),
            y: self.y.floor(),
        }
    }
}

/// Bounds of the drawing surface the layout is computed for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,

    /// Horizontal margin kept free on both sides of the graph
    pub padding: f32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 400.0,
            padding: 10.0,
        }
    }
}

impl Canvas {
    /// Create a new canvas
    pub fn new(width: f32, height: f32, padding: f32) -> Self {
        Self {
            width,
            height,
            padding,
        }
    }

    /// Whether every dimension is a finite number
    pub fn is_finite(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.padding.is_finite()
    }

    /// Horizontal coordinate shared by every node of the given layer
    ///
    /// Layers are spaced evenly between `padding` and `width - padding`. A
    /// graph with a single layer is centered.
    pub fn layer_x(&self, depth: usize, graph_depth: usize) -> f32 {
        if graph_depth == 0 {
            return whole(f64::from(self.width) / 2.0);
        }
        let distance =
            (f64::from(self.width) - 2.0 * f64::from(self.padding)) / graph_depth as f64;
        whole(f64::from(self.padding) + depth as f64 * distance)
    }

    /// Evenly spread `count` nodes over the canvas height
    pub fn spread_y(&self, count: usize) -> Vec<f32> {
        match count {
            0 => Vec::new(),
            1 => vec![whole(f64::from(self.height) / 2.0)],
            _ => {
                let height = f64::from(self.height);
                let padding = height / (count as f64 * Y_SCALING);
                let gap = (height - padding * 2.0) / (count - 1) as f64;
                (0..count)
                    .map(|i| whole(padding + i as f64 * gap))
                    .collect()
            }
        }
    }
}

/// Floor to a whole unit, absorbing accumulated float error first
fn whole(value: f64) -> f32 {
    (value + 1e-6).floor() as f32
}

/// Control points of the cubic bezier drawn for an edge
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BezierPoints {
    pub cp1: Point,
    pub cp2: Point,
}

impl BezierPoints {
    /// Derive the control points of the curve joining `src` to `dest`
    pub fn between(src: Point, dest: Point) -> Self {
        let offset = (f64::from(dest.x) - f64::from(src.x)) * CONTROL_POINT;
        Self {
            cp1: Point::new(whole(f64::from(src.x) + offset), src.y),
            cp2: Point::new(whole(f64::from(dest.x) - offset), dest.y),
        }
    }
}

/// Straight line between two laid out endpoints
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Segment {
    pub from: Point,
    pub to: Point,
}

impl Segment {
    pub fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }

    /// Slope and intercept of the line through both endpoints, if it is not vertical
    pub fn line(&self) -> Option<(f64, f64)> {
        let dx = f64::from(self.to.x) - f64::from(self.from.x);
        if dx == 0.0 {
            return None;
        }
        let slope = (f64::from(self.to.y) - f64::from(self.from.y)) / dx;
        let intercept = f64::from(self.from.y) - f64::from(self.from.x) * slope;
        (slope.is_finite() && intercept.is_finite()).then_some((slope, intercept))
    }
}
