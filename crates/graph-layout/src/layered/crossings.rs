use super::Layers;
use crate::geometry::Segment;
use crate::{Canvas, Point};
use petgraph::stable_graph::NodeIndex;
use std::collections::HashMap;

/// Margin keeping edges that merely share an endpoint from counting as crossed
const ENDPOINT_MARGIN: f64 = 1.0;

/// Whether two edges drawn between the same pair of layers cross
///
/// The crossing is found by intersecting the lines through both segments.
/// Parallel lines and segments whose line can't be solved (vertical,
/// degenerate) never cross.
pub(crate) fn segments_cross(a: Segment, b: Segment) -> bool {
    let (Some((slope_a, intercept_a)), Some((slope_b, intercept_b))) = (a.line(), b.line())
    else {
        return false;
    };
    if slope_a == slope_b {
        return false;
    }

    let x = (intercept_b - intercept_a) / (slope_a - slope_b);
    x.is_finite()
        && x > f64::from(a.from.x) + ENDPOINT_MARGIN
        && x < f64::from(b.to.x) - ENDPOINT_MARGIN
}

/// Count crossing pairs among segments spanning the same two layers
pub(crate) fn count_segment_crossings(segments: &[Segment]) -> usize {
    let mut crossings = 0;
    for (i, &a) in segments.iter().enumerate() {
        for &b in &segments[i + 1..] {
            if segments_cross(a, b) {
                crossings += 1;
            }
        }
    }
    crossings
}

/// Segments of the edges leaving one layer, given the y of the nodes on both sides
pub(crate) fn boundary_segments(
    layers: &Layers,
    upper: usize,
    upper_y: &HashMap<NodeIndex, f32>,
    lower_y: &HashMap<NodeIndex, f32>,
    canvas: &Canvas,
) -> Vec<Segment> {
    let upper_x = canvas.layer_x(upper, layers.depth());
    let lower_x = canvas.layer_x(upper + 1, layers.depth());

    let mut segments = Vec::new();
    for node in &layers.nodes[upper] {
        let Some(&from_y) = upper_y.get(node) else {
            continue;
        };
        for succ in layers.successors(*node) {
            if let Some(&to_y) = lower_y.get(&succ) {
                segments.push(Segment::new(
                    Point::new(upper_x, from_y),
                    Point::new(lower_x, to_y),
                ));
            }
        }
    }
    segments
}

/// Vertical positions of a layer spread evenly in its current order
fn spread_layer(layer: &[NodeIndex], canvas: &Canvas) -> HashMap<NodeIndex, f32> {
    layer.iter().copied().zip(canvas.spread_y(layer.len())).collect()
}

/// Crossings between layer `upper` and the next one in the current order
pub(crate) fn boundary_crossings(layers: &Layers, upper: usize, canvas: &Canvas) -> usize {
    if upper + 1 >= layers.nodes.len() {
        return 0;
    }
    let upper_y = spread_layer(&layers.nodes[upper], canvas);
    let lower_y = spread_layer(&layers.nodes[upper + 1], canvas);
    count_segment_crossings(&boundary_segments(layers, upper, &upper_y, &lower_y, canvas))
}

/// Crossings on both boundaries of a layer
pub(crate) fn adjacent_crossings(layers: &Layers, depth: usize, canvas: &Canvas) -> usize {
    let above = match depth {
        0 => 0,
        _ => boundary_crossings(layers, depth - 1, canvas),
    };
    above + boundary_crossings(layers, depth, canvas)
}

/// Count the number of edge crossings in the current layer order
pub(crate) fn count_crossings(layers: &Layers, canvas: &Canvas) -> usize {
    (0..layers.nodes.len().saturating_sub(1))
        .map(|upper| boundary_crossings(layers, upper, canvas))
        .sum()
}
