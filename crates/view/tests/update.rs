//! Change detection through `GraphView::update`

use dagview::{
    GraphDocument, GraphView, NodeContext, NodeEntry, NodeStyle, Styles, Update, ViewConfig,
};
use dagview_layout::{Graph, LayoutError, Point};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use test_log::test;

/// Renderer recording the node positions and radii of every draw
type Frames = Rc<RefCell<Vec<Vec<(String, Point, f32)>>>>;

fn recorder(frames: &Frames) -> impl FnMut(&Graph<u32>, &Styles<u32>) {
    let frames = frames.clone();
    move |graph: &Graph<u32>, styles: &Styles<u32>| {
        let frame = graph
            .nodes()
            .filter_map(|(_, node)| styles.node(node))
            .map(|node| (node.key, node.position, node.radius))
            .collect();
        frames.borrow_mut().push(frame);
    }
}

fn document(edges: &[(&str, &[&str])], value: u32) -> GraphDocument<u32> {
    GraphDocument {
        roots: vec![edges[0].0.to_string()],
        nodes: edges
            .iter()
            .map(|(key, dest)| NodeEntry {
                key: key.to_string(),
                dest: dest.iter().map(|d| d.to_string()).collect(),
                attributes: Some(value),
            })
            .collect(),
    }
}

fn view(frames: &Frames) -> GraphView<u32, impl FnMut(&Graph<u32>, &Styles<u32>)> {
    let mut view = GraphView::new(&ViewConfig::default(), recorder(frames));
    view.styles_mut().node_radius =
        NodeStyle::func(|node: &NodeContext<'_, u32>| node.attributes.copied().unwrap_or(0) as f32);
    view
}

#[test]
fn first_update_lays_out_and_draws() {
    let frames = Frames::default();
    let mut view = view(&frames);
    let host = document(&[("1", &["2", "3"]), ("2", &[]), ("3", &[])], 4);

    assert_eq!(view.update(&host, host.roots.clone()).unwrap(), Update::Relaid);
    assert_eq!(frames.borrow().len(), 1);
    assert_eq!(view.summary().unwrap().depth, Some(1));
    assert_eq!(view.graph().node("1").unwrap().position(), Point::new(10.0, 200.0));
}

#[test]
fn same_graph_is_not_drawn_again() {
    let frames = Frames::default();
    let mut view = view(&frames);
    let host = document(&[("1", &["2", "3"]), ("2", &[]), ("3", &[])], 4);

    view.update(&host, host.roots.clone()).unwrap();
    assert_eq!(view.update(&host, host.roots.clone()).unwrap(), Update::Unchanged);
    assert_eq!(frames.borrow().len(), 1);
}

#[test]
fn value_change_redraws_without_layout() {
    let frames = Frames::default();
    let mut view = view(&frames);
    let host = document(&[("1", &["3"]), ("2", &["3"]), ("3", &[])], 4);
    let roots = ["1", "2"];

    view.update(&host, roots).unwrap();
    let positions: Vec<_> = frames.borrow()[0].iter().map(|(k, p, _)| (k.clone(), *p)).collect();

    let changed = document(&[("1", &["3"]), ("2", &["3"]), ("3", &[])], 9);
    assert_eq!(view.update(&changed, roots).unwrap(), Update::Redrawn);

    let frames = frames.borrow();
    assert_eq!(frames.len(), 2);
    let redrawn: Vec<_> = frames[1].iter().map(|(k, p, _)| (k.clone(), *p)).collect();
    assert_eq!(positions, redrawn);
    assert!(frames[1].iter().all(|(_, _, radius)| *radius == 9.0));
}

#[test]
fn values_reach_routing_references() {
    let frames = Frames::default();
    let mut view = view(&frames);
    let host = document(&[("a", &["b", "c"]), ("b", &["c"]), ("c", &[])], 1);
    view.update(&host, ["a"]).unwrap();
    assert_eq!(view.summary().unwrap().routing_nodes, 1);

    let changed = document(&[("a", &["b", "c"]), ("b", &["c"]), ("c", &[])], 2);
    assert_eq!(view.update(&changed, ["a"]).unwrap(), Update::Redrawn);

    let routing = view
        .graph()
        .nodes()
        .find(|(_, node)| node.is_routing())
        .map(|(_, node)| node.routing_ref().unwrap().clone())
        .unwrap();
    assert_eq!(routing.src_attributes, Some(2));
    assert_eq!(routing.dest_attributes, Some(2));
}

#[test]
fn structure_change_lays_out_again() {
    let frames = Frames::default();
    let mut view = view(&frames);
    let host = document(&[("1", &["2"]), ("2", &[])], 4);
    view.update(&host, ["1"]).unwrap();

    let grown = document(&[("1", &["2", "3"]), ("2", &[]), ("3", &[])], 4);
    assert_eq!(view.update(&grown, ["1"]).unwrap(), Update::Relaid);
    assert_eq!(frames.borrow().len(), 2);
    assert!(view.graph().node("3").is_some());

    // Roots are part of the structure
    assert_eq!(view.update(&grown, ["1", "2"]).unwrap(), Update::Relaid);
}

#[test]
fn failed_layout_keeps_the_committed_graph() {
    let frames = Frames::default();
    let mut view = view(&frames);
    let host = document(&[("1", &["2"]), ("2", &[])], 4);
    view.update(&host, ["1"]).unwrap();

    let cyclic = document(&[("1", &["2"]), ("2", &["1"])], 4);
    let err = view.update(&cyclic, ["1"]).unwrap_err();
    assert!(matches!(err, LayoutError::GraphHasCycle(_)));

    assert_eq!(frames.borrow().len(), 1);
    assert!(!view.graph().contains_edge("2", "1"));
    assert_eq!(view.update(&host, ["1"]).unwrap(), Update::Unchanged);
}

#[test]
fn interaction_state_survives_redraws() {
    let frames = Frames::default();
    let mut view = view(&frames);
    let host = document(&[("1", &["2"]), ("2", &[])], 4);
    view.update(&host, ["1"]).unwrap();

    assert!(view.graph().node("2").unwrap().state().toggle_selected());
    view.redraw();
    assert_eq!(frames.borrow().len(), 2);
    assert!(view.graph().node("2").unwrap().state().is_selected());

    let changed = document(&[("1", &["2"]), ("2", &[])], 5);
    view.update(&changed, ["1"]).unwrap();
    let state = view.graph().node("2").unwrap().state();
    assert!(state.is_selected());
    assert!(!state.toggle_selected());
    assert!(!state.is_selected());
}

#[test]
fn plain_adjacency_lists_can_be_viewed() {
    let mut drawn = 0;
    let mut view = GraphView::new(&ViewConfig::default(), |_: &Graph<()>, _: &Styles<()>| {
        drawn += 1
    });
    let host: BTreeMap<String, Vec<String>> = [
        ("a".to_string(), vec!["b".to_string()]),
        ("b".to_string(), Vec::new()),
    ]
    .into_iter()
    .collect();

    assert_eq!(view.update(&host, ["a"]).unwrap(), Update::Relaid);
    assert_eq!(view.update(&host, ["a"]).unwrap(), Update::Unchanged);
    drop(view);
    assert_eq!(drawn, 1);
}
