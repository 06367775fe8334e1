use springbok::{
    Canvas, Display, Frame, FruchtermanReingold, FruchtermanReingoldOptions, Layout, Node,
};
use std::sync::{Arc, Mutex};

fn graph(ids: &[&str], edges: &[(&str, &str)]) -> Vec<Node> {
    let mut nodes: Vec<Node> = ids.iter().map(|id| Node::new(*id).sized(30.0, 12.0)).collect();
    for (from, to) in edges {
        let n = nodes.iter_mut().find(|n| n.id == *from).unwrap();
        n.link(*to);
    }
    nodes
}

fn ring_with_spokes() -> Vec<Node> {
    graph(
        &["a", "b", "c", "d", "e", "f", "g", "h"],
        &[
            ("a", "b"),
            ("b", "c"),
            ("c", "d"),
            ("d", "e"),
            ("e", "a"),
            ("a", "f"),
            ("c", "g"),
            ("g", "h"),
        ],
    )
}

fn seeded(seed: u64) -> FruchtermanReingoldOptions {
    FruchtermanReingoldOptions {
        random_seed: Some(seed),
        ..Default::default()
    }
}

fn raw(seed: u64) -> FruchtermanReingoldOptions {
    FruchtermanReingoldOptions {
        rescale_on_completion: false,
        animate_transitions: false,
        ..seeded(seed)
    }
}

fn positions(nodes: &[Node]) -> Vec<(f64, f64)> {
    nodes.iter().map(|n| (n.x, n.y)).collect()
}

fn canvas() -> Canvas {
    Canvas::new(400.0, 300.0).unwrap()
}

#[test]
fn same_seed_gives_bit_identical_positions() {
    let mut a = FruchtermanReingold::new(ring_with_spokes(), canvas()).with_options(seeded(9));
    let mut b = FruchtermanReingold::new(ring_with_spokes(), canvas()).with_options(seeded(9));
    a.update_layout();
    b.update_layout();
    assert_eq!(positions(a.nodes()), positions(b.nodes()));

    a.update_layout();
    b.update_layout();
    assert_eq!(positions(a.nodes()), positions(b.nodes()));
}

#[test]
fn rescaled_positions_stay_inside_the_padded_canvas() {
    let opts = FruchtermanReingoldOptions {
        pad: 12.0,
        ..seeded(3)
    };
    let mut fr = FruchtermanReingold::new(ring_with_spokes(), canvas()).with_options(opts);
    for _ in 0..3 {
        fr.update_layout();
        for n in fr.nodes() {
            assert!((0.0..=388.0).contains(&n.x), "x out of bounds: {}", n.x);
            assert!((0.0..=288.0).contains(&n.y), "y out of bounds: {}", n.y);
        }
    }
}

#[test]
fn coincident_nodes_and_self_loops_stay_finite() {
    let mut nodes = graph(&["a", "b", "c"], &[("a", "a"), ("b", "b"), ("c", "c")]);
    nodes.push(Node::new("d"));
    let mut fr = FruchtermanReingold::new(nodes, canvas()).with_options(seeded(1));
    fr.update_layout();

    for n in fr.nodes_mut() {
        n.x = 50.0;
        n.y = 50.0;
    }
    fr.update_layout();
    for n in fr.nodes() {
        assert!(n.x.is_finite() && n.y.is_finite(), "{n:?}");
    }
}

#[test]
fn coincident_linked_nodes_without_rescale_stay_finite() {
    let nodes = graph(&["a", "b"], &[("a", "b")]);
    let mut fr = FruchtermanReingold::new(nodes, canvas()).with_options(raw(5));
    fr.update_layout();
    for n in fr.nodes_mut() {
        n.x = 10.0;
        n.y = 10.0;
    }
    fr.update_layout();
    for n in fr.nodes() {
        assert!(n.x.is_finite() && n.y.is_finite(), "{n:?}");
    }
}

#[test]
fn passes_never_exceed_the_budget() {
    let opts = FruchtermanReingoldOptions {
        max_passes: 7,
        ..seeded(2)
    };
    let mut fr = FruchtermanReingold::new(ring_with_spokes(), canvas()).with_options(opts);
    let report = fr.update_layout();
    assert_eq!(report.passes, 7);

    let mut fr = FruchtermanReingold::new(ring_with_spokes(), canvas()).with_options(seeded(2));
    let report = fr.update_layout();
    assert!(report.passes <= 500);
    assert!(report.passes > 30);
    assert!(!report.cancelled);
}

#[test]
fn self_loops_do_not_change_the_result() {
    let plain = ring_with_spokes();
    let mut looped = ring_with_spokes();
    for n in &mut looped {
        let id = n.id.clone();
        n.link(id);
    }

    let mut a = FruchtermanReingold::new(plain, canvas()).with_options(raw(11));
    let mut b = FruchtermanReingold::new(looped, canvas()).with_options(raw(11));
    a.update_layout();
    b.update_layout();
    assert_eq!(positions(a.nodes()), positions(b.nodes()));
}

#[test]
fn two_linked_nodes_settle_near_the_optimal_distance() {
    let nodes = graph(&["a", "b"], &[("a", "b")]);
    let mut fr =
        FruchtermanReingold::new(nodes, Canvas::new(100.0, 100.0).unwrap()).with_options(raw(42));
    let optimal = fr.optimal_distance();
    assert!((optimal - 0.46 * (10_000.0f64 / 3.0).sqrt()).abs() < 1e-12);

    fr.update_layout();
    let [a, b] = fr.nodes() else {
        panic!("expected two nodes");
    };
    let d = a.position().distance(b.position());
    assert!(
        (d - optimal).abs() <= 0.15 * optimal,
        "distance {d} too far from optimal {optimal}"
    );
}

#[test]
fn single_node_is_left_untouched() {
    let nodes = vec![Node::new("solo").at(12.5, -3.0)];
    let mut fr = FruchtermanReingold::new(nodes, canvas()).with_options(seeded(1));
    let report = fr.update_layout();
    assert_eq!(report.passes, 0);
    assert_eq!(positions(fr.nodes()), vec![(12.5, -3.0)]);
}

#[test]
fn cancellation_stops_within_one_pass() {
    let frames: Arc<Mutex<Vec<Frame>>> = Arc::default();
    let opts = FruchtermanReingoldOptions {
        update_every_n_passes: 1,
        ..raw(4)
    };
    let fr = FruchtermanReingold::new(ring_with_spokes(), canvas()).with_options(opts);
    let token = fr.cancel_token();
    let sink = Arc::clone(&frames);
    let mut fr = fr.with_display(Display::direct(move |frame: &Frame| {
        let mut frames = sink.lock().unwrap();
        frames.push(frame.clone());
        if frames.len() == 3 {
            token.cancel();
        }
    }));

    let report = fr.update_layout();
    assert!(report.cancelled);
    assert_eq!(report.passes, 3);

    {
        let frames = frames.lock().unwrap();
        // Three progress frames plus the final commit of the last completed pass.
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[2], frames[3]);
        let committed: Vec<(f64, f64)> = frames[3].positions.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(committed, positions(fr.nodes()));
    }

    // The request is consumed; the next tick runs to convergence.
    let report = fr.update_layout();
    assert!(!report.cancelled);
    assert!(report.passes > 3);
}

#[test]
fn queued_display_receives_progress_frames() {
    let (display, rx) = Display::queued();
    let opts = FruchtermanReingoldOptions {
        update_every_n_passes: 10,
        max_passes: 40,
        ..raw(8)
    };
    let mut fr = FruchtermanReingold::new(ring_with_spokes(), canvas())
        .with_options(opts)
        .with_display(display);
    fr.update_layout();

    let frames: Vec<Frame> = rx.try_iter().collect();
    // Passes 0, 10, 20, 30 plus the final commit.
    assert_eq!(frames.len(), 5);
    assert!(frames.iter().all(|f| f.positions.len() == 8));
}

#[test]
fn animated_rescale_ends_on_the_same_positions_as_a_direct_commit() {
    let frames: Arc<Mutex<usize>> = Arc::default();
    let sink = Arc::clone(&frames);
    let mut animated = FruchtermanReingold::new(ring_with_spokes(), canvas())
        .with_options(seeded(6))
        .with_display(Display::direct(move |_: &Frame| *sink.lock().unwrap() += 1));
    let mut direct = FruchtermanReingold::new(ring_with_spokes(), canvas()).with_options(
        FruchtermanReingoldOptions {
            animate_transitions: false,
            ..seeded(6)
        },
    );
    animated.update_layout();
    direct.update_layout();

    assert_eq!(positions(animated.nodes()), positions(direct.nodes()));
    assert_eq!(*frames.lock().unwrap(), 8);
}

#[test]
fn cancellation_during_the_final_animation_carries_over_to_the_next_call() {
    let fr = FruchtermanReingold::new(ring_with_spokes(), canvas()).with_options(seeded(4));
    let token = fr.cancel_token();
    let sink = token.clone();
    let mut fr = fr.with_display(Display::direct(move |_: &Frame| sink.cancel()));

    let report = fr.update_layout();
    assert!(!report.cancelled);
    assert!(report.passes > 0);
    assert!(token.is_cancelled());

    let report = fr.update_layout();
    assert!(report.cancelled);
    assert_eq!(report.passes, 0);
}
