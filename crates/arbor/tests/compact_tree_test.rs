use arbor::graph::{CellId, Diagram, GraphModel, Point, Rect};
use arbor::{Algorithm, CompactTreeLayout, CompactTreeOptions, Layout};

fn fan(parent_size: (f64, f64)) -> (Diagram, [CellId; 4]) {
    let mut d = Diagram::new();
    let l = d.default_parent();
    let p = d
        .insert_vertex(l, "p", Rect::new(0.0, 0.0, parent_size.0, parent_size.1))
        .unwrap();
    let a = d.insert_vertex(l, "a", Rect::new(0.0, 0.0, 40.0, 40.0)).unwrap();
    let b = d.insert_vertex(l, "b", Rect::new(0.0, 0.0, 40.0, 40.0)).unwrap();
    let c = d.insert_vertex(l, "c", Rect::new(0.0, 0.0, 40.0, 40.0)).unwrap();
    d.insert_edge(l, "pa", p, a).unwrap();
    d.insert_edge(l, "pb", p, b).unwrap();
    d.insert_edge(l, "pc", p, c).unwrap();
    (d, [p, a, b, c])
}

/// Root with uneven subtrees of mixed sizes.
fn uneven() -> Diagram {
    let mut d = Diagram::new();
    let l = d.default_parent();
    let add = |d: &mut Diagram, id: &str, w: f64, h: f64| {
        d.insert_vertex(l, id, Rect::new(0.0, 0.0, w, h)).unwrap()
    };
    let r = add(&mut d, "r", 60.0, 30.0);
    let a = add(&mut d, "a", 40.0, 20.0);
    let b = add(&mut d, "b", 40.0, 60.0);
    let c = add(&mut d, "c", 30.0, 30.0);
    let a1 = add(&mut d, "a1", 50.0, 20.0);
    let a2 = add(&mut d, "a2", 20.0, 40.0);
    let a21 = add(&mut d, "a21", 70.0, 25.0);
    let c1 = add(&mut d, "c1", 30.0, 30.0);
    let c2 = add(&mut d, "c2", 30.0, 50.0);
    let c3 = add(&mut d, "c3", 30.0, 30.0);
    for (s, t) in [
        (r, a),
        (r, b),
        (r, c),
        (a, a1),
        (a, a2),
        (a2, a21),
        (c, c1),
        (c, c2),
        (c, c3),
    ] {
        let id = format!("{}-{}", d.id_of(s), d.id_of(t));
        d.insert_edge(l, id, s, t).unwrap();
    }
    d
}

fn run(d: &mut Diagram, options: CompactTreeOptions) {
    let l = d.default_parent();
    arbor::execute(d, l, None, &Algorithm::CompactTree(options));
}

fn geo(d: &Diagram, id: &str) -> Rect {
    d.geometry(d.lookup(id).unwrap()).unwrap()
}

/// Cells of the subtree hanging off `top`, `top` included.
fn subtree(d: &Diagram, top: CellId) -> Vec<CellId> {
    let mut out = vec![top];
    let mut i = 0;
    while i < out.len() {
        let cur = out[i];
        for e in d.edges(cur, None, false, true, false, false) {
            if let Some(t) = d.terminal(e, false) {
                out.push(t);
            }
        }
        i += 1;
    }
    out
}

#[test]
fn fan_scenario_stacks_children_beside_the_parent() {
    let (mut d, _) = fan((80.0, 40.0));
    run(
        &mut d,
        CompactTreeOptions {
            node_distance: 20.0,
            level_distance: 40.0,
            ..Default::default()
        },
    );

    assert_eq!(geo(&d, "p"), Rect::new(0.0, 80.0, 80.0, 40.0));
    assert_eq!(geo(&d, "a"), Rect::new(120.0, 0.0, 40.0, 40.0));
    assert_eq!(geo(&d, "b"), Rect::new(120.0, 80.0, 40.0, 40.0));
    assert_eq!(geo(&d, "c"), Rect::new(120.0, 160.0, 40.0, 40.0));

    // Parent sits `level_distance + width` left of its children.
    assert_eq!(geo(&d, "p").x + 40.0 + 80.0, geo(&d, "a").x);
    for pair in [("a", "b"), ("b", "c")] {
        assert!(geo(&d, pair.1).y - geo(&d, pair.0).bottom() >= 20.0);
    }
}

#[test]
fn sibling_subtrees_keep_the_node_distance() {
    for horizontal in [true, false] {
        let mut d = uneven();
        let options = CompactTreeOptions {
            horizontal,
            ..Default::default()
        };
        let nd = options.node_distance;
        run(&mut d, options);

        let r = d.lookup("r").unwrap();
        let tops: Vec<CellId> = d
            .edges(r, None, false, true, false, false)
            .into_iter()
            .filter_map(|e| d.terminal(e, false))
            .collect();
        assert_eq!(tops.len(), 3);

        for (i, &s) in tops.iter().enumerate() {
            for &t in &tops[i + 1..] {
                for u in subtree(&d, s) {
                    for v in subtree(&d, t) {
                        let gu = d.geometry(u).unwrap();
                        let gv = d.geometry(v).unwrap();
                        let (along, across) = if horizontal {
                            (
                                gu.x < gv.right() && gv.x < gu.right(),
                                (gv.y - gu.bottom()).max(gu.y - gv.bottom()),
                            )
                        } else {
                            (
                                gu.y < gv.bottom() && gv.y < gu.bottom(),
                                (gv.x - gu.right()).max(gu.x - gv.right()),
                            )
                        };
                        if along {
                            assert!(
                                across >= nd,
                                "{} and {} are {} apart",
                                d.id_of(u),
                                d.id_of(v),
                                across
                            );
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn children_sit_level_distance_past_their_parent() {
    let mut d = uneven();
    let options = CompactTreeOptions {
        horizontal: false,
        level_distance: 25.0,
        ..Default::default()
    };
    run(&mut d, options);

    for (parent, child) in [("r", "a"), ("r", "c"), ("a", "a2"), ("a2", "a21"), ("c", "c3")] {
        let p = geo(&d, parent);
        let c = geo(&d, child);
        assert_eq!(c.y - p.y, 25.0 + p.height, "{parent} -> {child}");
    }
}

#[test]
fn tree_layout_is_deterministic() {
    let mut first = uneven();
    let mut second = uneven();
    run(&mut first, CompactTreeOptions::default());
    run(&mut second, CompactTreeOptions::default());

    let a = first.to_json(false).unwrap();
    let b = second.to_json(false).unwrap();
    assert_eq!(a, b);
}

#[test]
fn lone_vertex_lands_at_the_anchor() {
    let mut d = Diagram::new();
    let l = d.default_parent();
    let v = d.insert_vertex(l, "v", Rect::new(300.0, 200.0, 30.0, 20.0)).unwrap();

    let layout = CompactTreeLayout::new(CompactTreeOptions {
        move_tree: true,
        ..Default::default()
    });
    layout.execute(&mut d, l, Some(v));
    assert_eq!(d.geometry(v), Some(Rect::new(10.0, 10.0, 30.0, 20.0)));

    let layout = CompactTreeLayout::new(CompactTreeOptions::default());
    layout.execute(&mut d, l, Some(v));
    assert_eq!(d.geometry(v), Some(Rect::new(10.0, 10.0, 30.0, 20.0)));
}

#[test]
fn edge_jetties_spread_evenly_and_symmetrically() {
    let (mut d, _) = fan((80.0, 40.0));
    run(
        &mut d,
        CompactTreeOptions {
            node_distance: 20.0,
            level_distance: 40.0,
            ..Default::default()
        },
    );

    let p = geo(&d, "p");
    let anchors: Vec<Point> = ["pa", "pb", "pc"]
        .iter()
        .map(|id| {
            let e = d.lookup(id).unwrap();
            let points = d.cell(e).points().unwrap();
            assert_eq!(points.len(), 3);
            assert!(!d.cell(e).edge_style_enabled());
            points[0]
        })
        .collect();

    for a in &anchors {
        assert_eq!(a.x, p.right());
    }
    let spacing = anchors[1].y - anchors[0].y;
    assert!(spacing > 0.0);
    assert_eq!(anchors[2].y - anchors[1].y, spacing);
    assert_eq!(anchors[1].y, p.center().y);

    // The last waypoint enters the child on its centre line.
    let pa = d.cell(d.lookup("pa").unwrap()).points().unwrap().to_vec();
    assert_eq!(pa[2].y, geo(&d, "a").center().y);
    assert_eq!(pa[1].x, pa[2].x);
}

fn star(k: usize) -> Diagram {
    let mut d = Diagram::new();
    let l = d.default_parent();
    let p = d.insert_vertex(l, "p", Rect::new(0.0, 0.0, 80.0, 40.0)).unwrap();
    for i in 0..k {
        let c = d
            .insert_vertex(l, format!("c{i}"), Rect::new(0.0, 0.0, 40.0, 40.0))
            .unwrap();
        d.insert_edge(l, format!("p-c{i}"), p, c).unwrap();
    }
    d
}

#[test]
fn even_fans_have_anchors_mirrored_about_the_centre() {
    for k in [2usize, 4] {
        let mut d = star(k);
        run(&mut d, CompactTreeOptions::default());

        let p = geo(&d, "p");
        let mut anchors: Vec<f64> = (0..k)
            .map(|i| {
                let e = d.lookup(&format!("p-c{i}")).unwrap();
                let points = d.cell(e).points().unwrap();
                assert_eq!(points[0].x, p.right());
                points[0].y
            })
            .collect();
        anchors.sort_by(f64::total_cmp);

        let centre = p.center().y;
        for i in 0..k {
            let mirrored = anchors[k - 1 - i];
            assert!((anchors[i] + mirrored - 2.0 * centre).abs() < 1e-9, "k = {k}");
            assert!((anchors[i] - centre).abs() > 1e-9, "k = {k}");
        }
        let spacing = anchors[1] - anchors[0];
        for w in anchors.windows(2) {
            assert!((w[1] - w[0] - spacing).abs() < 1e-9, "k = {k}");
        }
    }
}

#[test]
fn waypoints_are_stored_relative_to_the_edge_parent() {
    let mut d = Diagram::new();
    let l = d.default_parent();
    let r = d.insert_vertex(l, "r", Rect::new(0.0, 0.0, 40.0, 40.0)).unwrap();
    let g = d.insert_vertex(l, "g", Rect::new(500.0, 500.0, 200.0, 200.0)).unwrap();
    let p = d.insert_vertex(g, "p", Rect::new(0.0, 0.0, 40.0, 40.0)).unwrap();
    let a = d.insert_vertex(g, "a", Rect::new(0.0, 0.0, 40.0, 40.0)).unwrap();
    d.insert_edge(l, "rp", r, p).unwrap();
    d.insert_edge(g, "pa", p, a).unwrap();

    arbor::execute(
        &mut d,
        l,
        Some(r),
        &Algorithm::CompactTree(CompactTreeOptions::default()),
    );

    // `p` and `a` are stored relative to `g`, and so is the edge between them.
    let pa = d.cell(d.lookup("pa").unwrap()).points().unwrap().to_vec();
    assert_eq!(pa[0].x, geo(&d, "p").right());
    assert_eq!(pa[2].y, geo(&d, "a").center().y);

    // `rp` lives in the layer, so its points are in layer space.
    let rp = d.cell(d.lookup("rp").unwrap()).points().unwrap().to_vec();
    assert_eq!(rp[0].x, geo(&d, "r").right());
    let p_abs = d.absolute_geometry(p).unwrap();
    assert_eq!(rp[2].y, p_abs.center().y);
}

#[test]
fn edge_routing_can_be_disabled() {
    let (mut d, _) = fan((80.0, 40.0));
    run(
        &mut d,
        CompactTreeOptions {
            edge_routing: false,
            ..Default::default()
        },
    );
    let e = d.lookup("pa").unwrap();
    assert!(d.cell(e).points().is_none());
    assert!(d.cell(e).edge_style_enabled());
}

#[test]
fn one_change_set_per_call() {
    let mut d = uneven();
    run(&mut d, CompactTreeOptions::default());
    assert_eq!(d.history().len(), 1);
    assert_eq!(d.update_level(), 0);
}

#[test]
fn nothing_to_lay_out_is_a_no_op() {
    let mut d = Diagram::new();
    let l = d.default_parent();
    d.insert_vertex(l, "a", Rect::new(5.0, 5.0, 10.0, 10.0)).unwrap();
    run(&mut d, CompactTreeOptions::default());
    assert!(d.history().is_empty());

    let (mut d, [p, ..]) = fan((80.0, 40.0));
    let l = d.default_parent();
    d.set_visible(p, false);
    let layout = CompactTreeLayout::default();
    layout.execute(&mut d, l, Some(p));
    assert!(d.history().is_empty());
    assert_eq!(d.update_level(), 0);
}

#[test]
fn inverted_tree_matches_reversed_edges() {
    let (mut forward, _) = fan((80.0, 40.0));
    run(&mut forward, CompactTreeOptions::default());

    let mut d = Diagram::new();
    let l = d.default_parent();
    let p = d.insert_vertex(l, "p", Rect::new(0.0, 0.0, 80.0, 40.0)).unwrap();
    for id in ["a", "b", "c"] {
        let v = d.insert_vertex(l, id, Rect::new(0.0, 0.0, 40.0, 40.0)).unwrap();
        d.insert_edge(l, format!("{id}p"), v, p).unwrap();
    }
    run(
        &mut d,
        CompactTreeOptions {
            invert: true,
            ..Default::default()
        },
    );

    for id in ["p", "a", "b", "c"] {
        assert_eq!(geo(&d, id), geo(&forward, id), "{id}");
    }
}

#[test]
fn sort_edges_orders_children_by_document_position() {
    let mut d = Diagram::new();
    let l = d.default_parent();
    let p = d.insert_vertex(l, "p", Rect::new(0.0, 0.0, 40.0, 40.0)).unwrap();
    let a = d.insert_vertex(l, "a", Rect::new(0.0, 0.0, 40.0, 40.0)).unwrap();
    let b = d.insert_vertex(l, "b", Rect::new(0.0, 0.0, 40.0, 40.0)).unwrap();
    d.insert_edge(l, "pb", p, b).unwrap();
    d.insert_edge(l, "pa", p, a).unwrap();

    let mut unsorted = d.clone();
    run(&mut unsorted, CompactTreeOptions::default());
    assert!(geo(&unsorted, "b").y < geo(&unsorted, "a").y);

    run(
        &mut d,
        CompactTreeOptions {
            sort_edges: true,
            ..Default::default()
        },
    );
    assert!(geo(&d, "a").y < geo(&d, "b").y);
}

#[test]
fn align_ranks_uses_the_widest_node_per_rank() {
    let mut d = Diagram::new();
    let l = d.default_parent();
    let r = d.insert_vertex(l, "r", Rect::new(0.0, 0.0, 40.0, 40.0)).unwrap();
    let a = d.insert_vertex(l, "a", Rect::new(0.0, 0.0, 100.0, 20.0)).unwrap();
    let b = d.insert_vertex(l, "b", Rect::new(0.0, 0.0, 20.0, 20.0)).unwrap();
    let a1 = d.insert_vertex(l, "a1", Rect::new(0.0, 0.0, 20.0, 20.0)).unwrap();
    let b1 = d.insert_vertex(l, "b1", Rect::new(0.0, 0.0, 20.0, 20.0)).unwrap();
    d.insert_edge(l, "ra", r, a).unwrap();
    d.insert_edge(l, "rb", r, b).unwrap();
    d.insert_edge(l, "aa1", a, a1).unwrap();
    d.insert_edge(l, "bb1", b, b1).unwrap();

    let mut plain = d.clone();
    run(&mut plain, CompactTreeOptions::default());
    assert!(geo(&plain, "a1").x > geo(&plain, "b1").x);

    run(
        &mut d,
        CompactTreeOptions {
            align_ranks: true,
            ..Default::default()
        },
    );
    assert_eq!(geo(&d, "a1").x, geo(&d, "b1").x);
}

#[test]
fn resize_parent_wraps_the_group_around_its_tree() {
    let build = || {
        let mut d = Diagram::new();
        let l = d.default_parent();
        let g = d.insert_vertex(l, "g", Rect::new(100.0, 100.0, 10.0, 10.0)).unwrap();
        let p = d.insert_vertex(g, "p", Rect::new(0.0, 0.0, 40.0, 40.0)).unwrap();
        let a = d.insert_vertex(g, "a", Rect::new(0.0, 0.0, 40.0, 40.0)).unwrap();
        let b = d.insert_vertex(g, "b", Rect::new(0.0, 0.0, 40.0, 40.0)).unwrap();
        d.insert_edge(g, "pa", p, a).unwrap();
        d.insert_edge(g, "pb", p, b).unwrap();
        (d, g)
    };

    let (mut d, g) = build();
    let layout = CompactTreeLayout::new(CompactTreeOptions {
        resize_parent: true,
        ..Default::default()
    });
    layout.execute(&mut d, g, None);

    let children: Vec<Rect> = ["p", "a", "b"].iter().map(|id| geo(&d, id)).collect();
    let inner = Rect::union_all(children.iter().copied()).unwrap();
    assert_eq!(inner.x, 10.0);
    assert_eq!(inner.y, 10.0);
    let group = d.geometry(g).unwrap();
    assert_eq!(group.width, inner.width + 20.0);
    assert_eq!(group.height, inner.height + 20.0);
    assert_eq!(d.history().len(), 1);

    // Jetties follow the vertices into their resized group.
    let p = geo(&d, "p");
    for (edge, child) in [("pa", "a"), ("pb", "b")] {
        let points = d.cell(d.lookup(edge).unwrap()).points().unwrap().to_vec();
        assert_eq!(points[0].x, p.right());
        assert!(points[0].y > p.y && points[0].y < p.bottom());
        assert_eq!(points[2].y, geo(&d, child).center().y);
        assert!(points[2].x < geo(&d, child).x);
    }

    let (mut d, g) = build();
    let layout = CompactTreeLayout::new(CompactTreeOptions {
        resize_parent: true,
        maintain_parent_location: true,
        ..Default::default()
    });
    layout.execute(&mut d, g, None);
    let group = d.geometry(g).unwrap();
    assert_eq!((group.x, group.y), (100.0, 100.0));
}

#[test]
fn immovable_vertices_stay_put_but_still_shape_the_tree() {
    let (mut d, [_, a, ..]) = fan((80.0, 40.0));
    d.set_movable(a, false);
    run(&mut d, CompactTreeOptions::default());
    assert_eq!(d.geometry(a), Some(Rect::new(0.0, 0.0, 40.0, 40.0)));
    assert!(geo(&d, "b").x > 0.0);
}
