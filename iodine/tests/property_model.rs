use iodine::geometry::bezier::{compute_bezier_points, pt_on_bezier, pt_on_polyline, MAX_SEGS};
use iodine::geometry::cubic::CubicBezier;
use iodine::geometry::math::pt_on_line;
use iodine::{EditorConfig, NetworkSet, Store, Vec2};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    NewNetwork { name: u8 },
    AddNode { neti: u8, name: u8, x: u8, y: u8 },
    DeleteNode { idx: u8 },
    AddAlias { idx: u8 },
    CreateReaction { a: u8, b: u8, name: u8 },
    DeleteReaction { idx: u8 },
    AddSrc { rea: u8, node: u8, stoich: i8 },
    DeleteSrc { rea: u8, node: u8 },
    SetStoich { rea: u8, node: u8, stoich: i8 },
    AddCompartment { name: u8 },
    SetCompartment { node: u8, comp: Option<u8> },
    DeleteCompartment { idx: u8 },
    Move { node: u8, x: i16, y: i16, allow_negative: bool },
    Lock { node: u8, locked: bool },
    SetParameter { name: u8, value: i8 },
    RemoveParameter { name: u8 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u8>().prop_map(|name| Op::NewNetwork { name: name % 3 }),
        (0u8..2, any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(neti, name, x, y)| Op::AddNode {
            neti,
            name: name % 8,
            x,
            y,
        }),
        any::<u8>().prop_map(|idx| Op::DeleteNode { idx: idx % 8 }),
        any::<u8>().prop_map(|idx| Op::AddAlias { idx: idx % 8 }),
        (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(a, b, name)| Op::CreateReaction {
            a: a % 8,
            b: b % 8,
            name: name % 4,
        }),
        any::<u8>().prop_map(|idx| Op::DeleteReaction { idx: idx % 4 }),
        (any::<u8>(), any::<u8>(), -1i8..4).prop_map(|(rea, node, stoich)| Op::AddSrc { rea: rea % 4, node: node % 8, stoich }),
        (any::<u8>(), any::<u8>()).prop_map(|(rea, node)| Op::DeleteSrc { rea: rea % 4, node: node % 8 }),
        (any::<u8>(), any::<u8>(), -1i8..4).prop_map(|(rea, node, stoich)| Op::SetStoich { rea: rea % 4, node: node % 8, stoich }),
        any::<u8>().prop_map(|name| Op::AddCompartment { name: name % 3 }),
        (any::<u8>(), proptest::option::of(0u8..3)).prop_map(|(node, comp)| Op::SetCompartment { node: node % 8, comp }),
        (0u8..3).prop_map(|idx| Op::DeleteCompartment { idx }),
        (any::<u8>(), any::<i16>(), any::<i16>(), any::<bool>()).prop_map(|(node, x, y, allow_negative)| Op::Move {
            node: node % 8,
            x,
            y,
            allow_negative,
        }),
        (any::<u8>(), any::<bool>()).prop_map(|(node, locked)| Op::Lock { node: node % 8, locked }),
        (0u8..3, any::<i8>()).prop_map(|(name, value)| Op::SetParameter { name, value }),
        (0u8..3).prop_map(|name| Op::RemoveParameter { name }),
    ]
}

fn apply_op(s: &mut Store, op: &Op) -> bool {
    let r = match *op {
        Op::NewNetwork { name } => s.new_network(&format!("net{}", name)).map(drop),
        Op::AddNode { neti, name, x, y } => s
            .add_node(neti as u32, &format!("S{}", name), x as f64 * 4.0, y as f64 * 4.0, 40.0, 20.0, true, false)
            .map(drop),
        Op::DeleteNode { idx } => s.delete_node(0, idx as u32),
        Op::AddAlias { idx } => s.add_alias_node(0, idx as u32, 10.0, 10.0, 40.0, 20.0).map(drop),
        Op::CreateReaction { a, b, name } => s.create_reaction(0, &format!("J{}", name), &[a as u32], &[b as u32]).map(drop),
        Op::DeleteReaction { idx } => s.delete_reaction(0, idx as u32),
        Op::AddSrc { rea, node, stoich } => s.add_src_node(0, rea as u32, node as u32, stoich as f64),
        Op::DeleteSrc { rea, node } => s.delete_src_node(0, rea as u32, node as u32),
        Op::SetStoich { rea, node, stoich } => s.set_reaction_src_node_stoich(0, rea as u32, node as u32, stoich as f64),
        Op::AddCompartment { name } => s.add_compartment(0, &format!("C{}", name), 0.0, 0.0, 500.0, 500.0).map(drop),
        Op::SetCompartment { node, comp } => s.set_compartment_of_node(0, node as u32, comp.map(u32::from)),
        Op::DeleteCompartment { idx } => s.delete_compartment(0, idx as u32),
        Op::Move { node, x, y, allow_negative } => s.set_node_coordinate(0, node as u32, x as f64, y as f64, allow_negative),
        Op::Lock { node, locked } => s.set_node_locked_status(0, node as u32, locked),
        Op::SetParameter { name, value } => s.set_parameter(0, &format!("k{}", name), value as f64),
        Op::RemoveParameter { name } => s.remove_parameter(0, &format!("k{}", name)),
    };
    r.is_ok()
}

/// Skips points sitting on the boundary of a segment's band, where the two
/// traversal directions may round differently.
fn clear_of_band_edges(p1: Vec2, p2: Vec2, pt: Vec2, breadth: f64) -> bool {
    let d = p2 - p1;
    let (t, off) = if d.x.abs() > 0.0 && d.y.abs() < d.x.abs() {
        let t = (pt.x - p1.x) / d.x;
        (t, pt.y - (p1.y + d.y * t))
    } else if d.y.abs() > 0.0 {
        let t = (pt.y - p1.y) / d.y;
        (t, pt.x - (p1.x + d.x * t))
    } else {
        return true;
    };
    let m = 1e-6;
    t.abs() > m && (t - 1.0).abs() > m && (off.abs() - breadth).abs() > m
}

/// Control points drawn from a tiny box half the time, so coincident and
/// collinear control polygons come up often.
fn control_point() -> impl Strategy<Value = (i16, i16)> {
    prop_oneof![(-2i16..2, -2i16..2), (-2000i16..2000, -2000i16..2000)]
}

fn cubic(c: [(i16, i16); 4]) -> CubicBezier {
    let p = |(x, y): (i16, i16)| Vec2::new(x as f64, y as f64);
    CubicBezier::new(p(c[0]), p(c[1]), p(c[2]), p(c[3]))
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 512, .. ProptestConfig::default() })]

    #[test]
    fn edits_undo_and_redo_through_every_state(seq in prop::collection::vec(op_strategy(), 1..40)) {
        let mut s = Store::new();
        s.new_network("base").unwrap();
        let mut states: Vec<NetworkSet> = vec![s.networks().clone()];
        let floor = s.undo_depth();

        for op in &seq {
            let depth = s.undo_depth();
            let before = s.networks().clone();
            let ok = apply_op(&mut s, op);
            if !ok || s.undo_depth() == depth {
                prop_assert_eq!(s.networks(), &before, "{:?} changed state without an undo step", op);
                prop_assert_eq!(s.undo_depth(), depth);
            } else {
                prop_assert_eq!(s.undo_depth(), depth + 1);
                states.push(s.networks().clone());
            }
            prop_assert_eq!(states.last().unwrap(), s.networks());
            prop_assert!(s.validate_state().is_ok(), "invalid after {:?}", op);
        }

        let forward = states.clone();
        while s.undo_depth() > floor {
            s.undo().unwrap();
            states.pop();
            prop_assert_eq!(states.last().unwrap(), s.networks());
        }
        for expected in &forward[1..] {
            s.redo().unwrap();
            prop_assert_eq!(expected, s.networks());
        }
        prop_assert!(!s.can_redo());
    }

    #[test]
    fn samples_start_and_end_on_the_endpoints(c in prop::array::uniform4((any::<i16>(), any::<i16>()))) {
        let curve = cubic(c);
        let pts = compute_bezier_points(&curve);
        prop_assert_eq!(pts[0], curve.p0);
        prop_assert_eq!(pts[MAX_SEGS], curve.p3);
    }

    #[test]
    fn band_test_ignores_direction(
        a in (-500i16..500, -500i16..500),
        b in (-500i16..500, -500i16..500),
        p in (-600i16..600, -600i16..600),
        breadth in 1u8..20,
    ) {
        let v = |(x, y): (i16, i16)| Vec2::new(x as f64, y as f64);
        let (p1, p2, pt, breadth) = (v(a), v(b), v(p), breadth as f64);
        prop_assume!(clear_of_band_edges(p1, p2, pt, breadth));
        prop_assert_eq!(pt_on_line(p1, p2, pt, breadth), pt_on_line(p2, p1, pt, breadth));
    }

    #[test]
    fn reversed_curve_hits_the_same_vertices(c in prop::array::uniform4(control_point())) {
        prop_assume!(c.iter().any(|p| *p != c[0]));
        let slack = EditorConfig::default().curve_slack;
        let fwd = cubic(c);
        let back = fwd.reversed();
        let pf = compute_bezier_points(&fwd);
        let pb = compute_bezier_points(&back);
        for i in 0..=MAX_SEGS {
            let (a, b) = (pf[i], pb[MAX_SEGS - i]);
            prop_assert!((a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6, "sample {}: {:?} vs {:?}", i, a, b);
        }
        for i in 0..=MAX_SEGS {
            prop_assert!(pt_on_bezier(&fwd, pf[i], slack).is_some(), "forward vertex {} missed", i);
            prop_assert!(pt_on_bezier(&back, pb[i], slack).is_some(), "reversed vertex {} missed", i);
        }
    }

    #[test]
    fn polyline_hit_ignores_direction(
        c in prop::array::uniform4((-300i16..300, -300i16..300)),
        p in (-300i16..300, -300i16..300),
        breadth in 1u8..12,
    ) {
        let pts = compute_bezier_points(&cubic(c));
        let pt = Vec2::new(p.0 as f64, p.1 as f64);
        let breadth = breadth as f64;
        prop_assume!(pts.windows(2).all(|w| clear_of_band_edges(w[0], w[1], pt, breadth)));
        let mut rev = pts;
        rev.reverse();
        prop_assert_eq!(pt_on_polyline(&pts, pt, breadth).is_some(), pt_on_polyline(&rev, pt, breadth).is_some());
    }
}
