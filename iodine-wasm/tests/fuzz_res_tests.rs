use iodine_wasm::Editor;
use js_sys::Reflect;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn is_ok(v: &JsValue) -> bool { Reflect::get(v, &JsValue::from_str("ok")).ok().and_then(|x| x.as_bool()).unwrap_or(false) }

#[wasm_bindgen_test]
fn fuzz_res_methods_no_abort() {
    let mut e = Editor::new(JsValue::UNDEFINED);
    let n = e.new_network("net").unwrap();
    let a = e.add_node(n, "A", 0.0, 0.0, 50.0, 30.0).unwrap();
    let b = e.add_node(n, "B", 200.0, 0.0, 50.0, 30.0).unwrap();
    let r = e.create_reaction(n, "r", vec![a], vec![b]).unwrap();

    // Simple LCG
    let mut seed: u64 = 0x1234_5678_ABCD_EF01;
    let mut rnd = || { seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1); (seed >> 16) as u32 };

    for step in 0..500u32 {
        let op = rnd() % 14;
        let before = e.store().networks().clone();
        let depth = e.store().undo_depth();
        let node = rnd() % 6;
        let f = f64::from_bits(((rnd() as u64) << 32) | rnd() as u64);
        let res = match op {
            0 => e.add_node_res(n, &format!("N{}", rnd() % 20), f, (rnd() % 500) as f64, 20.0, 20.0, true, false),
            1 => e.set_node_coordinate_res(n, node, f, f, rnd() % 2 == 0),
            2 => e.delete_node_res(n, node),
            3 => e.create_reaction_res(n, &format!("R{}", step), vec![node], vec![rnd() % 6]),
            4 => e.delete_reaction_res(n, rnd() % 3),
            5 => e.set_reaction_src_node_stoich_res(n, r, node, f),
            6 => e.add_dest_node_res(n, r, node, (rnd() % 3) as f64),
            7 => e.delete_src_node_res(n, r, node),
            8 => e.set_node_fill_color_rgb_res(n, node, (rnd() % 400) as i32 - 50, 0, 0),
            9 => e.set_node_size_res(n, node, f, 10.0),
            10 => e.set_compartment_of_node_res(n, node, (rnd() % 3) as i32 - 1),
            11 => e.add_compartment_res(n, "c", f, 0.0, 100.0, 100.0),
            12 => e.set_parameter_res(n, "k", f),
            13 => e.pick_res(n, f, 10.0),
            _ => unreachable!()
        };
        // No aborts and no state mutation on error paths
        if !is_ok(&res) {
            assert_eq!(e.store().networks(), &before);
            assert_eq!(e.store().undo_depth(), depth);
        }
        assert!(is_ok(&e.validate_res()), "inconsistent after op {}", op);
    }

    while e.undo() {}
    assert!(is_ok(&e.validate_res()));
    assert_eq!(e.network_count(), 0);
}
