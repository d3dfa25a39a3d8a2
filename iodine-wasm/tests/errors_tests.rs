use iodine_wasm::Editor;
use js_sys::Reflect;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn is_err(v: &JsValue, code: &str) -> bool {
    if let Ok(ok) =
        Reflect::get(v, &JsValue::from_str("ok")).and_then(|x| x.as_bool().ok_or(JsValue::NULL))
    {
        if ok {
            return false;
        }
        if let Ok(err) = Reflect::get(v, &JsValue::from_str("error")) {
            if let Ok(c) = Reflect::get(&err, &JsValue::from_str("code")) {
                return c.as_string().map_or(false, |s| s == code);
            }
        }
    }
    false
}

fn numeric_code(v: &JsValue) -> Option<f64> {
    let err = Reflect::get(v, &JsValue::from_str("error")).ok()?;
    let data = Reflect::get(&err, &JsValue::from_str("data")).ok()?;
    Reflect::get(&data, &JsValue::from_str("code")).ok()?.as_f64()
}

fn editor_with_pair() -> (Editor, u32, u32, u32) {
    let mut e = Editor::new(JsValue::UNDEFINED);
    let n = e.new_network("net").unwrap();
    let a = e.add_node(n, "A", 0.0, 0.0, 50.0, 30.0).unwrap();
    let b = e.add_node(n, "B", 200.0, 0.0, 50.0, 30.0).unwrap();
    (e, n, a, b)
}

#[wasm_bindgen_test]
fn referential_errors_carry_codes() {
    let (mut e, n, a, b) = editor_with_pair();
    let before = e.store().networks().clone();

    let r = e.get_node_res(n, 99);
    assert!(is_err(&r, "invalid_node"));
    assert_eq!(numeric_code(&r), Some(-7.0));

    assert!(is_err(&e.delete_network_res(42), "invalid_network"));
    assert!(is_err(&e.add_node_res(n, "A", 0.0, 0.0, 10.0, 10.0, true, false), "id_repeat"));
    assert!(is_err(&e.new_network_res("net"), "id_repeat"));
    assert!(is_err(&e.get_network_index_res("nope"), "id_not_found"));
    assert!(is_err(&e.get_reaction_res(n, 0), "invalid_reaction"));
    assert!(is_err(&e.get_nodes_in_compartment_res(n, 3), "invalid_compartment"));
    let r = e.set_compartment_of_node_res(n, a, -2);
    assert!(is_err(&r, "invalid_compartment"));
    assert_eq!(numeric_code(&r), Some(-13.0));
    assert!(is_err(&e.get_nodes_in_compartment_res(n, i32::MIN), "invalid_compartment"));
    assert!(is_err(&e.create_reaction_res(n, "r", vec![a], vec![7]), "invalid_node"));
    assert_eq!(e.store().networks(), &before, "state mutated on error");

    e.create_reaction(n, "r", vec![a], vec![b]).unwrap();
    let r = e.delete_node_res(n, a);
    assert!(is_err(&r, "node_not_free"));
    assert_eq!(numeric_code(&r), Some(-4.0));
    assert!(is_err(&e.set_reaction_src_node_stoich_res(n, 0, a, 0.0), "invalid_stoich"));
}

#[wasm_bindgen_test]
fn value_errors_share_one_code() {
    let (mut e, n, a, b) = editor_with_pair();
    let before = e.store().networks().clone();
    let depth = e.store().undo_depth();

    let r = e.create_reaction_res(n, "r", vec![], vec![b]);
    assert!(is_err(&r, "value_error"));
    assert_eq!(numeric_code(&r), Some(-12.0));
    assert!(is_err(&e.create_reaction_res(n, "r", vec![a], vec![a]), "value_error"));
    assert!(is_err(&e.set_node_fill_color_rgb_res(n, a, 300, 0, 0), "value_error"));
    assert!(is_err(&e.set_node_fill_color_alpha_res(n, a, 1.5), "value_error"));
    assert!(is_err(&e.set_node_border_width_res(n, a, 0.0), "value_error"));
    assert!(is_err(&e.set_node_shape_index_res(n, a, 999, false), "value_error"));
    assert!(is_err(&e.set_node_size_res(n, a, -1.0, 10.0), "value_error"));
    assert!(is_err(&e.set_modifier_tip_style_res(n, 0, "arrow"), "value_error"));
    assert!(is_err(&e.set_reaction_center_pos_res(n, 0, Some(1.0), None), "value_error"));
    assert!(is_err(
        &e.set_node_primitive_property_res(n, a, 5, "fill_color", JsValue::from_f64(1.0)),
        "value_error"
    ));

    assert_eq!(e.store().networks(), &before);
    assert_eq!(e.store().undo_depth(), depth);
}

#[wasm_bindgen_test]
fn non_finite_inputs_rejected_at_boundary() {
    let (mut e, n, a, _) = editor_with_pair();
    let r = e.add_node_res(n, "C", f64::NAN, 0.0, 10.0, 10.0, true, false);
    assert!(is_err(&r, "non_finite"));
    assert!(is_err(&e.set_node_coordinate_res(n, a, 0.0, f64::INFINITY, false), "non_finite"));
    assert!(is_err(&e.pick_res(n, f64::NAN, 0.0), "non_finite"));
    assert_eq!(e.get_list_of_node_indices(n).length(), 2);
}

#[wasm_bindgen_test]
fn empty_stacks_and_idle_drag() {
    let mut e = Editor::new(JsValue::NULL);
    let r = e.undo_res();
    assert!(is_err(&r, "stack_empty"));
    assert_eq!(numeric_code(&r), Some(-9.0));
    assert!(is_err(&e.redo_res(), "stack_empty"));
    assert!(!e.undo());
    assert!(is_err(&e.drag_end_res(), "no_drag"));
    assert!(e.drag_move(1.0, 1.0).is_null());
}

#[wasm_bindgen_test]
fn malformed_documents_are_json_errors() {
    let (mut e, n, _, _) = editor_with_pair();
    let before = e.store().networks().clone();
    let r = e.load_network_res("{\"id\": ");
    assert!(is_err(&r, "invalid_json"));
    assert_eq!(numeric_code(&r), Some(-10.0));
    assert!(is_err(&e.load_network_res("{\"id\": \"x\", \"nodes\": {}, \"reactions\": {}}"), "invalid_json"));
    assert_eq!(e.store().networks(), &before);
    assert_eq!(e.get_list_of_node_indices(n).length(), 2);
}
