use crate::error;
use crate::interop::{arr_pts, arr_u32, new_obj, set_kv, to_js};
use crate::{Drag, Editor};
use iodine::curves::ReactionCurves;
use iodine::shape::PropertyValue;
use iodine::{EditorConfig, NomResult, Role, TipStyle, Vec2};
use js_sys::{Array, Uint32Array};
use serde::Serialize;
use wasm_bindgen::prelude::*;
type JsValue = wasm_bindgen::JsValue;

fn res<T: Serialize>(r: NomResult<T>) -> JsValue {
    match r {
        Ok(v) => error::ok(to_js(&v)),
        Err(e) => error::from_nom(&e),
    }
}

fn done(r: NomResult<()>) -> JsValue {
    match r {
        Ok(()) => error::ok(JsValue::TRUE),
        Err(e) => error::from_nom(&e),
    }
}

fn first_non_finite(vals: &[(&str, f64)]) -> Option<JsValue> {
    vals.iter().find(|(_, v)| !v.is_finite()).map(|(p, _)| error::non_finite(p))
}

/// `-1` is the base compartment; any other negative index is refused.
fn compartment_arg(compi: i32) -> Result<Option<u32>, JsValue> {
    match compi {
        -1 => Ok(None),
        c => u32::try_from(c).map(Some).map_err(|_| error::bad_compartment(c)),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NodeView {
    id: String,
    position: Vec2,
    rect_size: Vec2,
    locked: bool,
    floating: bool,
    compi: i32,
    original_idx: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReactionView {
    id: String,
    rate_law: String,
    reactants: Vec<u32>,
    products: Vec<u32>,
    reactant_stoich: Vec<f64>,
    product_stoich: Vec<f64>,
    center_pos: Option<Vec2>,
    center_handle_pos: Vec2,
    thickness: f64,
    bezier_curves: bool,
    modifiers: Vec<u32>,
    tip_style: TipStyle,
}

fn curves_obj(c: &ReactionCurves) -> JsValue {
    let arcs = Array::new();
    for role in [Role::Reactant, Role::Product] {
        let side = if role == Role::Reactant { &c.reactants } else { &c.products };
        for sc in side {
            if let Some(pts) = c.points(role, sc.node) {
                arcs.push(&arr_pts(&pts).into());
            }
        }
    }
    let arrows = Array::new();
    for a in c.arrows() {
        arrows.push(&arr_pts(&a).into());
    }
    let o = new_obj();
    set_kv(&o, "reaction", &JsValue::from_f64(c.reaction as f64));
    set_kv(&o, "arcs", &arcs.into());
    set_kv(&o, "arrows", &arrows.into());
    set_kv(&o, "handles", &to_js(&c.handles()));
    set_kv(&o, "center", &to_js(&c.real_center()));
    o.into()
}

#[wasm_bindgen]
impl Editor {
    /// `config` may be `undefined`, `null` or a partial config object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Editor {
        let cfg = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).unwrap_or_else(|e| {
                log::warn!("ignoring editor config: {}", e);
                EditorConfig::default()
            })
        };
        Editor::rs_new(cfg)
    }
    pub fn config(&self) -> JsValue {
        to_js(self.inner.config())
    }

    // Networks
    pub fn new_network(&mut self, id: &str) -> Option<u32> {
        self.inner.new_network(id).ok()
    }
    pub fn new_network_res(&mut self, id: &str) -> JsValue {
        res(self.inner.new_network(id))
    }
    pub fn delete_network_res(&mut self, neti: u32) -> JsValue {
        done(self.inner.delete_network(neti))
    }
    pub fn clear_networks(&mut self) {
        self.inner.clear_networks()
    }
    pub fn get_network_index_res(&self, id: &str) -> JsValue {
        res(self.inner.get_network_index(id))
    }
    pub fn get_list_of_networks(&self) -> Uint32Array {
        arr_u32(&self.inner.get_list_of_networks())
    }
    pub fn network_count(&self) -> u32 {
        self.inner.get_number_of_networks() as u32
    }

    // Undo / redo
    pub fn undo(&mut self) -> bool {
        self.inner.undo().is_ok()
    }
    pub fn undo_res(&mut self) -> JsValue {
        done(self.inner.undo())
    }
    pub fn redo(&mut self) -> bool {
        self.inner.redo().is_ok()
    }
    pub fn redo_res(&mut self) -> JsValue {
        done(self.inner.redo())
    }
    pub fn can_undo(&self) -> bool {
        self.inner.can_undo()
    }
    pub fn can_redo(&self) -> bool {
        self.inner.can_redo()
    }
    pub fn start_group(&mut self) {
        self.inner.start_group()
    }
    pub fn end_group(&mut self) {
        self.inner.end_group()
    }

    // Nodes
    pub fn add_node(&mut self, neti: u32, id: &str, x: f64, y: f64, w: f64, h: f64) -> Option<u32> {
        self.inner.add_node(neti, id, x, y, w, h, true, false).ok()
    }
    pub fn add_node_res(&mut self, neti: u32, id: &str, x: f64, y: f64, w: f64, h: f64, floating: bool, locked: bool) -> JsValue {
        if let Some(e) = first_non_finite(&[("x", x), ("y", y), ("w", w), ("h", h)]) {
            return e;
        }
        res(self.inner.add_node(neti, id, x, y, w, h, floating, locked))
    }
    pub fn add_alias_node_res(&mut self, neti: u32, original: u32, x: f64, y: f64, w: f64, h: f64) -> JsValue {
        if let Some(e) = first_non_finite(&[("x", x), ("y", y), ("w", w), ("h", h)]) {
            return e;
        }
        res(self.inner.add_alias_node(neti, original, x, y, w, h))
    }
    pub fn delete_node(&mut self, neti: u32, nodei: u32) -> bool {
        self.inner.delete_node(neti, nodei).is_ok()
    }
    pub fn delete_node_res(&mut self, neti: u32, nodei: u32) -> JsValue {
        done(self.inner.delete_node(neti, nodei))
    }
    pub fn get_list_of_node_indices(&self, neti: u32) -> Uint32Array {
        arr_u32(&self.inner.get_list_of_node_indices(neti).unwrap_or_default())
    }
    pub fn get_node_res(&self, neti: u32, nodei: u32) -> JsValue {
        let s = &self.inner;
        res((|| -> NomResult<NodeView> {
            let (position, rect_size) = s.get_node_coordinate_and_size(neti, nodei)?;
            Ok(NodeView {
                id: s.get_node_id(neti, nodei)?,
                position,
                rect_size,
                locked: s.is_node_locked(neti, nodei)?,
                floating: s.is_floating_node(neti, nodei)?,
                compi: s.get_compartment_of_node(neti, nodei)?.map_or(-1, |c| c as i32),
                original_idx: s.get_original_index(neti, nodei)?,
            })
        })())
    }
    pub fn set_node_coordinate_res(&mut self, neti: u32, nodei: u32, x: f64, y: f64, allow_negative: bool) -> JsValue {
        if let Some(e) = first_non_finite(&[("x", x), ("y", y)]) {
            return e;
        }
        done(self.inner.set_node_coordinate(neti, nodei, x, y, allow_negative))
    }
    pub fn set_node_size_res(&mut self, neti: u32, nodei: u32, w: f64, h: f64) -> JsValue {
        if let Some(e) = first_non_finite(&[("w", w), ("h", h)]) {
            return e;
        }
        done(self.inner.set_node_size(neti, nodei, w, h))
    }
    pub fn set_node_id_res(&mut self, neti: u32, nodei: u32, id: &str) -> JsValue {
        done(self.inner.set_node_id(neti, nodei, id))
    }
    pub fn set_node_fill_color_rgb_res(&mut self, neti: u32, nodei: u32, r: i32, g: i32, b: i32) -> JsValue {
        done(self.inner.set_node_fill_color_rgb(neti, nodei, r, g, b))
    }
    pub fn set_node_fill_color_alpha_res(&mut self, neti: u32, nodei: u32, a: f64) -> JsValue {
        done(self.inner.set_node_fill_color_alpha(neti, nodei, a))
    }
    pub fn set_node_border_color_rgb_res(&mut self, neti: u32, nodei: u32, r: i32, g: i32, b: i32) -> JsValue {
        done(self.inner.set_node_border_color_rgb(neti, nodei, r, g, b))
    }
    pub fn set_node_border_width_res(&mut self, neti: u32, nodei: u32, width: f64) -> JsValue {
        done(self.inner.set_node_border_width(neti, nodei, width))
    }
    pub fn get_node_shape_res(&self, neti: u32, nodei: u32) -> JsValue {
        res(self.inner.get_node_shape(neti, nodei))
    }
    pub fn set_node_shape_index_res(&mut self, neti: u32, nodei: u32, shapei: u32, preserve: bool) -> JsValue {
        done(self.inner.set_node_shape_index(neti, nodei, shapei as usize, preserve))
    }
    /// `value` is a color object `{r, g, b, a}`, a number or a string.
    pub fn set_node_primitive_property_res(&mut self, neti: u32, nodei: u32, prim_index: i32, property: &str, value: JsValue) -> JsValue {
        match serde_wasm_bindgen::from_value::<PropertyValue>(value) {
            Ok(v) => done(self.inner.set_node_primitive_property(neti, nodei, prim_index, property, &v)),
            Err(e) => error::err("value_error", e.to_string(), None),
        }
    }
    pub fn set_compartment_of_node_res(&mut self, neti: u32, nodei: u32, compi: i32) -> JsValue {
        match compartment_arg(compi) {
            Ok(c) => done(self.inner.set_compartment_of_node(neti, nodei, c)),
            Err(e) => e,
        }
    }

    // Reactions
    pub fn create_reaction(&mut self, neti: u32, id: &str, sources: Vec<u32>, targets: Vec<u32>) -> Option<u32> {
        self.inner.create_reaction(neti, id, &sources, &targets).ok()
    }
    pub fn create_reaction_res(&mut self, neti: u32, id: &str, sources: Vec<u32>, targets: Vec<u32>) -> JsValue {
        res(self.inner.create_reaction(neti, id, &sources, &targets))
    }
    pub fn create_uni_uni_res(&mut self, neti: u32, id: &str, rate_law: &str, src: u32, dest: u32, src_stoich: f64, dest_stoich: f64) -> JsValue {
        res(self.inner.create_uni_uni(neti, id, rate_law, src, dest, src_stoich, dest_stoich))
    }
    pub fn delete_reaction_res(&mut self, neti: u32, reai: u32) -> JsValue {
        done(self.inner.delete_reaction(neti, reai))
    }
    pub fn get_list_of_reaction_indices(&self, neti: u32) -> Uint32Array {
        arr_u32(&self.inner.get_list_of_reaction_indices(neti).unwrap_or_default())
    }
    pub fn get_reaction_res(&self, neti: u32, reai: u32) -> JsValue {
        let s = &self.inner;
        res((|| -> NomResult<ReactionView> {
            Ok(ReactionView {
                id: s.get_reaction_id(neti, reai)?,
                rate_law: s.get_reaction_rate_law(neti, reai)?,
                reactants: s.get_list_of_reaction_src_nodes(neti, reai)?,
                products: s.get_list_of_reaction_dest_nodes(neti, reai)?,
                reactant_stoich: s.get_list_of_reaction_src_stoich(neti, reai)?,
                product_stoich: s.get_list_of_reaction_dest_stoich(neti, reai)?,
                center_pos: s.get_reaction_center_pos(neti, reai)?,
                center_handle_pos: s.get_reaction_center_handle_position(neti, reai)?,
                thickness: s.get_reaction_line_thickness(neti, reai)?,
                bezier_curves: s.get_reaction_bezier_curves(neti, reai)?,
                modifiers: s.get_reaction_modifiers(neti, reai)?,
                tip_style: s.get_modifier_tip_style(neti, reai)?,
            })
        })())
    }
    pub fn add_src_node_res(&mut self, neti: u32, reai: u32, nodei: u32, stoich: f64) -> JsValue {
        done(self.inner.add_src_node(neti, reai, nodei, stoich))
    }
    pub fn add_dest_node_res(&mut self, neti: u32, reai: u32, nodei: u32, stoich: f64) -> JsValue {
        done(self.inner.add_dest_node(neti, reai, nodei, stoich))
    }
    pub fn delete_src_node_res(&mut self, neti: u32, reai: u32, nodei: u32) -> JsValue {
        done(self.inner.delete_src_node(neti, reai, nodei))
    }
    pub fn delete_dest_node_res(&mut self, neti: u32, reai: u32, nodei: u32) -> JsValue {
        done(self.inner.delete_dest_node(neti, reai, nodei))
    }
    pub fn set_reaction_src_node_stoich_res(&mut self, neti: u32, reai: u32, nodei: u32, stoich: f64) -> JsValue {
        done(self.inner.set_reaction_src_node_stoich(neti, reai, nodei, stoich))
    }
    pub fn set_reaction_dest_node_stoich_res(&mut self, neti: u32, reai: u32, nodei: u32, stoich: f64) -> JsValue {
        done(self.inner.set_reaction_dest_node_stoich(neti, reai, nodei, stoich))
    }
    pub fn set_rate_law_res(&mut self, neti: u32, reai: u32, rate_law: &str) -> JsValue {
        done(self.inner.set_rate_law(neti, reai, rate_law))
    }
    /// Both coordinates absent clears the explicit center.
    pub fn set_reaction_center_pos_res(&mut self, neti: u32, reai: u32, x: Option<f64>, y: Option<f64>) -> JsValue {
        let pos = match (x, y) {
            (Some(x), Some(y)) => Some(Vec2::new(x, y)),
            (None, None) => None,
            _ => return error::err("value_error", "center needs both coordinates or neither", None),
        };
        done(self.inner.set_reaction_center_pos(neti, reai, pos))
    }
    pub fn set_reaction_bezier_curves_res(&mut self, neti: u32, reai: u32, bezier: bool) -> JsValue {
        done(self.inner.set_reaction_bezier_curves(neti, reai, bezier))
    }
    pub fn set_reaction_modifiers_res(&mut self, neti: u32, reai: u32, modifiers: Vec<u32>) -> JsValue {
        done(self.inner.set_reaction_modifiers(neti, reai, &modifiers))
    }
    /// `style` is `"circle"` or `"tee"`.
    pub fn set_modifier_tip_style_res(&mut self, neti: u32, reai: u32, style: &str) -> JsValue {
        match style {
            "circle" => done(self.inner.set_modifier_tip_style(neti, reai, TipStyle::Circle)),
            "tee" => done(self.inner.set_modifier_tip_style(neti, reai, TipStyle::Tee)),
            _ => error::err("value_error", format!("unknown tip style '{}'", style), None),
        }
    }

    // Compartments
    pub fn add_compartment_res(&mut self, neti: u32, id: &str, x: f64, y: f64, w: f64, h: f64) -> JsValue {
        res(self.inner.add_compartment(neti, id, x, y, w, h))
    }
    pub fn delete_compartment_res(&mut self, neti: u32, compi: u32) -> JsValue {
        done(self.inner.delete_compartment(neti, compi))
    }
    /// `compi` of -1 lists the nodes outside every compartment.
    pub fn get_nodes_in_compartment_res(&self, neti: u32, compi: i32) -> JsValue {
        match compartment_arg(compi) {
            Ok(c) => res(self.inner.get_nodes_in_compartment(neti, c)),
            Err(e) => e,
        }
    }

    // Parameters
    pub fn set_parameter_res(&mut self, neti: u32, name: &str, value: f64) -> JsValue {
        done(self.inner.set_parameter(neti, name, value))
    }
    pub fn remove_parameter_res(&mut self, neti: u32, name: &str) -> JsValue {
        done(self.inner.remove_parameter(neti, name))
    }
    pub fn get_parameters_res(&self, neti: u32) -> JsValue {
        res(self.inner.get_parameters(neti))
    }

    // Curves and picking
    pub fn reaction_curves_res(&self, neti: u32, reai: u32) -> JsValue {
        match self.inner.reaction_curves(neti, reai) {
            Ok(c) => error::ok(curves_obj(&c)),
            Err(e) => error::from_nom(&e),
        }
    }
    pub fn pick_res(&self, neti: u32, x: f64, y: f64) -> JsValue {
        if let Some(e) = first_non_finite(&[("x", x), ("y", y)]) {
            return e;
        }
        res(self.inner.pick_at_scale(neti, Vec2::new(x, y), self.view_scale))
    }
    pub fn view_scale(&self) -> f64 {
        self.view_scale
    }
    /// Zoom of the canvas. Pick and drag coordinates are view pixels at this scale.
    pub fn set_view_scale_res(&mut self, scale: f64) -> JsValue {
        if let Some(e) = first_non_finite(&[("scale", scale)]) {
            return e;
        }
        if scale <= 0.0 {
            return error::from_nom(&iodine::ValueError::OutOfRange { param: "view scale", got: scale }.into());
        }
        // a drag in progress keeps the scale it was grabbed at
        self.view_scale = scale;
        error::ok(JsValue::TRUE)
    }

    // Handle drag
    /// Starts dragging the handle of `reai` under the mouse; false when none is hit.
    pub fn drag_start(&mut self, neti: u32, reai: u32, x: f64, y: f64) -> bool {
        let Ok(mut curves) = self.inner.reaction_curves(neti, reai) else {
            return false;
        };
        if curves.set_scale(self.view_scale).is_err() {
            return false;
        }
        if !self.dragger.mouse_down(&curves, Vec2::new(x, y)) {
            return false;
        }
        self.drag = Some(Drag { neti, curves });
        true
    }
    /// Moves the grabbed handle and returns the updated arcs, or `null` when idle.
    pub fn drag_move(&mut self, x: f64, y: f64) -> JsValue {
        match self.drag.as_mut() {
            Some(d) => {
                self.dragger.mouse_move(&mut d.curves, Vec2::new(x, y));
                curves_obj(&d.curves)
            }
            None => JsValue::NULL,
        }
    }
    /// Finishes the drag and records the moved handle as one undo step.
    pub fn drag_end_res(&mut self) -> JsValue {
        let Some(d) = self.drag.take() else {
            return error::no_drag();
        };
        match self.dragger.mouse_up(&d.curves) {
            Some(grab) => done(self.inner.commit_handle_drag(d.neti, &grab)),
            None => error::no_drag(),
        }
    }

    // Documents
    pub fn dump_network_res(&self, neti: u32) -> JsValue {
        res(self.inner.dump_network_json(neti))
    }
    pub fn load_network_res(&mut self, json: &str) -> JsValue {
        self.drag = None;
        res(self.inner.load_network_json(json))
    }
    pub fn validate_res(&self) -> JsValue {
        done(self.inner.validate_state())
    }
}
