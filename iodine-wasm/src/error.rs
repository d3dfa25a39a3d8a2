use iodine::{Error, NomError};
use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;

fn set_kv(obj: &Object, k: &str, v: &JsValue) { let _ = Reflect::set(obj, &JsValue::from_str(k), v); }

fn new_obj() -> Object { Object::new() }

pub fn ok(v: JsValue) -> JsValue {
    let o = new_obj();
    set_kv(&o, "ok", &JsValue::from_bool(true));
    set_kv(&o, "value", &v);
    o.into()
}

pub fn err(code: &'static str, message: impl Into<String>, data: Option<JsValue>) -> JsValue {
    let root = new_obj();
    set_kv(&root, "ok", &JsValue::from_bool(false));
    let e = new_obj();
    set_kv(&e, "code", &JsValue::from_str(code));
    set_kv(&e, "message", &JsValue::from_str(&message.into()));
    if let Some(d) = data { set_kv(&e, "data", &d); }
    set_kv(&root, "error", &e.into());
    root.into()
}

/// String code reported to scripts for a model error.
pub fn code_for(e: &Error) -> &'static str {
    match e {
        Error::Nom(n) => match n {
            NomError::IdNotFound(_) => "id_not_found",
            NomError::IdRepeat(_) => "id_repeat",
            NomError::NodeNotFree(_) => "node_not_free",
            NomError::NetIndex(_) => "invalid_network",
            NomError::ReactionIndex(_) => "invalid_reaction",
            NomError::NodeIndex(_) => "invalid_node",
            NomError::CompartmentIndex(_) => "invalid_compartment",
            NomError::Stoich(_) => "invalid_stoich",
            NomError::StackEmpty(_) => "stack_empty",
            NomError::Json(_) => "invalid_json",
        },
        Error::Value(_) => "value_error",
    }
}

/// Error envelope with the numeric code under `data.code`.
pub fn from_nom(e: &Error) -> JsValue {
    let d = new_obj();
    set_kv(&d, "code", &JsValue::from_f64(e.code() as f64));
    err(code_for(e), e.to_string(), Some(d.into()))
}

#[inline]
pub fn non_finite(param: &str) -> JsValue {
    let d = new_obj(); set_kv(&d, "param", &JsValue::from_str(param));
    err("non_finite", format!("parameter '{}' must be finite", param), Some(d.into()))
}

/// A negative compartment index other than the base compartment's `-1`.
pub fn bad_compartment(compi: i32) -> JsValue {
    let d = new_obj();
    set_kv(&d, "code", &JsValue::from_f64(Error::from(NomError::CompartmentIndex(0)).code() as f64));
    err("invalid_compartment", format!("compartment index not found: {}", compi), Some(d.into()))
}

#[inline]
pub fn no_drag() -> JsValue { err("no_drag", "no handle drag in progress", None) }
