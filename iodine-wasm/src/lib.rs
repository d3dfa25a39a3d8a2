use wasm_bindgen::prelude::*;
mod api;
mod error;
mod interop;
mod logging;

pub use logging::{init_logging, set_panic_hook};

/// Handle drag in progress: the network it belongs to and the live arcs.
pub(crate) struct Drag {
    pub neti: u32,
    pub curves: iodine::curves::ReactionCurves,
}

#[wasm_bindgen]
pub struct Editor {
    pub(crate) inner: iodine::Store,
    pub(crate) dragger: iodine::interaction::HandleDragger,
    pub(crate) drag: Option<Drag>,
    pub(crate) view_scale: f64, // zoom of the canvas; pick and drag points are in view pixels
}

impl Editor {
    pub fn rs_new(config: iodine::EditorConfig) -> Editor {
        let dragger = iodine::interaction::HandleDragger::new(&config);
        Editor { inner: iodine::Store::with_config(config), dragger, drag: None, view_scale: 1.0 }
    }
    pub fn store(&self) -> &iodine::Store { &self.inner }
}
