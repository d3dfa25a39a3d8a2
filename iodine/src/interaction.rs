//! Dragging reaction handles.

use crate::config::EditorConfig;
use crate::curves::{HandleKind, ReactionCurves};
use crate::error::NomResult;
use crate::history::History;
use crate::model::Vec2;
use crate::Store;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragState {
    Select,
    MovingBezierHandle { reaction: u32, handle: HandleKind, offset: Vec2 },
}

/// A finished drag, ready to be written back with [`Store::commit_handle_drag`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandleDrag {
    pub reaction: u32,
    pub handle: HandleKind,
    pub tip: Vec2,
}

/// Tracks one handle drag on a reaction's arcs.
///
/// Mouse positions are view coordinates at the scale of the arcs being
/// dragged. The arcs are updated live while the mouse moves; the document is
/// only touched when the drag is committed.
#[derive(Clone, Debug)]
pub struct HandleDragger {
    state: DragState,
    hit_radius: f64,
}

impl HandleDragger {
    pub fn new(cfg: &EditorConfig) -> Self {
        HandleDragger { state: DragState::Select, hit_radius: cfg.handle_hit_radius() }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// Grabs the handle under `mouse`, if any.
    pub fn mouse_down(&mut self, curves: &ReactionCurves, mouse: Vec2) -> bool {
        match curves.handle_at(mouse, self.hit_radius) {
            Some((handle, tip)) => {
                let offset = mouse - tip * curves.scale();
                self.state = DragState::MovingBezierHandle { reaction: curves.reaction, handle, offset };
                log::debug!("grabbed {:?} of reaction {}", handle, curves.reaction);
                true
            }
            None => false,
        }
    }

    pub fn mouse_move(&mut self, curves: &mut ReactionCurves, mouse: Vec2) {
        if let DragState::MovingBezierHandle { reaction, handle, offset } = self.state {
            if reaction == curves.reaction {
                curves.set_handle(handle, (mouse - offset) / curves.scale());
            }
        }
    }

    /// Ends the gesture; always returns to `Select`.
    pub fn mouse_up(&mut self, curves: &ReactionCurves) -> Option<HandleDrag> {
        let state = std::mem::replace(&mut self.state, DragState::Select);
        match state {
            DragState::MovingBezierHandle { reaction, handle, .. } if reaction == curves.reaction => {
                let tip = curves.handle_pos(handle)?;
                Some(HandleDrag { reaction, handle, tip })
            }
            _ => None,
        }
    }
}

impl<H: History> Store<H> {
    /// Writes a dragged handle back as one undo step. A destination centroid
    /// handle is stored through its mirror, the source centroid handle.
    pub fn commit_handle_drag(&mut self, neti: u32, drag: &HandleDrag) -> NomResult<()> {
        match drag.handle {
            HandleKind::SrcCentroid => self.set_reaction_center_handle_position(neti, drag.reaction, drag.tip),
            HandleKind::DestCentroid => {
                let center = self.reaction_curves(neti, drag.reaction)?.real_center();
                self.set_reaction_center_handle_position(neti, drag.reaction, center * 2.0 - drag.tip)
            }
            HandleKind::Species { role, node } => self.set_handle(neti, drag.reaction, node, drag.tip, role),
        }
    }
}
