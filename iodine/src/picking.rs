use crate::config::EditorConfig;
use crate::curves::{HandleKind, ReactionCurves};
use crate::error::{ensure, NomResult};
use crate::geometry::rect::Rect;
use crate::history::History;
use crate::model::Vec2;
use crate::Store;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Pick {
    Node { id: u32 },
    Handle { reaction: u32, handle: HandleKind, tip: Vec2 },
    Reaction { id: u32 },
}

/// What lies under the view point `pt`: node rectangles win over reaction
/// handles, which win over the arcs themselves. Among nodes the last one given
/// (drawn on top) wins. Node rectangles are logical and scaled by `scale`;
/// `curves` carry their own scale, normally the same one.
pub fn pick<'a, I>(curves: &[ReactionCurves], nodes: I, pt: Vec2, scale: f64, cfg: &EditorConfig) -> Option<Pick>
where
    I: IntoIterator<Item = (u32, &'a Rect)>,
{
    // Nodes first
    let mut top = None;
    for (id, r) in nodes {
        if Rect::new(r.position * scale, r.size * scale).contains(pt) {
            top = Some(id);
        }
    }
    if let Some(id) = top {
        return Some(Pick::Node { id });
    }
    // Handles
    let r = cfg.handle_hit_radius();
    if let Some(p) = curves
        .iter()
        .find_map(|c| c.handle_at(pt, r).map(|(handle, tip)| Pick::Handle { reaction: c.reaction, handle, tip }))
    {
        return Some(p);
    }
    // Arcs
    curves.iter().find(|c| c.is_on_curve(pt)).map(|c| Pick::Reaction { id: c.reaction })
}

impl<H: History> Store<H> {
    pub fn pick(&self, neti: u32, pt: Vec2) -> NomResult<Option<Pick>> {
        self.pick_at_scale(neti, pt, 1.0)
    }

    /// Picks at view point `pt`, where the view shows the network at `scale`.
    pub fn pick_at_scale(&self, neti: u32, pt: Vec2, scale: f64) -> NomResult<Option<Pick>> {
        ensure(scale > 0.0, "view scale", scale)?;
        let net = self.network(neti)?;
        let rects: Vec<(u32, Rect)> = net.nodes().map(|(i, n)| (i, n.rect())).collect();
        let mut curves = self.network_curves(neti)?;
        for c in &mut curves {
            c.set_scale(scale)?;
        }
        Ok(pick(&curves, rects.iter().map(|(i, r)| (*i, r)), pt, scale, &self.config))
    }
}
