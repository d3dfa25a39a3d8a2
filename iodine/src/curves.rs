//! Drawable arcs of a reaction.
//!
//! Every participant gets one cubic arc running from the edge of its node to
//! the reaction center: `[node intersection, own handle, centroid handle,
//! center]`. Reactant arcs share the source centroid handle, product arcs the
//! destination one, and the two centroid handles mirror each other through
//! the center. Arcs are sampled lazily and cached until something they depend
//! on moves.
//!
//! Hit tests take view coordinates: logical positions times the view scale.
//! The samples are scaled before testing, so the slack band keeps the same
//! width in view pixels at every zoom.

use crate::config::EditorConfig;
use crate::error::{ensure, NomResult};
use crate::geometry::arrow::arrow_tip;
use crate::geometry::bezier::{compute_bezier_points, pt_on_polyline, BezierPoints};
use crate::geometry::cubic::CubicBezier;
use crate::geometry::intersect::compute_outer_segs;
use crate::geometry::intersect::segments_intersect;
use crate::geometry::math::{pt_on_line, pt_within_handle};
use crate::geometry::rect::{bounding_rect, compute_centroid, Rect};
use crate::history::History;
use crate::model::{Network, Reaction, Role, Vec2};
use crate::Store;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// Which handle of a reaction a point refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HandleKind {
    SrcCentroid,
    DestCentroid,
    Species { role: Role, node: u32 },
}

#[derive(Clone, Copy, Debug)]
struct Tuning {
    gap: f64,
    slack: f64,
    arrow: [Vec2; 4],
    tip_displacement: f64,
}

impl From<&EditorConfig> for Tuning {
    fn from(c: &EditorConfig) -> Self {
        Tuning { gap: c.node_edge_gap, slack: c.curve_slack, arrow: c.arrow_tip, tip_displacement: c.tip_displacement }
    }
}

#[derive(Clone, Debug)]
struct Sampled {
    intersection: Vec2,
    points: BezierPoints,
    arrow: Option<[Vec2; 4]>,
}

/// The arc of one participant.
#[derive(Clone, Debug)]
pub struct SpeciesCurve {
    pub node: u32,
    pub role: Role,
    rect: Rect,
    handle: Vec2,
    cache: RefCell<Option<Sampled>>,
}

impl SpeciesCurve {
    fn new(node: u32, role: Role, rect: Rect, handle: Vec2) -> Self {
        SpeciesCurve { node, role, rect, handle, cache: RefCell::new(None) }
    }

    pub fn handle(&self) -> Vec2 {
        self.handle
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    fn dirty(&self) {
        self.cache.replace(None);
    }

    fn is_dirty(&self) -> bool {
        self.cache.borrow().is_none()
    }

    fn sampled(&self, center: Vec2, c_handle: Vec2, straight: bool, t: &Tuning) -> Sampled {
        if let Some(s) = self.cache.borrow().as_ref() {
            return s.clone();
        }
        let s = self.recompute(center, c_handle, straight, t);
        self.cache.replace(Some(s.clone()));
        s
    }

    fn recompute(&self, center: Vec2, c_handle: Vec2, straight: bool, t: &Tuning) -> Sampled {
        let node_center = self.rect.center();
        let outer = self.rect.padded(t.gap);
        let longer = outer.size.x.max(outer.size.y);
        let toward = if straight { center } else { self.handle };
        let mut dir = toward - node_center;
        if dir.normalized(1.0) == Vec2::default() {
            dir = Vec2::new(0.0, 1.0);
        }
        let extended = node_center + dir.normalized(longer * 10.0);
        let intersection = compute_outer_segs(&self.rect, t.gap)
            .iter()
            .find_map(|side| segments_intersect(*side, (node_center, extended)))
            .unwrap_or(node_center);
        let ctrl = if straight {
            CubicBezier::new(intersection, intersection, center, center)
        } else {
            CubicBezier::new(intersection, self.handle, c_handle, center)
        };
        let arrow = match self.role {
            Role::Product => Some(arrow_tip(&t.arrow, intersection, intersection - extended, t.tip_displacement)),
            Role::Reactant => None,
        };
        log::trace!("arc of node {} resampled", self.node);
        Sampled { intersection, points: compute_bezier_points(&ctrl), arrow }
    }
}

/// All arcs of one reaction together with its centroid handles.
#[derive(Clone, Debug)]
pub struct ReactionCurves {
    pub reaction: u32,
    pub centroid: Vec2,
    pub center_pos: Option<Vec2>,
    pub src_c_handle: Vec2,
    pub dest_c_handle: Vec2,
    pub thickness: f64,
    pub bezier: bool,
    pub reactants: Vec<SpeciesCurve>,
    pub products: Vec<SpeciesCurve>,
    tuning: Tuning,
    scale: f64,
}

impl ReactionCurves {
    /// Lays out fresh arcs with the default handles: every node handle halfway
    /// to the center, the source centroid handle halfway to the first reactant.
    /// `None` when either side is empty.
    pub fn new(reaction: u32, reactants: &[(u32, Rect)], products: &[(u32, Rect)], cfg: &EditorConfig) -> Option<Self> {
        let first = reactants.first()?;
        products.first()?;
        let centroid = compute_centroid(reactants.iter().chain(products).map(|(_, r)| r))?;
        let src_c_handle = (first.1.center() + centroid) * 0.5;
        let curve = |role| move |(i, r): &(u32, Rect)| SpeciesCurve::new(*i, role, *r, (r.center() + centroid) * 0.5);
        Some(ReactionCurves {
            reaction,
            centroid,
            center_pos: None,
            src_c_handle,
            dest_c_handle: centroid * 2.0 - src_c_handle,
            thickness: 3.0,
            bezier: true,
            reactants: reactants.iter().map(curve(Role::Reactant)).collect(),
            products: products.iter().map(curve(Role::Product)).collect(),
            tuning: Tuning::from(cfg),
            scale: 1.0,
        })
    }

    /// Arcs for a stored reaction, using its saved handles.
    pub fn from_reaction(reaction: u32, net: &Network, rea: &Reaction, cfg: &EditorConfig) -> Option<Self> {
        let side = |role: Role| -> Option<Vec<SpeciesCurve>> {
            rea.side(role)
                .iter()
                .map(|(i, sn)| net.node(*i).map(|n| SpeciesCurve::new(*i, role, n.rect(), sn.handle_pos)))
                .collect()
        };
        let reactants = side(Role::Reactant)?;
        let products = side(Role::Product)?;
        let centroid = compute_centroid(reactants.iter().chain(&products).map(|c| &c.rect))?;
        let center = rea.center_pos.unwrap_or(centroid);
        Some(ReactionCurves {
            reaction,
            centroid,
            center_pos: rea.center_pos,
            src_c_handle: rea.center_handle_pos,
            dest_c_handle: center * 2.0 - rea.center_handle_pos,
            thickness: rea.thickness,
            bezier: rea.bezier_curves,
            reactants,
            products,
            tuning: Tuning::from(cfg),
            scale: 1.0,
        })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Sets the view scale used by the hit tests. Samples stay logical, so
    /// no arc is dirtied.
    pub fn set_scale(&mut self, scale: f64) -> NomResult<()> {
        ensure(scale > 0.0, "view scale", scale)?;
        self.scale = scale;
        Ok(())
    }

    /// The explicit center if set, otherwise the centroid.
    pub fn real_center(&self) -> Vec2 {
        self.center_pos.unwrap_or(self.centroid)
    }

    fn curves(&self) -> impl Iterator<Item = &SpeciesCurve> {
        self.reactants.iter().chain(&self.products)
    }

    fn curve_mut(&mut self, role: Role, node: u32) -> Option<&mut SpeciesCurve> {
        let side = match role {
            Role::Reactant => &mut self.reactants,
            Role::Product => &mut self.products,
        };
        side.iter_mut().find(|c| c.node == node)
    }

    fn c_handle(&self, role: Role) -> Vec2 {
        match role {
            Role::Reactant => self.src_c_handle,
            Role::Product => self.dest_c_handle,
        }
    }

    fn sampled(&self, c: &SpeciesCurve) -> Sampled {
        c.sampled(self.real_center(), self.c_handle(c.role), !self.bezier, &self.tuning)
    }

    fn dirty_all(&self) {
        self.curves().for_each(SpeciesCurve::dirty);
    }

    /// Re-derives the centroid handle opposite `moved` and dirties every arc.
    pub fn enforce_mirror(&mut self, moved: Role) {
        let c = self.real_center();
        match moved {
            Role::Reactant => self.dest_c_handle = c * 2.0 - self.src_c_handle,
            Role::Product => self.src_c_handle = c * 2.0 - self.dest_c_handle,
        }
        self.dirty_all();
    }

    pub fn handle_pos(&self, kind: HandleKind) -> Option<Vec2> {
        match kind {
            HandleKind::SrcCentroid => Some(self.src_c_handle),
            HandleKind::DestCentroid => Some(self.dest_c_handle),
            HandleKind::Species { role, node } => {
                let side = if role == Role::Reactant { &self.reactants } else { &self.products };
                side.iter().find(|c| c.node == node).map(|c| c.handle)
            }
        }
    }

    /// Moves one handle. Species handles dirty their own arc; centroid
    /// handles re-mirror and dirty every arc. Returns false for an unknown handle.
    pub fn set_handle(&mut self, kind: HandleKind, pos: Vec2) -> bool {
        match kind {
            HandleKind::SrcCentroid => {
                self.src_c_handle = pos;
                self.enforce_mirror(Role::Reactant);
            }
            HandleKind::DestCentroid => {
                self.dest_c_handle = pos;
                self.enforce_mirror(Role::Product);
            }
            HandleKind::Species { role, node } => match self.curve_mut(role, node) {
                Some(c) => {
                    c.handle = pos;
                    c.dirty();
                }
                None => return false,
            },
        }
        true
    }

    /// Shifts the center and the source centroid handle by `offset`.
    pub fn center_moved(&mut self, offset: Vec2) {
        self.center_pos = Some(self.real_center() + offset);
        self.src_c_handle += offset;
        self.enforce_mirror(Role::Reactant);
    }

    /// Takes new rectangles for moved participants. Every arc is dirtied when
    /// the real center shifts; otherwise only the moved ones.
    pub fn nodes_moved(&mut self, moved: &[(u32, Rect)]) {
        let before = self.real_center();
        for (node, rect) in moved {
            for c in self.reactants.iter_mut().chain(self.products.iter_mut()).filter(|c| c.node == *node) {
                c.rect = *rect;
                c.dirty();
            }
        }
        if let Some(centroid) = compute_centroid(self.curves().map(|c| &c.rect)) {
            self.centroid = centroid;
        }
        if !self.real_center().approx_eq(before) {
            self.enforce_mirror(Role::Reactant);
        }
    }

    /// Every handle tip: centroid handles first, then reactants, then products.
    pub fn handles(&self) -> Vec<(HandleKind, Vec2)> {
        let mut out = vec![(HandleKind::SrcCentroid, self.src_c_handle), (HandleKind::DestCentroid, self.dest_c_handle)];
        out.extend(self.curves().map(|c| (HandleKind::Species { role: c.role, node: c.node }, c.handle)));
        out
    }

    /// First handle whose square hit box of half-side `r` view pixels holds
    /// the view point `pt`. The returned tip is logical.
    pub fn handle_at(&self, pt: Vec2, r: f64) -> Option<(HandleKind, Vec2)> {
        self.handles().into_iter().find(|(_, h)| pt_within_handle(*h * self.scale, pt, r))
    }

    /// Hit test of the view point `pt` against the arcs, not counting the
    /// handles. The band is `slack + thickness / 2` view pixels wide.
    pub fn is_on_curve(&self, pt: Vec2) -> bool {
        let breadth = self.tuning.slack + self.thickness / 2.0;
        let k = self.scale;
        let center = self.real_center() * k;
        self.curves().any(|c| {
            let s = self.sampled(c);
            if self.bezier {
                pt_on_polyline(&s.points.map(|p| p * k), pt, breadth).is_some()
            } else {
                pt_on_line(s.intersection * k, center, pt, breadth)
            }
        })
    }

    pub fn points(&self, role: Role, node: u32) -> Option<BezierPoints> {
        let side = if role == Role::Reactant { &self.reactants } else { &self.products };
        side.iter().find(|c| c.node == node).map(|c| self.sampled(c).points)
    }

    pub fn intersection(&self, role: Role, node: u32) -> Option<Vec2> {
        let side = if role == Role::Reactant { &self.reactants } else { &self.products };
        side.iter().find(|c| c.node == node).map(|c| self.sampled(c).intersection)
    }

    /// Arrow polygons of the product arcs, in product order.
    pub fn arrows(&self) -> Vec<[Vec2; 4]> {
        self.products.iter().filter_map(|c| self.sampled(c).arrow).collect()
    }

    /// Number of arcs waiting to be resampled.
    pub fn dirty_count(&self) -> usize {
        self.curves().filter(|c| c.is_dirty()).count()
    }

    /// Box around every sampled point, arrow and handle.
    pub fn bounding_rect(&self) -> Option<Rect> {
        let mut pts: Vec<Vec2> = Vec::new();
        for c in self.curves() {
            let s = self.sampled(c);
            pts.extend(s.points.iter().copied());
            pts.extend(s.arrow.iter().flatten().copied());
        }
        pts.extend(self.handles().into_iter().map(|(_, h)| h));
        bounding_rect(pts)
    }
}

impl<H: History> Store<H> {
    pub fn reaction_curves(&self, neti: u32, reai: u32) -> NomResult<ReactionCurves> {
        let net = self.network(neti)?;
        let rea = self.reaction_ref(neti, reai)?;
        ReactionCurves::from_reaction(reai, net, rea, &self.config)
            .ok_or_else(|| crate::error::ValueError::Inconsistent(format!("reaction {} has no drawable arcs", reai)).into())
    }

    /// Arcs of every reaction in the network.
    pub fn network_curves(&self, neti: u32) -> NomResult<Vec<ReactionCurves>> {
        let net = self.network(neti)?;
        Ok(net.reactions().filter_map(|(i, r)| ReactionCurves::from_reaction(i, net, r, &self.config)).collect())
    }
}
