//! Control polygon of one reaction arc.
//!
//! Arcs are only ever evaluated through the tabulated basis in
//! [`super::bezier`], so this type carries the four points and nothing else.

use crate::model::Vec2;

/// `[start, handle, handle, end]` of a cubic Bézier arc.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
    pub p0: Vec2,
    pub p1: Vec2,
    pub p2: Vec2,
    pub p3: Vec2,
}

impl CubicBezier {
    pub fn new(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> Self {
        Self { p0, p1, p2, p3 }
    }

    pub fn to_array(&self) -> [Vec2; 4] {
        [self.p0, self.p1, self.p2, self.p3]
    }

    /// The same arc traversed from `p3` to `p0`.
    pub fn reversed(&self) -> Self {
        Self::new(self.p3, self.p2, self.p1, self.p0)
    }
}
