// Segment intersection and clipping of sampled arcs against padded node rectangles.

use super::bezier::MAX_SEGS;
use super::rect::Rect;
use super::tolerance::EPS_DET;
use crate::model::Vec2;
use serde::Serialize;

#[inline]
fn determinant(a: Vec2, b: Vec2) -> f64 {
    a.x * b.y - b.x * a.y
}

/// Intersection point of `seg1` and `seg2`, or `None` when they miss or are parallel.
///
/// Solves the 2x2 system for both segment parameters; the point is reported
/// on `seg2`.
pub fn segments_intersect(seg1: (Vec2, Vec2), seg2: (Vec2, Vec2)) -> Option<Vec2> {
    let (p1, q1) = seg1;
    let (p2, q2) = seg2;
    let lk = q2 - p2;
    let nm = p1 - q1;
    let mk = q1 - p2;

    let det = determinant(nm, lk);
    if det.abs() < EPS_DET {
        return None;
    }
    let s = (nm.x * mk.y - nm.y * mk.x) / det;
    let t = (lk.x * mk.y - lk.y * mk.x) / det;
    if !(0.0..=1.0).contains(&s) || !(0.0..=1.0).contains(&t) {
        return None;
    }
    Some(p2 + lk * s)
}

/// Sides of `rect` padded outward by `gap`, clockwise from the top-left.
pub fn compute_outer_segs(rect: &Rect, gap: f64) -> [(Vec2, Vec2); 4] {
    rect.padded(gap).sides()
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BezIntersection {
    pub point: Vec2,
    pub segment: usize,
    #[serde(rename = "relPos")]
    pub rel_pos: f64,
}

/// First polyline segment (lowest parameter) that crosses the padded rectangle.
pub fn bez_line_intersection(points: &[Vec2], rect: &Rect, gap: f64) -> Option<BezIntersection> {
    let sides = compute_outer_segs(rect, gap);
    for (i, w) in points.windows(2).enumerate() {
        let segment = i + 1;
        for side in &sides {
            if let Some(point) = segments_intersect(*side, (w[0], w[1])) {
                return Some(BezIntersection { point, segment, rel_pos: segment as f64 / MAX_SEGS as f64 });
            }
        }
    }
    None
}
