use crate::model::Vec2;

/// Band test of `pt` against segment `p1 p2`.
///
/// The segment is parameterized along its dominant axis; the point hits when
/// that parameter lies in [0, 1] and the off-axis distance is within `breadth`.
/// A zero-length segment never hits.
pub fn pt_on_line(p1: Vec2, p2: Vec2, pt: Vec2, breadth: f64) -> bool {
    let d = p2 - p1;
    if d.x.abs() > 0.0 && d.y.abs() < d.x.abs() {
        let t = (pt.x - p1.x) / d.x;
        if !(0.0..=1.0).contains(&t) {
            return false;
        }
        let y = p1.y + d.y * t;
        y - breadth <= pt.y && pt.y <= y + breadth
    } else if d.y.abs() > 0.0 {
        let t = (pt.y - p1.y) / d.y;
        if !(0.0..=1.0).contains(&t) {
            return false;
        }
        let x = p1.x + d.x * t;
        x - breadth <= pt.x && pt.x <= x + breadth
    } else {
        false
    }
}

/// Square hit box of half-side `r` around a handle tip.
pub fn pt_within_handle(handle: Vec2, pt: Vec2, r: f64) -> bool {
    (pt.x - handle.x).abs() <= r && (pt.y - handle.y).abs() <= r
}

/// Which of a curve's two handles, if any, lies under `pt`.
pub fn check_particular_bezier_curve(pt: Vec2, h1: Vec2, h2: Vec2, r: f64) -> Option<usize> {
    if pt_within_handle(h1, pt, r) {
        Some(0)
    } else if pt_within_handle(h2, pt, r) {
        Some(1)
    } else {
        None
    }
}
