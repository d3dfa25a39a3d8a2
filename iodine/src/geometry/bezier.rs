//! Sampled cubic Bézier arcs.
//!
//! Every reaction arc is evaluated at the same `MAX_SEGS + 1` parameter steps,
//! so the Bernstein basis and its derivative are tabulated once per process
//! and reused for sampling, tangents and hit testing.

use super::cubic::CubicBezier;
use super::math::pt_on_line;
use crate::model::Vec2;
use std::sync::OnceLock;

/// Number of polyline segments an arc is sampled into.
pub const MAX_SEGS: usize = 29;

pub type BezierPoints = [Vec2; MAX_SEGS + 1];

struct Basis {
    j: [[f64; 4]; MAX_SEGS + 1],
    j_prime: [[f64; 4]; MAX_SEGS + 1],
}

static BASIS: OnceLock<Basis> = OnceLock::new();

const BINOM3: [f64; 4] = [1.0, 3.0, 3.0, 1.0];

fn basis() -> &'static Basis {
    BASIS.get_or_init(|| {
        let mut j = [[0.0; 4]; MAX_SEGS + 1];
        let mut j_prime = [[0.0; 4]; MAX_SEGS + 1];
        for step in 0..=MAX_SEGS {
            let t = step as f64 / MAX_SEGS as f64;
            let tm = 1.0 - t;
            for i in 0..4 {
                j[step][i] = BINOM3[i] * t.powi(i as i32) * tm.powi(3 - i as i32);
            }
            // degree 3 only
            j_prime[step] = [
                -3.0 * tm * tm,
                3.0 * tm * tm - 6.0 * t * tm,
                6.0 * t * tm - 3.0 * t * t,
                3.0 * t * t,
            ];
        }
        log::trace!("bezier basis tabulated for {} segments", MAX_SEGS);
        Basis { j, j_prime }
    })
}

/// Basis weights of the four control points at `step`.
pub fn basis_at(step: usize) -> Option<[f64; 4]> {
    basis().j.get(step).copied()
}

/// Samples the curve at `t = step / MAX_SEGS` for every step.
pub fn compute_bezier_points(ctrl: &CubicBezier) -> BezierPoints {
    let b = basis();
    let c = ctrl.to_array();
    let mut out = [Vec2::default(); MAX_SEGS + 1];
    for (step, pt) in out.iter_mut().enumerate() {
        let w = &b.j[step];
        *pt = c[0] * w[0] + c[1] * w[1] + c[2] * w[2] + c[3] * w[3];
    }
    out
}

/// Derivative of the curve at `step`; `None` past the last step.
pub fn bezier_tangent(ctrl: &CubicBezier, step: usize) -> Option<Vec2> {
    let w = basis().j_prime.get(step)?;
    let c = ctrl.to_array();
    Some(c[0] * w[0] + c[1] * w[1] + c[2] * w[2] + c[3] * w[3])
}

/// Hit-tests `pt` against the sampled polyline.
///
/// Segments are numbered by the sample they end on, from 1. Returns the
/// relative position `i / MAX_SEGS` of the first segment `i` whose band of
/// half-width `breadth` contains the point, matching the numbering of
/// [`super::intersect::bez_line_intersection`].
pub fn pt_on_bezier(ctrl: &CubicBezier, pt: Vec2, breadth: f64) -> Option<f64> {
    pt_on_polyline(&compute_bezier_points(ctrl), pt, breadth)
}

pub fn pt_on_polyline(points: &[Vec2], pt: Vec2, breadth: f64) -> Option<f64> {
    points
        .windows(2)
        .position(|w| pt_on_line(w[0], w[1], pt, breadth))
        .map(|i| (i + 1) as f64 / MAX_SEGS as f64)
}
