// Centralized tolerances for curve geometry

pub const EPS_LEN: f64 = 1e-6;            // zero-length vector threshold
pub const EPS_DET: f64 = 1e-6;            // parallel segments below this determinant

#[inline] pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool { (a - b).abs() <= eps }
