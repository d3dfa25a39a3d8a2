use crate::model::Vec2;

/// Arrow polygon in local coordinates; the last point is the apex.
pub const DEFAULT_ARROW_TIP: [Vec2; 4] = [
    Vec2::new(0.0, 14.0),
    Vec2::new(3.0, 7.0),
    Vec2::new(0.0, 0.0),
    Vec2::new(20.0, 7.0),
];

/// Places the arrow `template` so its apex sits `displacement` past `tip`
/// along `dir`, rotated to point along `dir`.
pub fn arrow_tip(template: &[Vec2; 4], tip: Vec2, dir: Vec2, displacement: f64) -> [Vec2; 4] {
    let alpha = -dir.y.atan2(dir.x);
    let (sine, cosine) = alpha.sin_cos();
    let apex = tip + Vec2::new(cosine, -sine) * displacement;

    let mut out = template.map(|p| Vec2::new(p.x * cosine + p.y * sine, -p.x * sine + p.y * cosine));
    let offset = apex - out[3];
    for p in out.iter_mut() {
        *p += offset;
    }
    out
}
