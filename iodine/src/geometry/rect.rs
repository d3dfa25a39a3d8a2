use crate::model::Vec2;
use serde::Serialize;

/// Axis-aligned rectangle given by its top-left corner and size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Rect {
    pub position: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(position: Vec2, size: Vec2) -> Self {
        Rect { position, size }
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    pub fn end(&self) -> Vec2 {
        self.position + self.size
    }

    /// Grows the rectangle by `gap` on every side.
    pub fn padded(&self, gap: f64) -> Rect {
        Rect::new(self.position - Vec2::repeat(gap), self.size + Vec2::repeat(gap * 2.0))
    }

    /// The four sides, clockwise from the top-left corner.
    pub fn sides(&self) -> [(Vec2, Vec2); 4] {
        let p = self.position;
        let e = self.end();
        let tl = p;
        let tr = Vec2::new(e.x, p.y);
        let br = e;
        let bl = Vec2::new(p.x, e.y);
        [(tl, tr), (tr, br), (br, bl), (bl, tl)]
    }

    /// Inclusive on every edge.
    pub fn contains(&self, pt: Vec2) -> bool {
        let e = self.end();
        pt.x >= self.position.x && pt.y >= self.position.y && pt.x <= e.x && pt.y <= e.y
    }
}

/// Smallest rectangle holding every point; `None` for an empty input.
pub fn bounding_rect<I: IntoIterator<Item = Vec2>>(points: I) -> Option<Rect> {
    let mut it = points.into_iter();
    let first = it.next()?;
    let (mut lo, mut hi) = (first, first);
    for p in it {
        lo.x = lo.x.min(p.x); lo.y = lo.y.min(p.y);
        hi.x = hi.x.max(p.x); hi.y = hi.y.max(p.y);
    }
    Some(Rect::new(lo, hi - lo))
}

/// Mean of the rectangle centers; `None` for an empty input.
pub fn compute_centroid<'a, I: IntoIterator<Item = &'a Rect>>(rects: I) -> Option<Vec2> {
    let mut sum = Vec2::default();
    let mut n = 0usize;
    for r in rects {
        sum += r.center();
        n += 1;
    }
    if n == 0 { None } else { Some(sum / n as f64) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_grows_each_side() {
        let r = Rect::new(Vec2::new(10.0, 10.0), Vec2::new(20.0, 10.0)).padded(4.0);
        assert_eq!(r.position, Vec2::new(6.0, 6.0));
        assert_eq!(r.size, Vec2::new(28.0, 18.0));
    }

    #[test]
    fn sides_run_clockwise() {
        let s = Rect::new(Vec2::new(0.0, 0.0), Vec2::new(2.0, 1.0)).sides();
        assert_eq!(s[0], (Vec2::new(0.0, 0.0), Vec2::new(2.0, 0.0)));
        assert_eq!(s[1].1, Vec2::new(2.0, 1.0));
        assert_eq!(s[3].1, Vec2::new(0.0, 0.0));
    }

    #[test]
    fn centroid_and_bounds() {
        let a = Rect::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let b = Rect::new(Vec2::new(20.0, 0.0), Vec2::new(10.0, 10.0));
        assert_eq!(compute_centroid([&a, &b]), Some(Vec2::new(15.0, 5.0)));
        assert!(compute_centroid(std::iter::empty()).is_none());
        let bb = bounding_rect([Vec2::new(1.0, 5.0), Vec2::new(-1.0, 2.0)]).unwrap();
        assert_eq!(bb, Rect::new(Vec2::new(-1.0, 2.0), Vec2::new(2.0, 3.0)));
        assert!(a.contains(Vec2::new(10.0, 10.0)) && !a.contains(Vec2::new(10.1, 0.0)));
    }
}
