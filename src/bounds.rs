use glam::DVec2;

use crate::point::Point2;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: DVec2,
    pub max: DVec2,
}

impl BoundingBox {
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    /// The smallest box holding every point, or `None` for an empty input.
    pub fn from_points<I: IntoIterator<Item = DVec2>>(points: I) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self::new(min, max))
    }

    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) / 2.0
    }

    pub fn inflate(&self, margin: f64) -> Self {
        Self::new(self.min - margin, self.max + margin)
    }

    pub fn contains(&self, point: DVec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// Vertices of a triangle enclosing `bounds`, offset from its center by
/// `scale` times the larger side.
pub fn super_triangle(bounds: &BoundingBox, scale: f64) -> [Point2<f64>; 3] {
    let dmax = bounds.size().max_element();
    let mid = bounds.center();

    [
        Point2::new(mid.x - scale * dmax, mid.y - dmax),
        Point2::new(mid.x, mid.y + scale * dmax),
        Point2::new(mid.x + scale * dmax, mid.y - dmax),
    ]
}
