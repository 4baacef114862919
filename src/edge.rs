use std::fmt;

use glam::DVec2;

use crate::point::Point2;

/// An undirected segment between two planar points.
///
/// Equality ignores direction: `Edge::new(a, b) == Edge::new(b, a)`.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    start: Point2<f64>,
    end: Point2<f64>,
}

impl Edge {
    pub fn new(start: Point2<f64>, end: Point2<f64>) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> Point2<f64> {
        self.start
    }

    pub fn end(&self) -> Point2<f64> {
        self.end
    }

    /// The same segment with its endpoints swapped.
    pub fn reversed(&self) -> Self {
        Self::new(self.end, self.start)
    }

    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }

    pub fn midpoint(&self) -> Point2<f64> {
        Point2::new(
            (self.start.x() + self.end.x()) / 2.0,
            (self.start.y() + self.end.y()) / 2.0,
        )
    }

    /// Returns `dy / dx`, or `None` for a vertical edge.
    pub fn slope(&self) -> Option<f64> {
        let dx = self.end.x() - self.start.x();
        if dx == 0.0 {
            return None;
        }
        Some((self.end.y() - self.start.y()) / dx)
    }

    /// Returns the edge vector `end - start`.
    pub fn direction(&self) -> DVec2 {
        DVec2::from(self.end) - DVec2::from(self.start)
    }

    /// Rotate the end point about the start. Positive angles are counter-clockwise.
    pub fn rotated(&self, degrees: f64) -> Self {
        let rotation = DVec2::from_angle(degrees.to_radians());
        let end = DVec2::from(self.start) + rotation.rotate(self.direction());
        Self::new(self.start, end.into())
    }
}

/// Rotate `edge` about its start by `degrees` (positive = counter-clockwise).
pub fn rotate(edge: &Edge, degrees: f64) -> Edge {
    edge.rotated(degrees)
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        (self.start == other.start && self.end == other.end)
            || (self.start == other.end && self.end == other.start)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}]", self.start, self.end)
    }
}

// =============================================================================
