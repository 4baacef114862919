use std::cell::OnceCell;

use glam::DVec2;

use crate::bounds::BoundingBox;
use crate::edge::{rotate, Edge};
use crate::error::{Degeneracy, DelaunayError};
use crate::point::Point2;

/// Relative area below which a triangle counts as nearly degenerate.
///
/// Heron's formula loses most of its precision on such triangles, so their
/// area is taken from the exact orientation determinant instead.
pub const DEFAULT_DEGENERACY_EPSILON: f64 = 1e-10;

/// The circle through the three vertices of a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circumcircle {
    pub center: Point2<f64>,
    pub radius: f64,
}

impl Circumcircle {
    /// Points on the circle count as contained.
    pub fn contains(&self, point: &Point2<f64>) -> bool {
        self.center.distance(point) <= self.radius
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let center = DVec2::from(self.center);
        BoundingBox::new(center - self.radius, center + self.radius)
    }
}

/// Compute the circumcircle of `points`.
///
/// Fails with [`Degeneracy::CollinearVertices`] when the vertices are exactly
/// collinear (repeated vertices included). The radius comes from the side
/// lengths and Heron's area, unless that area is at most
/// `epsilon * longest_side²`, in which case the exact orientation determinant
/// supplies it. The center lies on the perpendicular bisector of the first
/// edge, on the third vertex's side exactly when the angle there is acute.
pub fn compute_circumcircle(
    points: &[Point2<f64>; 3],
    epsilon: f64,
) -> Result<Circumcircle, DelaunayError> {
    let det = orientation(points);
    if det == 0.0 {
        return Err(Degeneracy::CollinearVertices.into());
    }

    let [p1, p2, p3] = *points;
    let e1 = Edge::new(p1, p2);
    let e2 = Edge::new(p2, p3);
    let e3 = Edge::new(p3, p1);

    let midpoint_ab = e1.midpoint();
    let (a, b, c) = (e1.length(), e2.length(), e3.length());
    let longest = a.max(b).max(c);

    let mut area = heron_area(a, b, c);
    if !area.is_finite() || area <= epsilon * longest * longest {
        area = det.abs() / 2.0;
    }

    let radius = (a * b * c) / (4.0 * area);

    // distance from the circumcenter to the midpoint of the first edge
    let half = p1.distance(&midpoint_ab);
    let offset = (half * half - radius * radius).abs().sqrt();

    // rotate clockwise, note the negative angle
    let normal = rotate(&e1, -90.0).direction();
    let mo = normal * (offset / normal.length());

    // the normal points right of p1 -> p2, so away from p3 when the winding
    // is counter-clockwise
    let toward_p3 = if det > 0.0 { -mo } else { mo };

    // the center sits on p3's side of the first edge iff the angle at p3 is acute
    let [v1, v2, v3] = points.map(DVec2::from);
    let acute = (v1 - v3).dot(v2 - v3) > 0.0;

    let mid = DVec2::from(midpoint_ab);
    let center = if acute { mid + toward_p3 } else { mid - toward_p3 };

    Ok(Circumcircle {
        center: center.into(),
        radius,
    })
}

/// Heron's formula with the sides sorted so the product loses as little
/// precision as possible on needle-shaped triangles.
fn heron_area(a: f64, b: f64, c: f64) -> f64 {
    let mut sides = [a, b, c];
    sides.sort_by(|l, r| r.total_cmp(l));
    let [a, b, c] = sides;

    0.25 * ((a + (b + c)) * (c - (a - b)) * (c + (a - b)) * (a + (b - c))).sqrt()
}

/// Twice the signed area of `points`, positive for counter-clockwise order.
/// The sign is exact.
pub(crate) fn orientation(points: &[Point2<f64>; 3]) -> f64 {
    let [a, b, c] = points.map(|p| robust::Coord { x: p.x(), y: p.y() });
    robust::orient2d(a, b, c)
}

/// Area of `points` relative to the square of their longest side.
pub(crate) fn relative_area(points: &[Point2<f64>; 3]) -> f64 {
    let [p1, p2, p3] = *points;
    let longest = p1
        .distance(&p2)
        .max(p2.distance(&p3))
        .max(p3.distance(&p1));
    orientation(points).abs() / (2.0 * longest * longest)
}

// =============================================================================

/// A triangle with its edges and a lazily computed circumcircle.
///
/// Edges run `p1 -> p2`, `p2 -> p3`, `p3 -> p1`. Two triangles are equal when
/// they have the same vertex set, regardless of order.
#[derive(Debug, Clone)]
pub struct Triangle {
    points: [Point2<f64>; 3],
    edges: [Edge; 3],
    circumcircle: OnceCell<Circumcircle>,
}

impl Triangle {
    pub fn new(p1: Point2<f64>, p2: Point2<f64>, p3: Point2<f64>) -> Self {
        Self {
            points: [p1, p2, p3],
            edges: [Edge::new(p1, p2), Edge::new(p2, p3), Edge::new(p3, p1)],
            circumcircle: OnceCell::new(),
        }
    }

    pub(crate) fn with_circumcircle(points: [Point2<f64>; 3], circle: Circumcircle) -> Self {
        let [p1, p2, p3] = points;
        let triangle = Self::new(p1, p2, p3);
        let _ = triangle.circumcircle.set(circle);
        triangle
    }

    pub fn points(&self) -> &[Point2<f64>; 3] {
        &self.points
    }

    pub fn edges(&self) -> &[Edge; 3] {
        &self.edges
    }

    pub fn point(&self, index: usize) -> Result<Point2<f64>, DelaunayError> {
        self.points
            .get(index)
            .copied()
            .ok_or(DelaunayError::IndexOutOfRange { index, len: 3 })
    }

    pub fn edge(&self, index: usize) -> Result<Edge, DelaunayError> {
        self.edges
            .get(index)
            .copied()
            .ok_or(DelaunayError::IndexOutOfRange { index, len: 3 })
    }

    pub fn contains_vertex(&self, point: &Point2<f64>) -> bool {
        self.points.contains(point)
    }

    /// Returns the circumcircle, computing it on first use.
    pub fn circumcircle(&self) -> Result<Circumcircle, DelaunayError> {
        if let Some(circle) = self.circumcircle.get() {
            return Ok(*circle);
        }

        let circle = compute_circumcircle(&self.points, DEFAULT_DEGENERACY_EPSILON)?;
        Ok(*self.circumcircle.get_or_init(|| circle))
    }

    /// Check if a point is inside (or on) the circumcircle of this [`Triangle`].
    pub fn circumcircle_contains(&self, point: &Point2<f64>) -> Result<bool, DelaunayError> {
        Ok(self.circumcircle()?.contains(point))
    }
}

impl PartialEq for Triangle {
    fn eq(&self, other: &Self) -> bool {
        self.points.iter().all(|p| other.contains_vertex(p))
    }
}

// =============================================================================

#[cfg(test)]
mod test {
    use rand::Rng;

    use super::*;

    trait AlmostEqual {
        fn almost_equal(&self, other: Self, epsilon: f64) -> bool;
    }

    impl AlmostEqual for f64 {
        fn almost_equal(&self, other: Self, epsilon: f64) -> bool {
            (self - other).abs() < epsilon
        }
    }

    impl AlmostEqual for Point2<f64> {
        fn almost_equal(&self, other: Self, epsilon: f64) -> bool {
            self.distance(&other) < epsilon
        }
    }

    fn random_circle_triangle() -> (Triangle, Point2<f64>, f64) {
        let mut rng = rand::thread_rng();
        let center = Point2::new(rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0));
        let radius = rng.gen_range(1.0..100.0);

        // three angles spread far enough apart to keep the triangle fat
        let base: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
        let [a, b, c] = [0.0, 2.0, 4.0].map(|offset: f64| {
            let angle = base + offset + rng.gen_range(-0.5..0.5);
            center + Point2::new(radius * angle.cos(), radius * angle.sin())
        });

        (Triangle::new(a, b, c), center, radius)
    }

    #[test]
    fn test_circum_isoceles() {
        let t = Triangle::new(
            Point2::new(0.0, 2.0),
            Point2::new(2.0, -2.0),
            Point2::new(-2.0, -2.0),
        );
        let circle = t.circumcircle().unwrap();

        assert!(circle.center.almost_equal(Point2::new(0.0, -0.5), 1e-6));
        assert!(circle.radius.almost_equal(2.5, 1e-6));
        assert!(!t.circumcircle_contains(&Point2::new(-3.0, 3.0)).unwrap());
        assert!(t.circumcircle_contains(&Point2::new(0.0, 0.0)).unwrap());
    }

    #[test]
    fn test_circum_obtuse() {
        let t = Triangle::new(
            Point2::new(1.0, 3.0),
            Point2::new(5.0, 4.0),
            Point2::new(-1.0, 1.0),
        );
        let circle = t.circumcircle().unwrap();

        assert!(circle.center.almost_equal(Point2::new(4.5, -2.5), 1e-6));
        assert!(circle.radius.almost_equal(42.5f64.sqrt(), 1e-6));
    }

    #[test]
    fn test_circum_random() {
        for _ in 0..50 {
            let (t, true_center, true_radius) = random_circle_triangle();
            let circle = t.circumcircle().unwrap();

            let delta = circle.center.distance(&true_center);
            if delta > 1e-6 * true_radius {
                panic!(
                    "Center err: {} vs {} = {}",
                    circle.center, true_center, delta
                )
            }

            if !circle.radius.almost_equal(true_radius, 1e-6 * true_radius) {
                panic!(
                    "Radius err: {} vs {} = {}",
                    circle.radius,
                    true_radius,
                    (circle.radius - true_radius).abs()
                )
            }
        }
    }

    #[test]
    fn test_circum_idempotent() {
        let t = Triangle::new(
            Point2::new(0.3, 0.1),
            Point2::new(7.0, 1.5),
            Point2::new(2.0, 9.0),
        );
        let first = t.circumcircle().unwrap();
        let second = t.circumcircle().unwrap();
        assert_eq!(first, second);

        let copy = t.clone();
        assert_eq!(copy.circumcircle().unwrap(), first);
    }

    #[test]
    fn test_collinear_is_degenerate() {
        let t = Triangle::new(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(3.0, 3.0),
        );
        assert_eq!(
            t.circumcircle(),
            Err(DelaunayError::DegenerateGeometry(
                Degeneracy::CollinearVertices
            ))
        );
        assert!(t.circumcircle_contains(&Point2::new(0.0, 0.0)).is_err());

        let repeated = Triangle::new(
            Point2::new(2.0, 1.0),
            Point2::new(2.0, 1.0),
            Point2::new(5.0, 0.0),
        );
        assert!(repeated.circumcircle().is_err());

        // exactly collinear, but the rounded side lengths disagree
        let t = Triangle::new(
            Point2::new(0.1, 0.2),
            Point2::new(0.3, 0.6),
            Point2::new(0.7, 1.4),
        );
        let exactly_collinear = orientation(t.points()) == 0.0;
        assert_eq!(t.circumcircle().is_err(), exactly_collinear);
    }

    #[test]
    fn test_thin_triangle_has_circle() {
        // far from collinear in exact arithmetic, but Heron's area is useless
        let points = [
            Point2::new(-1e7, 0.0),
            Point2::new(1e7, 0.0),
            Point2::new(0.0, 1e-3),
        ];
        assert!(relative_area(&points) < DEFAULT_DEGENERACY_EPSILON);

        let t = Triangle::new(points[0], points[1], points[2]);
        let circle = t.circumcircle().unwrap();

        // R = (half² + h²) / 2h
        let expected = (1e14 + 1e-6) / 2e-3;
        assert!(circle.radius.almost_equal(expected, 1e-6 * expected));
        assert!(circle.center.x().abs() < 1e-6 * expected);
        assert!(circle.center.y() < 0.0);
    }

    #[test]
    fn test_orientation_sign() {
        let ccw = [
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(0.0, 3.0),
        ];
        assert_eq!(orientation(&ccw), 12.0);
        assert_eq!(orientation(&[ccw[0], ccw[2], ccw[1]]), -12.0);
        assert!(relative_area(&ccw).almost_equal(6.0 / 25.0, 1e-12));
    }

    #[test]
    fn test_edges_and_points() {
        let (p1, p2, p3) = (
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(0.0, 3.0),
        );
        let t = Triangle::new(p1, p2, p3);

        assert_eq!(t.edge(0).unwrap(), Edge::new(p1, p2));
        assert_eq!(t.edge(1).unwrap(), Edge::new(p2, p3));
        assert_eq!(t.edge(2).unwrap(), Edge::new(p3, p1));
        assert_eq!(
            t.edge(3),
            Err(DelaunayError::IndexOutOfRange { index: 3, len: 3 })
        );

        assert_eq!(t.point(2).unwrap(), p3);
        assert!(t.point(7).is_err());
        assert!(t.contains_vertex(&p2));
        assert!(!t.contains_vertex(&Point2::new(1.0, 1.0)));
    }

    #[test]
    fn test_permutation_equality() {
        let (a, b, c) = (
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(0.0, 3.0),
        );
        let t = Triangle::new(a, b, c);

        for other in [
            Triangle::new(a, c, b),
            Triangle::new(b, a, c),
            Triangle::new(b, c, a),
            Triangle::new(c, a, b),
            Triangle::new(c, b, a),
        ] {
            assert_eq!(t, other);
        }

        assert_ne!(t, Triangle::new(a, b, Point2::new(1.0, 3.0)));
    }

    #[test]
    fn test_bounding_box() {
        let circle = Circumcircle {
            center: Point2::new(1.0, -1.0),
            radius: 2.0,
        };
        let bb = circle.bounding_box();
        assert_eq!(bb.min, DVec2::new(-1.0, -3.0));
        assert_eq!(bb.max, DVec2::new(3.0, 1.0));
    }
}
