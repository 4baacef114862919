//! Delaunay triangulation of planar point sets with the Bowyer-Watson algorithm.
//!
//! The input is sorted, enclosed in a large super triangle, and inserted one
//! point at a time. Each insertion removes every triangle whose circumcircle
//! contains the new point and fans new triangles from the boundary of the
//! resulting cavity to that point. Triangles still touching a super-triangle
//! vertex are dropped at the end. When that loses part of the convex hull, the
//! run is repeated with a larger super triangle.

use std::cmp::Ordering;
use std::collections::HashSet;

use glam::DVec2;
use itertools::Itertools;
use rstar::{
    primitives::{GeomWithData, Rectangle},
    RTree,
};
use tracing::{debug, trace, warn};

use crate::accessor::{CoordinateAccessor, Indexed};
use crate::bounds::{super_triangle, BoundingBox};
use crate::error::{Degeneracy, DelaunayError};
use crate::point::Point2;
use crate::triangle::{
    compute_circumcircle, orientation, relative_area, Circumcircle, Triangle,
    DEFAULT_DEGENERACY_EPSILON,
};

/// Smallest super-triangle scale that still encloses the bounding box.
pub const MIN_SUPER_TRIANGLE_SCALE: f64 = 2.0;

/// Largest super-triangle scale tried before giving up on covering the hull.
pub const MAX_SUPER_TRIANGLE_SCALE: f64 = 1e16;

/// Factor applied to the scale between attempts.
const SCALE_GROWTH: f64 = 1e3;

/// Tuning knobs for [`Triangulator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangulatorConfig {
    /// Offset of the super-triangle vertices from the bounding-box center, in
    /// multiples of the larger bounding-box side. This is the first scale
    /// tried; it grows until the convex hull is covered.
    pub super_triangle_scale: f64,
    /// A triangle whose area is at most `degeneracy_epsilon * longest_side²`
    /// is nearly degenerate. Its area comes from the exact orientation
    /// determinant, and the engine tests it without the spatial index.
    pub degeneracy_epsilon: f64,
}

impl Default for TriangulatorConfig {
    fn default() -> Self {
        Self {
            super_triangle_scale: 20.0,
            degeneracy_epsilon: DEFAULT_DEGENERACY_EPSILON,
        }
    }
}

impl TriangulatorConfig {
    /// Values below [`MIN_SUPER_TRIANGLE_SCALE`] are raised to it.
    pub fn with_super_triangle_scale(mut self, scale: f64) -> Self {
        self.super_triangle_scale = scale.max(MIN_SUPER_TRIANGLE_SCALE);
        self
    }

    pub fn with_degeneracy_epsilon(mut self, epsilon: f64) -> Self {
        self.degeneracy_epsilon = epsilon.abs();
        self
    }
}

// =============================================================================

/// A triangle, represented as 3x indices into the point arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TriangleIndex {
    vertices: [usize; 3],
}

impl TriangleIndex {
    fn new(vertices: [usize; 3]) -> Self {
        Self { vertices }
    }

    fn edges(&self) -> [DirectedEdge; 3] {
        let [a, b, c] = self.vertices;
        [
            DirectedEdge::new(a, b),
            DirectedEdge::new(b, c),
            DirectedEdge::new(c, a),
        ]
    }
}

/// An edge between two point-arena indices, keeping the direction it had in
/// its triangle so new triangles are fanned in the same winding.
#[derive(Debug, Clone, Copy)]
struct DirectedEdge {
    start: usize,
    end: usize,
}

impl DirectedEdge {
    fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    fn key(&self) -> [usize; 2] {
        if self.start < self.end {
            [self.start, self.end]
        } else {
            [self.end, self.start]
        }
    }
}

// =============================================================================

/// Relative padding of the circumcircle boxes stored in the R-tree.
const CIRCLE_BOX_SLACK: f64 = 1e-3;

fn to_robust_coord(point: Point2<f64>) -> robust::Coord<f64> {
    robust::Coord {
        x: point.x(),
        y: point.y(),
    }
}

/// Exact test for `point` lying inside or on the circle through `triangle`.
///
/// Cocircular points always land on the same side of this test, so two
/// triangles sharing a circle are never split between inside and outside.
fn in_circumcircle(triangle: &[Point2<f64>; 3], point: Point2<f64>) -> bool {
    let [a, b, c] = triangle.map(to_robust_coord);
    let det = robust::incircle(a, b, c, to_robust_coord(point));

    // incircle is positive inside for counterclockwise input
    if robust::orient2d(a, b, c) > 0.0 {
        det >= 0.0
    } else {
        det <= 0.0
    }
}

/// Box around the circumcircle of a well-shaped triangle, padded so that it
/// holds every point the exact test accepts.
///
/// The center uses the determinant form, with the exact orientation as the
/// denominator, so its error stays small relative to the radius.
fn circle_lookup_box(triangle: &[Point2<f64>; 3]) -> BoundingBox {
    let [v0, v1, v2] = triangle.map(DVec2::from);
    let b = v1 - v0;
    let c = v2 - v0;

    let d = 2.0 * orientation(triangle);
    let (len_b, len_c) = (b.length_squared(), c.length_squared());
    let offset = DVec2::new(len_b * c.y - len_c * b.y, len_c * b.x - len_b * c.x) / d;

    let center = v0 + offset;
    let radius = [v0, v1, v2]
        .into_iter()
        .map(|v| center.distance(v))
        .fold(0.0, f64::max);

    let reach = center.abs().max_element() + radius;
    let margin = radius * CIRCLE_BOX_SLACK + reach * 4.0 * f64::EPSILON;

    BoundingBox::new(center - radius, center + radius).inflate(margin)
}

type TreePoint = [f64; 2];
type TreeRect = Rectangle<TreePoint>;
type IndexRect = GeomWithData<TreeRect, usize>;

fn tree_rect(bounds: &BoundingBox) -> TreeRect {
    TreeRect::from_corners(bounds.min.into(), bounds.max.into())
}

/// Convex hull of `points`, which must be sorted by x and then y and not all
/// collinear, as arena indices in counter-clockwise order.
///
/// Points lying on a hull edge are kept, so consecutive entries form edges
/// that every triangulation of the set contains.
fn convex_hull(points: &[Point2<f64>]) -> Vec<usize> {
    let half = |order: &mut dyn Iterator<Item = usize>| {
        let mut chain: Vec<usize> = Vec::new();
        for next in order {
            while let [.., a, b] = chain[..] {
                if orientation(&[points[a], points[b], points[next]]) >= 0.0 {
                    break;
                }
                chain.pop();
            }
            chain.push(next);
        }
        chain
    };

    let mut lower = half(&mut (0..points.len()));
    let mut upper = half(&mut (0..points.len()).rev());

    // each chain ends where the other one starts
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

#[derive(Debug)]
struct LiveTriangle {
    index: TriangleIndex,
    /// `None` for triangles touching the super triangle.
    circle: Option<Circumcircle>,
    /// `None` for triangles tested without the R-tree.
    rect: Option<IndexRect>,
}

#[derive(Debug)]
struct BowyerWatsonProcess {
    points: Vec<Point2<f64>>,
    first_super_vertex: usize,
    triangles: Vec<Option<LiveTriangle>>,
    bad_triangles: Vec<usize>,
    edges: Vec<DirectedEdge>,
    boundary: Vec<DirectedEdge>,
    lookup_accel: RTree<IndexRect>,
    /// Live triangles whose circumcircle has no trustworthy box: the ones
    /// touching the super triangle and the nearly degenerate ones.
    unbounded: Vec<usize>,
    epsilon: f64,
}

impl BowyerWatsonProcess {
    fn new(mut points: Vec<Point2<f64>>, super_vertices: [Point2<f64>; 3], epsilon: f64) -> Self {
        let first_super_vertex = points.len();
        points.extend(super_vertices);

        let mut ret = Self {
            points,
            first_super_vertex,
            triangles: Default::default(),
            bad_triangles: Default::default(),
            edges: Default::default(),
            boundary: Default::default(),
            lookup_accel: Default::default(),
            unbounded: Default::default(),
            epsilon,
        };

        ret.push_unbounded(
            TriangleIndex::new([
                first_super_vertex,
                first_super_vertex + 1,
                first_super_vertex + 2,
            ]),
            None,
        );

        ret
    }

    fn realize(&self, index: &TriangleIndex) -> [Point2<f64>; 3] {
        index.vertices.map(|v| self.points[v])
    }

    fn push_unbounded(&mut self, index: TriangleIndex, circle: Option<Circumcircle>) {
        self.unbounded.push(self.triangles.len());
        self.triangles.push(Some(LiveTriangle {
            index,
            circle,
            rect: None,
        }));
    }

    fn insert_triangle(&mut self, index: TriangleIndex) -> Result<(), DelaunayError> {
        if index.vertices.iter().any(|&v| v >= self.first_super_vertex) {
            self.push_unbounded(index, None);
            return Ok(());
        }

        let points = self.realize(&index);
        let circle = compute_circumcircle(&points, self.epsilon)?;

        if relative_area(&points) <= self.epsilon {
            self.push_unbounded(index, Some(circle));
            return Ok(());
        }

        let spot = self.triangles.len();
        let rect = IndexRect::new(tree_rect(&circle_lookup_box(&points)), spot);

        self.triangles.push(Some(LiveTriangle {
            index,
            circle: Some(circle),
            rect: Some(rect),
        }));
        self.lookup_accel.insert(rect);

        Ok(())
    }

    fn add_points<I: IntoIterator<Item = usize>>(&mut self, from: I) -> Result<(), DelaunayError> {
        for p in from {
            self.add_point(p)?;
        }
        Ok(())
    }

    fn add_point(&mut self, pid: usize) -> Result<(), DelaunayError> {
        self.bad_triangles.clear();

        let point = self.points[pid];
        let query: TreePoint = [point.x(), point.y()];

        let candidates = self
            .lookup_accel
            .locate_all_at_point(&query)
            .map(|rect| rect.data)
            .chain(self.unbounded.iter().copied());

        for spot in candidates {
            let Some(live) = &self.triangles[spot] else {
                continue;
            };
            if in_circumcircle(&self.realize(&live.index), point) {
                self.bad_triangles.push(spot);
            }
        }

        // keep the arena order so the output does not depend on the tree layout
        self.bad_triangles.sort_unstable();

        if self.bad_triangles.is_empty() {
            warn!(%point, "point lies outside every circumcircle");
            return Err(Degeneracy::UnlocatedPoint { index: pid }.into());
        }

        self.find_boundary_polygon();

        // Remove bad triangles, along with their entries in the accel tree
        for &bad in &self.bad_triangles {
            if let Some(rect) = self.triangles[bad].take().and_then(|live| live.rect) {
                self.lookup_accel.remove(&rect);
            }
        }
        let triangles = &self.triangles;
        self.unbounded.retain(|&spot| triangles[spot].is_some());

        trace!(
            %point,
            bad = self.bad_triangles.len(),
            boundary = self.boundary.len(),
            "inserting point"
        );

        self.create_new_triangles(pid)
    }

    /// Edges seen once among the bad triangles bound the cavity. Edges seen
    /// twice are shared by two bad triangles and vanish with them.
    fn find_boundary_polygon(&mut self) {
        self.edges.clear();
        self.boundary.clear();

        for &bad in &self.bad_triangles {
            if let Some(live) = &self.triangles[bad] {
                self.edges.extend(live.index.edges());
            }
        }

        let counts = self.edges.iter().map(DirectedEdge::key).counts();
        self.boundary.extend(
            self.edges
                .iter()
                .filter(|edge| counts.get(&edge.key()) == Some(&1))
                .copied(),
        );
    }

    fn create_new_triangles(&mut self, pid: usize) -> Result<(), DelaunayError> {
        let boundary = std::mem::take(&mut self.boundary);

        for edge in &boundary {
            self.insert_triangle(TriangleIndex::new([edge.start, edge.end, pid]))
                .map_err(|err| {
                    warn!(point = %self.points[pid], %err, "degenerate triangle in cavity fan");
                    err
                })?;
        }

        self.boundary = boundary;
        Ok(())
    }

    /// Drop everything touching the super triangle and hand back the rest.
    fn finish(self) -> Vec<(TriangleIndex, Circumcircle)> {
        let first_super_vertex = self.first_super_vertex;

        self.triangles
            .into_iter()
            .flatten()
            .filter(|live| live.index.vertices.iter().all(|&v| v < first_super_vertex))
            .filter_map(|live| Some((live.index, live.circle?)))
            .collect()
    }
}

/// Whether every edge of `hull` is an edge of one of `triangles`.
fn covers_hull(triangles: &[(TriangleIndex, Circumcircle)], hull: &[usize]) -> bool {
    let edges: HashSet<[usize; 2]> = triangles
        .iter()
        .flat_map(|(index, _)| index.edges())
        .map(|edge| edge.key())
        .collect();

    hull.iter()
        .circular_tuple_windows()
        .all(|(&a, &b)| edges.contains(&DirectedEdge::new(a, b).key()))
}

// =============================================================================

/// Result of one run, still in arena indices.
struct Triangulation {
    points: Vec<Point2<f64>>,
    input_index: Vec<usize>,
    triangles: Vec<(TriangleIndex, Circumcircle)>,
}

/// Computes the Delaunay triangulation of a list of points.
///
/// Coordinates are read through a [`CoordinateAccessor`], [`Indexed`] by
/// default, so any point type that can report an x and a y is accepted.
///
/// ```
/// use planar_delaunay::{Point2, Triangulator};
///
/// let points = vec![
///     Point2::new(-2.0, 2.0),
///     Point2::new(2.0, 2.0),
///     Point2::new(2.0, -2.0),
///     Point2::new(-2.0, -2.0),
/// ];
///
/// let triangles = Triangulator::new(points).triangulate().unwrap();
/// assert_eq!(triangles.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Triangulator<P, A = Indexed> {
    points: Vec<P>,
    accessor: A,
    config: TriangulatorConfig,
}

impl<P> Triangulator<P, Indexed> {
    pub fn new(points: Vec<P>) -> Self {
        Self::with_accessor(points, Indexed::default())
    }
}

impl<P, A> Triangulator<P, A> {
    pub fn with_accessor(points: Vec<P>, accessor: A) -> Self {
        Self {
            points,
            accessor,
            config: TriangulatorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TriangulatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &TriangulatorConfig {
        &self.config
    }

    pub fn points(&self) -> &[P] {
        &self.points
    }
}

impl<P, A: CoordinateAccessor<P>> Triangulator<P, A> {
    /// Triangulate the points. Fewer than three points give an empty result.
    ///
    /// The triangles cover the convex hull of the input. Fails with
    /// [`DelaunayError::DegenerateGeometry`] on duplicate points, non-finite
    /// coordinates, or an entirely collinear input.
    pub fn triangulate(&self) -> Result<Vec<Triangle>, DelaunayError> {
        let run = self.run()?;

        Ok(run
            .triangles
            .iter()
            .map(|(index, circle)| {
                Triangle::with_circumcircle(index.vertices.map(|v| run.points[v]), *circle)
            })
            .collect())
    }

    /// Like [`Triangulator::triangulate`], but each triangle is given as the
    /// positions of its vertices in the input sequence.
    pub fn triangulate_indices(&self) -> Result<Vec<[usize; 3]>, DelaunayError> {
        let run = self.run()?;

        Ok(run
            .triangles
            .iter()
            .map(|(index, _)| index.vertices.map(|v| run.input_index[v]))
            .collect())
    }

    fn run(&self) -> Result<Triangulation, DelaunayError> {
        let empty = Triangulation {
            points: Vec::new(),
            input_index: Vec::new(),
            triangles: Vec::new(),
        };

        if self.points.len() < 3 {
            debug!(points = self.points.len(), "too few points to triangulate");
            return Ok(empty);
        }

        let mut sorted = Vec::with_capacity(self.points.len());
        for (index, p) in self.points.iter().enumerate() {
            let xy = self.accessor.xy(p);
            if !xy.is_finite() {
                return Err(Degeneracy::NonFiniteCoordinate { index }.into());
            }
            sorted.push((index, Point2::from(xy)));
        }

        // sort by x and then y
        sorted.sort_by(|(_, l), (_, r)| l.partial_cmp(r).unwrap_or(Ordering::Equal));

        if let Some((_, (index, _))) = sorted.iter().tuple_windows().find(|(a, b)| a.1 == b.1) {
            return Err(Degeneracy::DuplicatePoint { index: *index }.into());
        }

        let (input_index, points): (Vec<usize>, Vec<Point2<f64>>) = sorted.into_iter().unzip();

        // distinct points, so the first two span a line
        if (2..points.len()).all(|i| orientation(&[points[0], points[1], points[i]]) == 0.0) {
            warn!(points = points.len(), "input is collinear");
            return Err(Degeneracy::CollinearInput.into());
        }

        let Some(bounds) = BoundingBox::from_points(points.iter().map(|&p| DVec2::from(p))) else {
            return Ok(empty);
        };
        let hull = convex_hull(&points);

        let mut scale = self.config.super_triangle_scale;
        let triangles = loop {
            debug!(
                points = points.len(),
                scale,
                min = %bounds.min,
                max = %bounds.max,
                "starting triangulation"
            );

            let mut process = BowyerWatsonProcess::new(
                points.clone(),
                super_triangle(&bounds, scale),
                self.config.degeneracy_epsilon,
            );
            process
                .add_points(0..process.first_super_vertex)
                .map_err(|err| to_input_error(err, &input_index))?;

            let triangles = process.finish();
            if covers_hull(&triangles, &hull) {
                break triangles;
            }

            if scale >= MAX_SUPER_TRIANGLE_SCALE {
                warn!(scale, "convex hull still not covered");
                return Err(Degeneracy::HullNotCovered.into());
            }
            scale = (scale * SCALE_GROWTH).min(MAX_SUPER_TRIANGLE_SCALE);
            debug!(scale, "convex hull not covered, growing the super triangle");
        };

        debug!(triangles = triangles.len(), "triangulation finished");

        Ok(Triangulation {
            points,
            input_index,
            triangles,
        })
    }
}

/// Rewrite arena indices in `err` as positions in the input sequence.
fn to_input_error(err: DelaunayError, input_index: &[usize]) -> DelaunayError {
    match err {
        DelaunayError::DegenerateGeometry(Degeneracy::UnlocatedPoint { index }) => {
            Degeneracy::UnlocatedPoint {
                index: input_index.get(index).copied().unwrap_or(index),
            }
            .into()
        }
        other => other,
    }
}

// =============================================================================
