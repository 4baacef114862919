//! Planar Delaunay triangulation.
//!
//! Geometric primitives ([`Point`], [`Edge`], [`Triangle`]) and an incremental
//! Bowyer-Watson [`Triangulator`] that turns an unordered point set into
//! triangles whose circumcircles contain no other input point.

pub mod accessor;
pub mod bounds;
pub mod edge;
pub mod error;
pub mod point;
pub mod triangle;
pub mod triangulator;

pub use accessor::{Axis, AxisLookup, ByAxis, CoordinateAccessor, Indexed};
pub use bounds::{super_triangle, BoundingBox};
pub use edge::{rotate, Edge};
pub use error::{Degeneracy, DelaunayError};
pub use point::{centroid, distance, Point, Point2, Point3, Scalar};
pub use triangle::{compute_circumcircle, Circumcircle, Triangle};
pub use triangulator::{Triangulator, TriangulatorConfig};
