use thiserror::Error;

/// Errors produced by the geometric primitives and the triangulator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DelaunayError {
    /// An indexed accessor was given an index outside `0..len`.
    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// The input has no well-defined triangulation, see [`Degeneracy`].
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(#[from] Degeneracy),

    /// A point was built from a coordinate list of the wrong length.
    #[error("point initializer has {actual} coordinates, expected {expected}")]
    MalformedInitializer { expected: usize, actual: usize },
}

/// The specific shape of a [`DelaunayError::DegenerateGeometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Degeneracy {
    #[error("triangle vertices are collinear")]
    CollinearVertices,

    /// `index` refers to the caller's input sequence.
    #[error("input point {index} duplicates another point")]
    DuplicatePoint { index: usize },

    #[error("input point {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },

    #[error("all input points are collinear")]
    CollinearInput,

    /// No super triangle up to the largest scale tried let the triangulation
    /// reach every convex hull edge.
    #[error("input is too close to collinear to cover its convex hull")]
    HullNotCovered,

    /// Insertion found no triangle whose circumcircle holds the point.
    #[error("input point {index} lies outside every circumcircle")]
    UnlocatedPoint { index: usize },
}
