//! Coordinate access for caller-supplied point types.
//!
//! The triangulator never inspects a point directly. It asks a
//! [`CoordinateAccessor`] for the x and y values, so any point type works as
//! long as one of the accessors can read it.

use std::ops::Index;

use glam::DVec2;
use num_traits::ToPrimitive;

use crate::point::{Point, Scalar};

/// Reads the planar coordinates of a `P`.
///
/// Values that cannot be represented as `f64` come back as `NaN`, which the
/// triangulator rejects as a non-finite coordinate.
pub trait CoordinateAccessor<P> {
    fn x(&self, point: &P) -> f64;
    fn y(&self, point: &P) -> f64;

    fn xy(&self, point: &P) -> DVec2 {
        DVec2::new(self.x(point), self.y(point))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

/// Positional lookup through `Index<usize>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indexed {
    pub x_index: usize,
    pub y_index: usize,
}

impl Indexed {
    pub fn new(x_index: usize, y_index: usize) -> Self {
        Self { x_index, y_index }
    }
}

impl Default for Indexed {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

impl<P> CoordinateAccessor<P> for Indexed
where
    P: Index<usize>,
    P::Output: Scalar,
{
    fn x(&self, point: &P) -> f64 {
        point[self.x_index].to_f64().unwrap_or(f64::NAN)
    }

    fn y(&self, point: &P) -> f64 {
        point[self.y_index].to_f64().unwrap_or(f64::NAN)
    }
}

// =============================================================================

/// A point type that can report its coordinate along a named [`Axis`].
pub trait AxisLookup {
    fn axis(&self, axis: Axis) -> f64;
}

/// Explicit axis lookup through [`AxisLookup`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByAxis;

impl<P: AxisLookup> CoordinateAccessor<P> for ByAxis {
    fn x(&self, point: &P) -> f64 {
        point.axis(Axis::X)
    }

    fn y(&self, point: &P) -> f64 {
        point.axis(Axis::Y)
    }
}

impl<T: Scalar, const N: usize> AxisLookup for Point<T, N> {
    fn axis(&self, axis: Axis) -> f64 {
        let value = match axis {
            Axis::X => self.x(),
            Axis::Y => self.y(),
        };
        value.to_f64().unwrap_or(f64::NAN)
    }
}

impl AxisLookup for DVec2 {
    fn axis(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }
}

impl<T: Scalar> AxisLookup for (T, T) {
    fn axis(&self, axis: Axis) -> f64 {
        let value = match axis {
            Axis::X => self.0,
            Axis::Y => self.1,
        };
        value.to_f64().unwrap_or(f64::NAN)
    }
}

// =============================================================================
