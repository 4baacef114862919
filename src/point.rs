use std::fmt;
use std::ops::{Add, Index, IndexMut, Sub};

use glam::DVec2;
use num_traits::{Float, Num, NumCast, ToPrimitive};

use crate::error::DelaunayError;

/// A numeric coordinate type usable inside a [`Point`].
///
/// Usually one of the primitive integer or float types.
pub trait Scalar: Num + NumCast + Copy + PartialOrd + fmt::Debug {}

impl<T> Scalar for T where T: Num + NumCast + Copy + PartialOrd + fmt::Debug {}

// Evaluated when a method using it is monomorphized, so `Point<f64, 2>::z()`
// fails to compile instead of failing at runtime.
struct MinDimension<const N: usize, const MIN: usize>;

impl<const N: usize, const MIN: usize> MinDimension<N, MIN> {
    const OK: () = assert!(N >= MIN, "point has too few dimensions");
}

// =============================================================================

/// A point with `N` coordinates of type `T`.
///
/// Ordering is lexicographic over the coordinates, equality is componentwise.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Hash)]
pub struct Point<T, const N: usize> {
    coords: [T; N],
}

pub type Point2<T> = Point<T, 2>;
pub type Point3<T> = Point<T, 3>;

impl<T> Point<T, 2> {
    pub const fn new(x: T, y: T) -> Self {
        Self { coords: [x, y] }
    }
}

impl<T> Point<T, 3> {
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self { coords: [x, y, z] }
    }
}

impl<T: Scalar, const N: usize> Point<T, N> {
    pub fn from_array(coords: [T; N]) -> Self {
        let () = MinDimension::<N, 1>::OK;
        Self { coords }
    }

    /// Build a point from a coordinate list that must hold exactly `N` values.
    pub fn from_slice(coords: &[T]) -> Result<Self, DelaunayError> {
        let coords: [T; N] =
            coords
                .try_into()
                .map_err(|_| DelaunayError::MalformedInitializer {
                    expected: N,
                    actual: coords.len(),
                })?;
        Ok(Self::from_array(coords))
    }

    pub fn origin() -> Self {
        Self::from_array([T::zero(); N])
    }

    pub const fn dimension() -> usize {
        N
    }

    pub fn coords(&self) -> &[T; N] {
        &self.coords
    }

    pub fn get(&self, index: usize) -> Result<T, DelaunayError> {
        self.coords
            .get(index)
            .copied()
            .ok_or(DelaunayError::IndexOutOfRange { index, len: N })
    }

    pub fn set(&mut self, index: usize, value: T) -> Result<(), DelaunayError> {
        let slot = self
            .coords
            .get_mut(index)
            .ok_or(DelaunayError::IndexOutOfRange { index, len: N })?;
        *slot = value;
        Ok(())
    }

    pub fn x(&self) -> T {
        let () = MinDimension::<N, 1>::OK;
        self.coords[0]
    }

    pub fn y(&self) -> T {
        let () = MinDimension::<N, 2>::OK;
        self.coords[1]
    }

    pub fn z(&self) -> T {
        let () = MinDimension::<N, 3>::OK;
        self.coords[2]
    }

    /// Convert every coordinate to `U`. Returns `None` if one of them does not fit.
    pub fn cast<U: Scalar>(&self) -> Option<Point<U, N>> {
        let mut coords = [U::zero(); N];
        for (dst, &src) in coords.iter_mut().zip(&self.coords) {
            *dst = <U as NumCast>::from(src)?;
        }
        Some(Point { coords })
    }

    fn to_f64(self) -> Option<Point<f64, N>> {
        self.cast()
    }
}

impl<T: Scalar + Float, const N: usize> Point<T, N> {
    /// Euclidean distance between `self` and `other`.
    pub fn distance(&self, other: &Self) -> T {
        self.coords
            .iter()
            .zip(&other.coords)
            .fold(T::zero(), |acc, (&a, &b)| {
                let d = b - a;
                acc + d * d
            })
            .sqrt()
    }

    /// Round each coordinate to the nearest integer value, then cast it to `U`.
    pub fn round_to<U: Scalar>(&self) -> Option<Point<U, N>> {
        let mut coords = [U::zero(); N];
        for (dst, &src) in coords.iter_mut().zip(&self.coords) {
            *dst = <U as NumCast>::from(src.round())?;
        }
        Some(Point { coords })
    }
}

/// Euclidean distance between two floating-point points.
pub fn distance<T: Scalar + Float, const N: usize>(first: &Point<T, N>, second: &Point<T, N>) -> T {
    first.distance(second)
}

/// Per-dimension arithmetic mean of `points`, or `None` for an empty input.
pub fn centroid<'a, T, const N: usize, I>(points: I) -> Option<Point<f64, N>>
where
    T: Scalar + 'a,
    I: IntoIterator<Item = &'a Point<T, N>>,
{
    let mut sums = [0.0f64; N];
    let mut count = 0usize;

    for point in points {
        let point = point.to_f64()?;
        for (sum, value) in sums.iter_mut().zip(point.coords) {
            *sum += value;
        }
        count += 1;
    }

    if count == 0 {
        return None;
    }

    let count = count.to_f64()?;
    Some(Point::from_array(sums.map(|sum| sum / count)))
}

// =============================================================================

impl<T: Scalar, const N: usize> Default for Point<T, N> {
    fn default() -> Self {
        Self::origin()
    }
}

impl<T: Scalar, const N: usize> From<[T; N]> for Point<T, N> {
    fn from(coords: [T; N]) -> Self {
        Self::from_array(coords)
    }
}

impl<T: Scalar, const N: usize> TryFrom<&[T]> for Point<T, N> {
    type Error = DelaunayError;

    fn try_from(coords: &[T]) -> Result<Self, Self::Error> {
        Self::from_slice(coords)
    }
}

impl From<Point<f64, 2>> for DVec2 {
    fn from(point: Point<f64, 2>) -> Self {
        DVec2::new(point.coords[0], point.coords[1])
    }
}

impl From<DVec2> for Point<f64, 2> {
    fn from(v: DVec2) -> Self {
        Point::<f64, 2>::new(v.x, v.y)
    }
}

impl<T, const N: usize> Index<usize> for Point<T, N> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.coords[index]
    }
}

impl<T, const N: usize> IndexMut<usize> for Point<T, N> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.coords[index]
    }
}

impl<T: Scalar, const N: usize> Add for Point<T, N> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            coords: std::array::from_fn(|i| self.coords[i] + rhs.coords[i]),
        }
    }
}

impl<T: Scalar, const N: usize> Sub for Point<T, N> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            coords: std::array::from_fn(|i| self.coords[i] - rhs.coords[i]),
        }
    }
}

impl<T: fmt::Display, const N: usize> fmt::Display for Point<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, ")")
    }
}

// =============================================================================
