use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3};

/// An axis-aligned bounding box.
///
/// Immutable value type; `min[i] <= max[i]` holds on every axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    min: Point3,
    max: Point3,
}

impl BoundingBox {
    /// Creates a bounding box from its two corners.
    ///
    /// # Errors
    ///
    /// Returns an error if `min` exceeds `max` on any axis or a coordinate is
    /// not finite.
    pub fn new(min: Point3, max: Point3) -> Result<Self> {
        for axis in 0..3 {
            if !min[axis].is_finite() || !max[axis].is_finite() {
                return Err(GeometryError::Degenerate(
                    "bounding box corners must be finite".into(),
                )
                .into());
            }
            if min[axis] > max[axis] {
                return Err(GeometryError::ParameterOutOfRange {
                    parameter: "min_point",
                    value: min[axis],
                    min: f64::NEG_INFINITY,
                    max: max[axis],
                }
                .into());
            }
        }
        Ok(Self { min, max })
    }

    /// Wraps corners already known to be ordered, e.g. a grid's.
    pub(crate) fn from_ordered(min: Point3, max: Point3) -> Self {
        debug_assert!((0..3).all(|i| min[i] <= max[i]));
        Self { min, max }
    }

    /// Computes the tightest bounding box enclosing `points`.
    ///
    /// # Errors
    ///
    /// Returns an error if `points` is empty.
    pub fn from_points<'a, I>(points: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Point3>,
    {
        let mut iter = points.into_iter();
        let first = iter.next().ok_or(GeometryError::EmptyPointSet)?;
        let (min, max) = iter.fold((*first, *first), |(lo, hi), p| {
            (lo.inf(p), hi.sup(p))
        });
        Self::new(min, max)
    }

    /// Returns the minimum corner.
    #[must_use]
    pub fn min_point(&self) -> &Point3 {
        &self.min
    }

    /// Returns the maximum corner.
    #[must_use]
    pub fn max_point(&self) -> &Point3 {
        &self.max
    }

    /// Returns `max - min`.
    #[must_use]
    pub fn extent(&self) -> Vector3 {
        self.max - self.min
    }

    /// Returns the midpoint of the two corners.
    #[must_use]
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Returns the enclosed volume.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.extent().product()
    }

    /// Returns `true` if `point` lies inside or on the boundary.
    #[must_use]
    pub fn contains(&self, point: &Point3) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }

    /// Compares both corners component-wise within `tolerance`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        (self.min - other.min).amax() <= tolerance && (self.max - other.max).amax() <= tolerance
    }
}
