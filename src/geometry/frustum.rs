use std::f64::consts::PI;

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

/// A truncated right circular cone along one skeleton segment.
///
/// The frustum joins a disc of radius `r_min` centred at `p_min` to a disc of
/// radius `r_max` centred at `p_max`, with `r_min <= r_max` so the surface
/// widens from `p_min` to `p_max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    p_min: Point3,
    p_max: Point3,
    r_min: f64,
    r_max: f64,
}

impl Frustum {
    /// Creates a new frustum.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment has zero length, a radius is negative
    /// or not finite, both radii are zero, or `r_min > r_max`.
    pub fn new(p_min: Point3, p_max: Point3, r_min: f64, r_max: f64) -> Result<Self> {
        for (name, r) in [("r_min", r_min), ("r_max", r_max)] {
            if !(r.is_finite() && r >= 0.0) {
                return Err(GeometryError::ParameterOutOfRange {
                    parameter: name,
                    value: r,
                    min: 0.0,
                    max: f64::INFINITY,
                }
                .into());
            }
        }
        if r_max < TOLERANCE {
            return Err(GeometryError::Degenerate("frustum radii are both zero".into()).into());
        }
        if r_min > r_max {
            return Err(GeometryError::Degenerate(
                "frustum must widen from p_min to p_max (r_min > r_max)".into(),
            )
            .into());
        }
        let length = (p_max - p_min).norm();
        if !length.is_finite() {
            return Err(GeometryError::Degenerate("frustum end points must be finite".into()).into());
        }
        if length < TOLERANCE {
            return Err(GeometryError::Degenerate("frustum has zero length".into()).into());
        }
        Ok(Self {
            p_min,
            p_max,
            r_min,
            r_max,
        })
    }

    /// Creates a frustum from two end spheres in any order, swapping them so
    /// that the surface widens towards the second end.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Frustum::new`], apart from the radius ordering.
    pub fn ordered(p1: Point3, p2: Point3, r1: f64, r2: f64) -> Result<Self> {
        if r1 > r2 {
            Self::new(p2, p1, r2, r1)
        } else {
            Self::new(p1, p2, r1, r2)
        }
    }

    #[must_use]
    pub fn p_min(&self) -> &Point3 {
        &self.p_min
    }

    #[must_use]
    pub fn p_max(&self) -> &Point3 {
        &self.p_max
    }

    #[must_use]
    pub fn r_min(&self) -> f64 {
        self.r_min
    }

    #[must_use]
    pub fn r_max(&self) -> f64 {
        self.r_max
    }

    /// Distance between the two disc centres.
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.p_max - self.p_min).norm()
    }

    /// Unit vector from `p_min` to `p_max`.
    #[must_use]
    pub fn axis(&self) -> Vector3 {
        (self.p_max - self.p_min) / self.length()
    }

    /// Returns `true` if both radii agree within tolerance.
    #[must_use]
    pub fn is_cylinder(&self) -> bool {
        self.r_max - self.r_min < TOLERANCE
    }

    /// Heights of the two discs measured from the virtual apex, `(h_min, h_max)`.
    ///
    /// `None` for a cylinder, whose apex lies at infinity.
    #[must_use]
    pub fn apex_heights(&self) -> Option<(f64, f64)> {
        if self.is_cylinder() {
            return None;
        }
        let length = self.length();
        let h_min = self.r_min * length / (self.r_max - self.r_min);
        Some((h_min, h_min + length))
    }

    /// Area of the lateral surface, excluding the two caps.
    #[must_use]
    pub fn lateral_area(&self) -> f64 {
        let length = self.length();
        let dr = self.r_max - self.r_min;
        PI * (self.r_min + self.r_max) * (length * length + dr * dr).sqrt()
    }
}
