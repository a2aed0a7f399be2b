use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3};

use super::BoundingBox;

/// Voxel-aligned region of interest.
///
/// All generated datasets live inside the grid's bounding box. The grid has
/// `shape[i]` cubic voxels of side `voxel_side` along each axis, starting at
/// `offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    shape: [u32; 3],
    offset: Point3,
    voxel_side: f64,
}

impl Grid {
    /// Creates a grid from an explicit shape, offset and voxel side.
    ///
    /// # Errors
    ///
    /// Returns an error if any shape component is zero or the voxel side is
    /// not a positive finite number.
    pub fn new(shape: [u32; 3], offset: Point3, voxel_side: f64) -> Result<Self> {
        if !(voxel_side.is_finite() && voxel_side > 0.0) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "voxel_side",
                value: voxel_side,
                min: 0.0,
                max: f64::INFINITY,
            }
            .into());
        }
        if let Some(&n) = shape.iter().find(|&&n| n == 0) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "shape",
                value: f64::from(n),
                min: 1.0,
                max: f64::from(u32::MAX),
            }
            .into());
        }
        if !offset.iter().all(|c| c.is_finite()) {
            return Err(GeometryError::Degenerate("grid offset must be finite".into()).into());
        }
        Ok(Self {
            shape,
            offset,
            voxel_side,
        })
    }

    /// Fits a cube of side `bbox_side` to the nearest whole number of voxels.
    ///
    /// # Errors
    ///
    /// Returns an error if the cube rounds to zero voxels or the sides are
    /// not positive.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_cubic_bbox(bbox_side: f64, voxel_side: f64, offset: Point3) -> Result<Self> {
        if !(bbox_side.is_finite() && bbox_side > 0.0) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "bbox_side",
                value: bbox_side,
                min: 0.0,
                max: f64::INFINITY,
            }
            .into());
        }
        if !(voxel_side.is_finite() && voxel_side > 0.0) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "voxel_side",
                value: voxel_side,
                min: 0.0,
                max: f64::INFINITY,
            }
            .into());
        }
        let n = (bbox_side / voxel_side).round_ties_even();
        if n > f64::from(u32::MAX) {
            return Err(GeometryError::Degenerate("grid has too many voxels".into()).into());
        }
        let n = n as u32;
        Self::new([n, n, n], offset, voxel_side)
    }

    /// Returns the number of voxels per axis.
    #[must_use]
    pub fn shape(&self) -> [u32; 3] {
        self.shape
    }

    /// Returns the minimum corner of the grid.
    #[must_use]
    pub fn offset(&self) -> &Point3 {
        &self.offset
    }

    /// Returns the voxel edge length.
    #[must_use]
    pub fn voxel_side(&self) -> f64 {
        self.voxel_side
    }

    #[must_use]
    pub fn voxel_dimensions(&self) -> Vector3 {
        Vector3::repeat(self.voxel_side)
    }

    #[must_use]
    pub fn voxel_volume(&self) -> f64 {
        self.voxel_side.powi(3)
    }

    /// Returns `shape * voxel_dimensions`.
    #[must_use]
    pub fn extents(&self) -> Vector3 {
        Vector3::new(
            f64::from(self.shape[0]),
            f64::from(self.shape[1]),
            f64::from(self.shape[2]),
        )
        .component_mul(&self.voxel_dimensions())
    }

    /// Returns the area of the xz face.
    #[must_use]
    pub fn lateral_area(&self) -> f64 {
        let e = self.extents();
        e.x * e.z
    }

    #[must_use]
    pub fn volume(&self) -> f64 {
        self.extents().product()
    }

    #[must_use]
    pub fn min_point(&self) -> Point3 {
        self.offset
    }

    #[must_use]
    pub fn max_point(&self) -> Point3 {
        self.offset + self.extents()
    }

    #[must_use]
    pub fn centroid(&self) -> Point3 {
        nalgebra::center(&self.min_point(), &self.max_point())
    }

    #[must_use]
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::from_ordered(self.min_point(), self.max_point())
    }

    /// Number of voxels along `axis`.
    ///
    /// # Panics
    ///
    /// Panics if `axis > 2`.
    #[must_use]
    pub fn n_bins(&self, axis: usize) -> usize {
        self.shape[axis] as usize
    }

    /// Number of voxel boundaries along `axis`.
    ///
    /// # Panics
    ///
    /// Panics if `axis > 2`.
    #[must_use]
    pub fn n_bin_edges(&self, axis: usize) -> usize {
        self.n_bins(axis) + 1
    }

    /// Coordinates of the voxel boundaries along `axis`.
    ///
    /// # Panics
    ///
    /// Panics if `axis > 2`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bins(&self, axis: usize) -> Vec<f64> {
        let origin = self.offset[axis];
        (0..self.n_bin_edges(axis))
            .map(|i| origin + i as f64 * self.voxel_side)
            .collect()
    }
}
