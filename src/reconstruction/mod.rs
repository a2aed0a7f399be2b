//! Oriented point clouds and their reconstruction into triangle meshes.

mod implicit;
mod surface_nets;

pub use implicit::ImplicitReconstructor;

use crate::error::{GraphError, Result};
use crate::geometry::BoundingBox;
use crate::math::{Point3, Vector3};
use crate::mesh::TriangleMesh;
use crate::operations::sampling::SurfacePoint;

/// Sample positions with one unit normal each.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    positions: Vec<Point3>,
    normals: Vec<Vector3>,
}

impl PointCloud {
    /// Creates a point cloud.
    ///
    /// # Errors
    ///
    /// Returns an error if there is not exactly one normal per position.
    pub fn new(positions: Vec<Point3>, normals: Vec<Vector3>) -> Result<Self> {
        if positions.len() != normals.len() {
            return Err(GraphError::LengthMismatch {
                what: "point cloud normals",
                expected: positions.len(),
                actual: normals.len(),
            }
            .into());
        }
        Ok(Self { positions, normals })
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            normals: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, position: Point3, normal: Vector3) {
        self.positions.push(position);
        self.normals.push(normal);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[must_use]
    pub fn positions(&self) -> &[Point3] {
        &self.positions
    }

    #[must_use]
    pub fn normals(&self) -> &[Vector3] {
        &self.normals
    }

    /// Bounding box of the positions.
    ///
    /// # Errors
    ///
    /// Returns an error if the cloud is empty.
    pub fn bounding_box(&self) -> Result<BoundingBox> {
        BoundingBox::from_points(&self.positions)
    }

    /// A new cloud holding the samples at `ids`, in that order.
    ///
    /// # Errors
    ///
    /// Returns an error if an id is out of range.
    pub fn select(&self, ids: &[usize]) -> Result<Self> {
        let mut out = Self::with_capacity(ids.len());
        for &i in ids {
            if i >= self.len() {
                return Err(GraphError::IndexOutOfRange {
                    index: i,
                    len: self.len(),
                }
                .into());
            }
            out.push(self.positions[i], self.normals[i]);
        }
        Ok(out)
    }
}

impl Extend<SurfacePoint> for PointCloud {
    fn extend<T: IntoIterator<Item = SurfacePoint>>(&mut self, iter: T) {
        for sp in iter {
            self.push(sp.position.cast::<f64>(), sp.normal.cast::<f64>());
        }
    }
}

impl FromIterator<SurfacePoint> for PointCloud {
    fn from_iter<T: IntoIterator<Item = SurfacePoint>>(iter: T) -> Self {
        let mut cloud = Self::default();
        cloud.extend(iter);
        cloud
    }
}

/// Parameters of the surface reconstruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoissonParams {
    /// The reconstruction lattice has `2^depth` cells along its longest side.
    pub depth: u32,
    /// Ratio between the lattice side and the largest extent of the samples.
    pub scale: f64,
    /// Place surface vertices at interpolated crossings instead of edge
    /// midpoints.
    pub linear_fit: bool,
}

impl Default for PoissonParams {
    fn default() -> Self {
        Self {
            depth: 7,
            scale: 1.0,
            linear_fit: true,
        }
    }
}

/// A reconstructed mesh and the sampling density around each of its vertices.
#[derive(Debug, Clone, Default)]
pub struct Reconstruction {
    pub mesh: TriangleMesh,
    pub densities: Vec<f64>,
}

/// Turns an oriented point cloud into a triangle mesh.
pub trait SurfaceReconstructor {
    /// Reconstructs a surface through `cloud`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cloud is empty, the parameters are invalid,
    /// or the reconstruction fails.
    fn reconstruct(&self, cloud: &PointCloud, params: &PoissonParams) -> Result<Reconstruction>;
}
