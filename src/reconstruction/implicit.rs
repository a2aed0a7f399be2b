use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::{ReconstructionError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::spatial::PointIndex;

use super::surface_nets::{surface_nets, Lattice};
use super::{PointCloud, PoissonParams, Reconstruction, SurfaceReconstructor};

/// Samples averaged into each signed-distance estimate.
const SDF_NEIGHBORS: usize = 8;

/// Deepest supported lattice.
const MAX_DEPTH: u32 = 9;

/// Reconstructs a closed surface from the signed distance to the samples'
/// tangent planes.
///
/// The distance at a lattice corner is the mean of `(q - p) . n` over the
/// nearest samples `(p, n)`. The lattice has `2^depth` cells along the
/// longest side of the cloud's bounding box scaled by `scale`, padded by one
/// cell on every side so that the zero level set closes, and is polygonised
/// with surface nets. The density of a vertex is the number of samples
/// within one cell of it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImplicitReconstructor;

impl ImplicitReconstructor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[allow(clippy::cast_precision_loss)]
fn signed_distance(index: &PointIndex, cloud: &PointCloud, q: &Point3) -> f64 {
    let neighbors = index.nearest_n(q, SDF_NEIGHBORS);
    if neighbors.is_empty() {
        return f64::INFINITY;
    }
    let sum: f64 = neighbors
        .iter()
        .map(|&(j, _)| (q - cloud.positions()[j]).dot(&cloud.normals()[j]))
        .sum();
    sum / neighbors.len() as f64
}

impl SurfaceReconstructor for ImplicitReconstructor {
    #[allow(clippy::cast_precision_loss)]
    fn reconstruct(&self, cloud: &PointCloud, params: &PoissonParams) -> Result<Reconstruction> {
        if cloud.is_empty() {
            return Err(ReconstructionError::EmptyPointCloud.into());
        }
        if params.depth == 0 || params.depth > MAX_DEPTH {
            return Err(ReconstructionError::InvalidParameters(format!(
                "depth {} is outside [1, {MAX_DEPTH}]",
                params.depth
            ))
            .into());
        }
        if !(params.scale.is_finite() && params.scale > 0.0) {
            return Err(ReconstructionError::InvalidParameters(format!(
                "scale {} must be positive",
                params.scale
            ))
            .into());
        }

        let start = Instant::now();
        let bbox = cloud.bounding_box()?;
        let side = params.scale * bbox.extent().max();
        if side < TOLERANCE {
            return Err(ReconstructionError::Failed("samples span no volume".into()).into());
        }
        let resolution = 1usize << params.depth;
        let cell = side / resolution as f64;
        let n = resolution + 3;
        let origin = bbox.center() - Vector3::repeat(0.5 * side + cell);

        let index = PointIndex::new(cloud.positions());
        let values: Vec<f64> = (0..n * n * n)
            .into_par_iter()
            .map(|flat| {
                let (i, j, k) = (flat % n, (flat / n) % n, flat / (n * n));
                let q = origin + Vector3::new(i as f64, j as f64, k as f64) * cell;
                signed_distance(&index, cloud, &q)
            })
            .collect();
        debug!(
            corners = values.len(),
            cell,
            elapsed_ms = start.elapsed().as_millis(),
            "signed distance sampled"
        );

        let lattice = Lattice::new(origin, cell, [n; 3], values);
        let mut mesh = surface_nets(&lattice, params.linear_fit);
        mesh.compute_vertex_normals();
        let densities = mesh
            .vertices
            .par_iter()
            .map(|v| index.within(v, cell).len() as f64)
            .collect();

        info!(
            samples = cloud.len(),
            depth = params.depth,
            vertices = mesh.n_vertices(),
            triangles = mesh.n_triangles(),
            elapsed_ms = start.elapsed().as_millis(),
            "surface reconstructed"
        );
        Ok(Reconstruction { mesh, densities })
    }
}
