use std::time::Instant;

use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::geometry::Frustum;
use crate::math::Point3;
use crate::mesh::TriangleMesh;
use crate::operations::sampling::{
    ConeSurfaceSampler, FilterForkPoints, SampleElimination, SurfacePoint, DEFAULT_QUERY_EPS,
    DEFAULT_RADIUS_MARGIN,
};
use crate::reconstruction::{PointCloud, PoissonParams, SurfaceReconstructor};
use crate::skeleton::SkeletonGraph;

/// What to do when a segment cannot be sampled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SegmentPolicy {
    /// Fail the whole mesh build.
    #[default]
    Abort,
    /// Log the segment and leave it out of the point cloud.
    Skip,
}

/// Parameters of the mesh build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshParams {
    /// Surface samples drawn per segment before thinning.
    pub samples_per_segment: usize,
    /// Fraction of each segment's samples kept by sample elimination.
    pub elimination_fraction: f64,
    /// Ratio of the fork exclusion radius to the vertex radius.
    pub fork_radius_margin: f64,
    /// Slack added to the fork exclusion radius.
    pub fork_query_eps: f64,
    /// Vertices of the reconstructed mesh closer than this are welded.
    pub merge_tolerance: f64,
    pub poisson: PoissonParams,
    pub segment_policy: SegmentPolicy,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            samples_per_segment: 1000,
            elimination_fraction: 0.1,
            fork_radius_margin: DEFAULT_RADIUS_MARGIN,
            fork_query_eps: DEFAULT_QUERY_EPS,
            merge_tolerance: 0.1,
            poisson: PoissonParams::default(),
            segment_policy: SegmentPolicy::Abort,
        }
    }
}

/// Builds a surface mesh around a vasculature skeleton.
///
/// Each segment is sampled as a frustum between its end spheres and thinned
/// by sample elimination, using the mean vertex radius as the elimination
/// radius for every segment. Samples inside the exclusion ball of a fork
/// are removed from the combined cloud before it is reconstructed and the
/// resulting vertices are welded.
pub struct BuildMesh {
    params: MeshParams,
}

impl BuildMesh {
    /// Creates a new `BuildMesh` operation.
    #[must_use]
    pub fn new(params: MeshParams) -> Self {
        Self { params }
    }

    #[must_use]
    pub fn params(&self) -> &MeshParams {
        &self.params
    }

    /// Builds the oriented point cloud the mesh is reconstructed from.
    ///
    /// The sampler's azimuths and uniforms are drawn from `rng` once and
    /// shared by all segments. Segments are processed in parallel and their
    /// samples concatenated in edge order.
    ///
    /// # Errors
    ///
    /// Returns an error if a segment is degenerate under
    /// [`SegmentPolicy::Abort`], or if elimination or fork filtering fail.
    #[allow(clippy::cast_precision_loss)]
    pub fn point_cloud<R: Rng + ?Sized>(
        &self,
        skeleton: &SkeletonGraph,
        rng: &mut R,
    ) -> Result<PointCloud> {
        if skeleton.n_edges() == 0 {
            warn!("skeleton has no edges, point cloud is empty");
            return Ok(PointCloud::default());
        }

        let start = Instant::now();
        let sampler = ConeSurfaceSampler::new(self.params.samples_per_segment, rng);
        let points = skeleton.points();
        let diameters = skeleton.diameters();
        let radius = diameters.iter().map(|d| 0.5 * d).sum::<f64>() / diameters.len() as f64;

        let segments: Vec<Result<Vec<SurfacePoint>>> = skeleton
            .edges()
            .par_iter()
            .map(|&[a, b]| {
                let (a, b) = (a as usize, b as usize);
                self.segment_samples(
                    &sampler,
                    (points[a], 0.5 * diameters[a]),
                    (points[b], 0.5 * diameters[b]),
                    radius,
                )
            })
            .collect();

        let mut cloud = PointCloud::with_capacity(segments.iter().flatten().map(Vec::len).sum());
        let mut skipped = 0usize;
        for (edge, samples) in skeleton.edges().iter().zip(segments) {
            match (samples, self.params.segment_policy) {
                (Ok(samples), _) => cloud.extend(samples),
                (Err(err), SegmentPolicy::Abort) => return Err(err),
                (Err(err), SegmentPolicy::Skip) => {
                    warn!(?edge, %err, "skipping segment");
                    skipped += 1;
                }
            }
        }
        debug!(
            segments = skeleton.n_edges(),
            skipped,
            samples = cloud.len(),
            "segments sampled"
        );

        let degrees = skeleton.degrees();
        let kept = FilterForkPoints::new(points, diameters, &degrees)
            .with_margin(self.params.fork_radius_margin)
            .with_eps(self.params.fork_query_eps)
            .execute(cloud.positions())?;
        let cloud = cloud.select(&kept)?;

        info!(
            segments = skeleton.n_edges(),
            points = cloud.len(),
            radius,
            elapsed_ms = start.elapsed().as_millis(),
            "point cloud built"
        );
        Ok(cloud)
    }

    /// Samples and thins one segment given its two end spheres.
    fn segment_samples(
        &self,
        sampler: &ConeSurfaceSampler,
        (p1, r1): (Point3, f64),
        (p2, r2): (Point3, f64),
        radius: f64,
    ) -> Result<Vec<SurfacePoint>> {
        let frustum = Frustum::ordered(p1, p2, r1, r2)?;
        let samples = sampler.sample(&frustum);
        let positions: Vec<Point3> = samples.iter().map(|s| s.position.cast::<f64>()).collect();
        let kept = SampleElimination::new(&positions, radius, self.params.elimination_fraction)
            .execute()?;
        Ok(kept.into_iter().map(|i| samples[i]).collect())
    }

    /// Executes the operation and returns the welded mesh.
    ///
    /// A skeleton without edges yields an empty mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the point cloud cannot be built or the
    /// reconstruction fails.
    #[allow(clippy::cast_precision_loss)]
    pub fn execute<R, S>(
        &self,
        skeleton: &SkeletonGraph,
        reconstructor: &S,
        rng: &mut R,
    ) -> Result<TriangleMesh>
    where
        R: Rng + ?Sized,
        S: SurfaceReconstructor + ?Sized,
    {
        if skeleton.n_edges() == 0 {
            warn!("skeleton has no edges, mesh is empty");
            return Ok(TriangleMesh::default());
        }

        let start = Instant::now();
        let cloud = self.point_cloud(skeleton, rng)?;
        let reconstruction = reconstructor.reconstruct(&cloud, &self.params.poisson)?;
        let mut mesh = reconstruction.mesh;
        if !reconstruction.densities.is_empty() {
            let mean = reconstruction.densities.iter().sum::<f64>()
                / reconstruction.densities.len() as f64;
            debug!(mean_density = mean, "reconstruction densities");
        }

        let removed = mesh.merge_close_vertices(self.params.merge_tolerance);
        info!(
            vertices = mesh.n_vertices(),
            triangles = mesh.n_triangles(),
            merged = removed,
            elapsed_ms = start.elapsed().as_millis(),
            "mesh built"
        );
        Ok(mesh)
    }
}
