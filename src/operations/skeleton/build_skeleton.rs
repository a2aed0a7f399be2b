use std::time::Instant;

use rand::Rng;
use tracing::info;

use crate::error::{GeometryError, OperationError, Result};
use crate::geometry::{BoundingBox, Grid};
use crate::math::{Point3, TOLERANCE};
use crate::skeleton::SkeletonGraph;

use super::{DeduplicatePoints, SpaceFillingTree, DEFAULT_DEDUP_DECIMALS};

/// Parameters of the synthetic skeleton.
#[derive(Debug, Clone, Copy)]
pub struct SkeletonParams {
    /// Number of tree levels. Must be at least 1.
    pub depth: u32,
    /// Decimals two vertices must agree to be merged.
    pub dedup_decimals: u32,
    /// Vertex diameters are drawn uniformly from `[low, high)`.
    pub diameter_range: (f64, f64),
    /// Type assigned to every edge.
    pub edge_type: i32,
}

impl Default for SkeletonParams {
    fn default() -> Self {
        Self {
            depth: 2,
            dedup_decimals: DEFAULT_DEDUP_DECIMALS,
            diameter_range: (5.0, 8.0),
            edge_type: 1,
        }
    }
}

/// Builds a space-filling vasculature skeleton that spans a grid exactly.
pub struct BuildSkeleton {
    grid: Grid,
    params: SkeletonParams,
}

impl BuildSkeleton {
    /// Creates a new `BuildSkeleton` operation.
    #[must_use]
    pub fn new(grid: Grid, params: SkeletonParams) -> Self {
        Self { grid, params }
    }

    /// Executes the operation, drawing vertex diameters from `rng`.
    ///
    /// # Errors
    ///
    /// Returns an error if `depth` is zero or the diameter range is empty or
    /// not positive.
    pub fn execute<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SkeletonGraph> {
        let SkeletonParams {
            depth,
            dedup_decimals,
            diameter_range: (low, high),
            edge_type,
        } = self.params;
        if depth == 0 {
            return Err(OperationError::InvalidInput(
                "skeleton depth must be at least 1".into(),
            )
            .into());
        }
        if !(low.is_finite() && high.is_finite() && low > 0.0 && low < high) {
            return Err(OperationError::InvalidInput(format!(
                "invalid diameter range [{low}, {high})"
            ))
            .into());
        }

        let start = Instant::now();
        let centroid = self.grid.centroid();
        let (raw, raw_edges) = SpaceFillingTree::new(self.grid.extents(), depth).execute();
        let shifted: Vec<Point3> = raw.iter().map(|p| p + centroid.coords).collect();
        let (points, edges) = DeduplicatePoints::new(dedup_decimals).execute(&shifted, &raw_edges)?;
        let points = self.align_to_grid(&points)?;

        let diameters = (0..points.len()).map(|_| rng.gen_range(low..high)).collect();
        let edge_types = vec![edge_type; edges.len()];

        info!(
            depth,
            raw_vertices = raw.len(),
            vertices = points.len(),
            edges = edges.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "skeleton built"
        );
        SkeletonGraph::new(points, edges, diameters, edge_types)
    }

    /// Rescales and recentres `points` so their bounding box equals the grid's.
    fn align_to_grid(&self, points: &[Point3]) -> Result<Vec<Point3>> {
        let bbox = BoundingBox::from_points(points)?;
        let extent = bbox.extent();
        if extent.iter().any(|&e| e < TOLERANCE) {
            return Err(GeometryError::Degenerate("skeleton is flat along an axis".into()).into());
        }
        let scale = self.grid.extents().component_div(&extent);
        let center = bbox.center();
        let centroid = self.grid.centroid();
        Ok(points
            .iter()
            .map(|p| centroid + (p - center).component_mul(&scale))
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn build(depth: u32) -> (Grid, SkeletonGraph) {
        let grid = Grid::from_cubic_bbox(70.0, 7.0, Point3::origin()).unwrap();
        let params = SkeletonParams {
            depth,
            ..SkeletonParams::default()
        };
        let skeleton = BuildSkeleton::new(grid, params)
            .execute(&mut ChaCha8Rng::seed_from_u64(0))
            .unwrap();
        (grid, skeleton)
    }

    #[test]
    fn skeleton_fits_grid_bbox() {
        let (grid, skeleton) = build(2);
        assert!(skeleton.fits_grid(&grid, 1e-9));
        let bbox = skeleton.bounding_box().unwrap();
        assert!((bbox.min_point() - Point3::origin()).norm() < 1e-9);
        assert!((bbox.max_point() - Point3::new(70.0, 70.0, 70.0)).norm() < 1e-9);
    }

    #[test]
    fn skeleton_has_unique_edges() {
        let (_, skeleton) = build(2);
        let mut pairs = HashSet::new();
        for &[a, b] in skeleton.edges() {
            assert_ne!(a, b);
            assert!(pairs.insert((a.min(b), a.max(b))));
        }
        assert!(skeleton.n_edges() > 0);
    }

    #[test]
    fn diameters_and_types_follow_params() {
        let (_, skeleton) = build(2);
        assert_eq!(skeleton.diameters().len(), skeleton.n_vertices());
        assert!(skeleton
            .diameters()
            .iter()
            .all(|d| (5.0..=8.0).contains(d)));
        assert!(skeleton.edge_types().iter().all(|&t| t == 1));
    }

    #[test]
    fn depth_two_merges_coincident_vertices() {
        let (_, skeleton) = build(2);
        assert!(skeleton.n_vertices() < 81);
        assert_eq!(skeleton.n_edges(), 72);
    }

    #[test]
    fn depth_one_is_a_star() {
        let (_, skeleton) = build(1);
        assert_eq!(skeleton.n_vertices(), 9);
        assert_eq!(skeleton.degrees()[0], 8);
    }

    #[test]
    fn same_seed_same_skeleton() {
        assert_eq!(build(2).1, build(2).1);
    }

    #[test]
    fn zero_depth_is_rejected() {
        let grid = Grid::from_cubic_bbox(70.0, 7.0, Point3::origin()).unwrap();
        let params = SkeletonParams {
            depth: 0,
            ..SkeletonParams::default()
        };
        let r = BuildSkeleton::new(grid, params).execute(&mut ChaCha8Rng::seed_from_u64(0));
        assert!(r.is_err());
    }
}
