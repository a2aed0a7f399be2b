use tracing::debug;

use crate::error::{GeometryError, Result};
use crate::math::{checked_decimal_key, is_numeric_zero, Point3};
use crate::spatial::NeighborGraph;

use super::priority_heap::MaxHeap;

/// Default number of decimals kept in heap keys.
pub const DEFAULT_HEAP_DECIMALS: u32 = 8;

/// Exponent of the pairwise crowding weight.
const WEIGHT_EXPONENT: i32 = 8;

/// Tolerance of the neighbour-graph symmetry check.
const SYMMETRY_TOLERANCE: f64 = 1e-12;

/// Thins a point set towards a blue-noise distribution by greedy weighted
/// elimination.
///
/// Every pair of points closer than `2 * r_max` contributes a weight
/// `(1 - d / (2 * r_max))^8` to both of its points. The most crowded point is
/// removed repeatedly, and its contribution is taken off its neighbours,
/// until `fraction` of the input remains.
pub struct SampleElimination<'a> {
    points: &'a [Point3],
    r_max: f64,
    fraction: f64,
    decimals: u32,
}

impl<'a> SampleElimination<'a> {
    /// Creates a new `SampleElimination` operation.
    #[must_use]
    pub fn new(points: &'a [Point3], r_max: f64, fraction: f64) -> Self {
        Self {
            points,
            r_max,
            fraction,
            decimals: DEFAULT_HEAP_DECIMALS,
        }
    }

    /// Sets the number of decimals weights are quantized to before ordering.
    #[must_use]
    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    /// Number of points removed for an input of `n` points.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn removal_count(n: usize, fraction: f64) -> usize {
        ((1.0 - fraction) * n as f64).floor().max(0.0) as usize
    }

    /// Executes the elimination and returns the ids of the retained points.
    ///
    /// The order of the returned ids carries no meaning.
    ///
    /// # Errors
    ///
    /// Returns an error if `r_max` is not positive, `fraction` lies outside
    /// `(0, 1]`, weights of this many points cannot be quantized at the
    /// configured decimals, or the neighbour graph turns out asymmetric.
    pub fn execute(&self) -> Result<Vec<usize>> {
        if !(self.r_max.is_finite() && self.r_max > 0.0) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "r_max",
                value: self.r_max,
                min: f64::MIN_POSITIVE,
                max: f64::INFINITY,
            }
            .into());
        }
        if !(self.fraction > 0.0 && self.fraction <= 1.0) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "fraction",
                value: self.fraction,
                min: 0.0,
                max: 1.0,
            }
            .into());
        }

        let n = self.points.len();
        // Every weight is bounded by the neighbour count, hence by `n`.
        #[allow(clippy::cast_precision_loss)]
        let max_weight = n.max(1) as f64;
        if checked_decimal_key(max_weight, self.decimals).is_none() {
            #[allow(clippy::cast_precision_loss)]
            let max = (i64::MAX as f64 / max_weight).log10().floor();
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "decimals",
                value: f64::from(self.decimals),
                min: 0.0,
                max,
            }
            .into());
        }
        let mut graph = NeighborGraph::radius(self.points, 2.0 * self.r_max);
        graph.check_symmetric(SYMMETRY_TOLERANCE)?;

        let r_max = self.r_max;
        graph.map_values(|d| {
            let w = (1.0 - (0.5 * d / r_max).clamp(0.0, 1.0)).powi(WEIGHT_EXPONENT);
            if is_numeric_zero(w) {
                0.0
            } else {
                w
            }
        });
        graph.eliminate_zeros();

        let mut weights = graph.row_sums();
        let mut heap = MaxHeap::new(n, self.decimals);
        for (id, &w) in weights.iter().enumerate() {
            heap.push(id, w);
        }

        let removals = Self::removal_count(n, self.fraction);
        for _ in 0..removals {
            let Some((removed, _)) = heap.pop() else {
                break;
            };
            let (cols, values) = graph.row(removed);
            for (&j, &w) in cols.iter().zip(values) {
                if !heap.contains(j) {
                    continue;
                }
                weights[j] -= w;
                if is_numeric_zero(weights[j]) {
                    weights[j] = 0.0;
                }
                heap.update(j, weights[j]);
            }
        }

        debug!(
            input = n,
            edges = graph.nnz() / 2,
            removed = removals,
            "sample elimination finished"
        );
        Ok(heap.ids().to_vec())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::geometry::Frustum;
    use crate::operations::sampling::ConeSurfaceSampler;

    fn random_points(n: usize, seed: u64) -> Vec<Point3> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..n)
            .map(|_| {
                Point3::new(
                    rng.gen_range(0.0..10.0),
                    rng.gen_range(0.0..10.0),
                    rng.gen_range(0.0..10.0),
                )
            })
            .collect()
    }

    #[test]
    fn retained_count_matches_fraction() {
        let points = random_points(500, 1);
        for fraction in [0.1, 0.25, 0.5, 0.9, 1.0] {
            let kept = SampleElimination::new(&points, 1.0, fraction)
                .execute()
                .unwrap();
            let expected = points.len() - SampleElimination::removal_count(points.len(), fraction);
            assert_eq!(kept.len(), expected, "fraction {fraction}");
        }
    }

    #[test]
    fn retained_ids_are_unique_input_ids() {
        let points = random_points(300, 2);
        let kept = SampleElimination::new(&points, 0.8, 0.3).execute().unwrap();
        let set: HashSet<usize> = kept.iter().copied().collect();
        assert_eq!(set.len(), kept.len());
        assert!(kept.iter().all(|&i| i < points.len()));
    }

    #[test]
    fn full_fraction_keeps_everything() {
        let points = random_points(100, 3);
        let kept = SampleElimination::new(&points, 2.0, 1.0).execute().unwrap();
        let set: HashSet<usize> = kept.into_iter().collect();
        assert_eq!(set, (0..100).collect());
    }

    #[test]
    fn most_crowded_point_goes_first() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.5, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(100.0, 0.0, 0.0),
        ];
        let mut kept = SampleElimination::new(&points, 1.0, 0.75)
            .execute()
            .unwrap();
        kept.sort_unstable();
        assert_eq!(kept, vec![0, 2, 3]);
    }

    #[test]
    fn elimination_is_deterministic() {
        let points = random_points(400, 4);
        let a = SampleElimination::new(&points, 0.7, 0.1).execute().unwrap();
        let b = SampleElimination::new(&points, 0.7, 0.1).execute().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn coincident_points_are_thinned() {
        let points = vec![Point3::new(1.0, 1.0, 1.0); 10];
        let kept = SampleElimination::new(&points, 0.5, 0.1).execute().unwrap();
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn empty_input() {
        let kept = SampleElimination::new(&[], 1.0, 0.5).execute().unwrap();
        assert!(kept.is_empty());
    }

    #[test]
    fn rejects_bad_parameters() {
        let points = random_points(10, 5);
        assert!(SampleElimination::new(&points, 0.0, 0.5).execute().is_err());
        assert!(SampleElimination::new(&points, 1.0, 0.0).execute().is_err());
        assert!(SampleElimination::new(&points, 1.0, 1.5).execute().is_err());
        assert!(SampleElimination::new(&points, 1.0, 0.5)
            .with_decimals(18)
            .execute()
            .is_err());
    }

    #[test]
    fn many_identical_points() {
        let points = vec![Point3::new(1.0, 1.0, 1.0); 300];
        let kept = SampleElimination::new(&points, 0.5, 0.1).execute().unwrap();
        assert_eq!(kept.len(), 300 - SampleElimination::removal_count(300, 0.1));
        let unique: HashSet<usize> = kept.iter().copied().collect();
        assert_eq!(unique.len(), kept.len());
    }

    #[test]
    fn pointed_cone_with_dense_apex() {
        let frustum = Frustum::new(
            Point3::origin(),
            Point3::new(5.0, 7.0, 11.0),
            0.0,
            3.0,
        )
        .unwrap();
        let sampler = ConeSurfaceSampler::new(4000, &mut ChaCha8Rng::seed_from_u64(3));
        let positions: Vec<Point3> = sampler
            .sample(&frustum)
            .iter()
            .map(|s| s.position.cast::<f64>())
            .collect();
        assert_eq!(positions.len(), 4000);
        let kept = SampleElimination::new(&positions, 0.5, 0.1).execute().unwrap();
        assert_eq!(kept.len(), 4000 - SampleElimination::removal_count(4000, 0.1));
    }
}
