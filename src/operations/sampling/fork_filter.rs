use tracing::debug;

use crate::error::{GraphError, Result};
use crate::math::Point3;
use crate::spatial::PointIndex;

/// Default ratio of the exclusion ball radius to the vessel radius.
pub const DEFAULT_RADIUS_MARGIN: f64 = 1.1;

/// Default slack added to every exclusion ball radius.
pub const DEFAULT_QUERY_EPS: f64 = 1e-5;

/// Removes candidate points lying inside the exclusion ball of any branch
/// vertex (degree greater than one).
///
/// The ball around a branch vertex has radius `margin * 0.5 * diameter`;
/// points within that radius plus `eps` are dropped.
pub struct FilterForkPoints<'a> {
    vertex_points: &'a [Point3],
    vertex_diameters: &'a [f64],
    vertex_degrees: &'a [u32],
    margin: f64,
    eps: f64,
}

impl<'a> FilterForkPoints<'a> {
    /// Creates a new `FilterForkPoints` operation over the skeleton vertices.
    #[must_use]
    pub fn new(
        vertex_points: &'a [Point3],
        vertex_diameters: &'a [f64],
        vertex_degrees: &'a [u32],
    ) -> Self {
        Self {
            vertex_points,
            vertex_diameters,
            vertex_degrees,
            margin: DEFAULT_RADIUS_MARGIN,
            eps: DEFAULT_QUERY_EPS,
        }
    }

    #[must_use]
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    #[must_use]
    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    /// Returns the ids of the candidates outside every fork ball, in
    /// ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex diameters or degrees do not match the
    /// vertex count.
    pub fn execute(&self, candidates: &[Point3]) -> Result<Vec<usize>> {
        let n = self.vertex_points.len();
        for (what, len) in [
            ("vertex diameters", self.vertex_diameters.len()),
            ("vertex degrees", self.vertex_degrees.len()),
        ] {
            if len != n {
                return Err(GraphError::LengthMismatch {
                    what,
                    expected: n,
                    actual: len,
                }
                .into());
            }
        }

        let (centers, radii): (Vec<Point3>, Vec<f64>) = (0..n)
            .filter(|&v| self.vertex_degrees[v] > 1)
            .map(|v| {
                (
                    self.vertex_points[v],
                    self.margin * 0.5 * self.vertex_diameters[v],
                )
            })
            .unzip();

        let index = PointIndex::new(candidates);
        let mut inside = vec![false; candidates.len()];
        for hits in index.query_ball_point(&centers, &radii, self.eps)? {
            for i in hits {
                inside[i] = true;
            }
        }

        let kept: Vec<usize> = (0..candidates.len()).filter(|&i| !inside[i]).collect();
        debug!(
            forks = centers.len(),
            candidates = candidates.len(),
            removed = candidates.len() - kept.len(),
            "fork points filtered"
        );
        Ok(kept)
    }
}
