use std::collections::{HashMap, HashSet};

use crate::error::{GeometryError, GraphError, Result};
use crate::math::{checked_decimal_key, Point3};

/// Default number of decimals two points must agree to be merged.
pub const DEFAULT_DEDUP_DECIMALS: u32 = 2;

/// Merges points whose coordinates agree after rounding and remaps edges.
///
/// Each group of coincident points is represented by its first member,
/// unrounded. Edges are rewritten to the merged ids; an edge whose endpoints
/// merged into one point is dropped, and of several edges joining the same
/// unordered pair only the first is kept, with its original endpoint order.
pub struct DeduplicatePoints {
    decimals: u32,
}

impl Default for DeduplicatePoints {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUP_DECIMALS)
    }
}

impl DeduplicatePoints {
    /// Creates a new `DeduplicatePoints` operation.
    #[must_use]
    pub fn new(decimals: u32) -> Self {
        Self { decimals }
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
    fn key(&self, value: f64) -> Result<i64> {
        checked_decimal_key(value, self.decimals).ok_or_else(|| {
            let bound = i64::MAX as f64 / 10f64.powi(self.decimals.min(308) as i32);
            GeometryError::ParameterOutOfRange {
                parameter: "coordinate",
                value,
                min: -bound,
                max: bound,
            }
            .into()
        })
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge references a missing point, or a
    /// coordinate is not finite or too large to round at `decimals`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn execute(
        &self,
        points: &[Point3],
        edges: &[[u32; 2]],
    ) -> Result<(Vec<Point3>, Vec<[u32; 2]>)> {
        let mut by_key: HashMap<[i64; 3], u32> = HashMap::with_capacity(points.len());
        let mut unique = Vec::new();
        let mut remap = Vec::with_capacity(points.len());
        for p in points {
            let key = [self.key(p.x)?, self.key(p.y)?, self.key(p.z)?];
            remap.push(*by_key.entry(key).or_insert_with(|| {
                unique.push(*p);
                (unique.len() - 1) as u32
            }));
        }

        let mut seen = HashSet::with_capacity(edges.len());
        let mut new_edges = Vec::with_capacity(edges.len());
        for &[a, b] in edges {
            let lookup = |v: u32| {
                remap.get(v as usize).copied().ok_or(GraphError::IndexOutOfRange {
                    index: v as usize,
                    len: points.len(),
                })
            };
            let (ua, ub) = (lookup(a)?, lookup(b)?);
            if ua == ub {
                continue;
            }
            if seen.insert((ua.min(ub), ua.max(ub))) {
                new_edges.push([ua, ub]);
            }
        }

        Ok((unique, new_edges))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn merges_near_coincident_points() {
        let points = vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.001, 0.0, -0.002),
            p(2.0, 0.0, 0.0),
        ];
        let edges = vec![[0, 1], [2, 3], [1, 2]];
        let (pts, edg) = DeduplicatePoints::default().execute(&points, &edges).unwrap();
        assert_eq!(pts, vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)]);
        assert_eq!(edg, vec![[0, 1], [0, 2]]);
    }

    #[test]
    fn keeps_first_of_reversed_duplicates() {
        let points = vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)];
        let edges = vec![[1, 0], [0, 2], [0, 1], [2, 0], [1, 2]];
        let (_, edg) = DeduplicatePoints::default().execute(&points, &edges).unwrap();
        assert_eq!(edg, vec![[1, 0], [0, 2], [1, 2]]);
    }

    #[test]
    fn drops_collapsed_edges() {
        let points = vec![p(0.0, 0.0, 0.0), p(0.0, 0.0, 0.004), p(1.0, 1.0, 1.0)];
        let edges = vec![[0, 1], [1, 2]];
        let (pts, edg) = DeduplicatePoints::default().execute(&points, &edges).unwrap();
        assert_eq!(pts.len(), 2);
        assert_eq!(edg, vec![[0, 1]]);
    }

    #[test]
    fn is_idempotent() {
        let points: Vec<Point3> = (0..40)
            .map(|i| p(f64::from(i % 7) * 0.5, f64::from(i % 3), f64::from(i % 5) * 0.25))
            .collect();
        let edges: Vec<[u32; 2]> = (0..39).map(|i| [i, (i * 7 + 3) % 40]).collect();
        let op = DeduplicatePoints::default();
        let once = op.execute(&points, &edges).unwrap();
        let twice = op.execute(&once.0, &once.1).unwrap();
        assert_eq!(once, twice);

        let mut pairs = HashSet::new();
        for &[a, b] in &once.1 {
            assert_ne!(a, b);
            assert!((a as usize) < once.0.len() && (b as usize) < once.0.len());
            assert!(pairs.insert((a.min(b), a.max(b))));
        }
    }

    #[test]
    fn dangling_edge_fails() {
        let points = vec![p(0.0, 0.0, 0.0)];
        assert!(DeduplicatePoints::default().execute(&points, &[[0, 3]]).is_err());
    }

    #[test]
    fn unroundable_coordinates_fail() {
        let points = vec![p(0.0, 0.0, 0.0), p(1e17, 0.0, 0.0)];
        assert!(DeduplicatePoints::default().execute(&points, &[[0, 1]]).is_err());
        let points = vec![p(f64::NAN, 0.0, 0.0)];
        assert!(DeduplicatePoints::default().execute(&points, &[]).is_err());
        assert!(DeduplicatePoints::new(0).execute(&[p(1e17, 0.0, 0.0)], &[]).is_ok());
    }
}
