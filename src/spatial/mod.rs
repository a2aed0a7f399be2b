//! Spatial queries over static point sets.

mod neighbors;

pub use neighbors::NeighborGraph;

use std::collections::HashMap;

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;

use crate::error::{GraphError, Result};
use crate::math::Point3;

/// Leaf bucket capacity. Must exceed the number of distinct points sharing
/// one coordinate value on an axis, which happens for axis-aligned cap discs.
const BUCKET_SIZE: usize = 256;

type Tree = KdTree<f64, u64, 3, BUCKET_SIZE, u32>;

/// A k-d tree over a fixed set of points, answering ball and
/// nearest-neighbour queries by point index.
///
/// Points at exactly the same position share one tree entry and are
/// expanded back to every input index, in ascending order, when reported.
pub struct PointIndex {
    tree: Tree,
    /// `members[offsets[s]..offsets[s + 1]]` are the points at position `s`.
    offsets: Vec<usize>,
    members: Vec<usize>,
}

/// Bit pattern of a position, with `-0.0` folded into `0.0`.
fn position_key(p: &Point3) -> [u64; 3] {
    [p.x, p.y, p.z].map(|v| (v + 0.0).to_bits())
}

impl PointIndex {
    /// Builds the index. Point `i` is reported as index `i`.
    #[must_use]
    pub fn new(points: &[Point3]) -> Self {
        let mut slot_of_key: HashMap<[u64; 3], usize> = HashMap::with_capacity(points.len());
        let mut slots = Vec::with_capacity(points.len());
        let mut positions = Vec::new();
        for p in points {
            let next = positions.len();
            let slot = *slot_of_key.entry(position_key(p)).or_insert_with(|| {
                positions.push(*p);
                next
            });
            slots.push(slot);
        }

        let mut offsets = vec![0usize; positions.len() + 1];
        for &s in &slots {
            offsets[s + 1] += 1;
        }
        for s in 0..positions.len() {
            offsets[s + 1] += offsets[s];
        }
        let mut fill = offsets.clone();
        let mut members = vec![0usize; points.len()];
        for (i, &s) in slots.iter().enumerate() {
            members[fill[s]] = i;
            fill[s] += 1;
        }

        let mut tree = Tree::with_capacity(positions.len().max(1));
        for (s, p) in positions.iter().enumerate() {
            tree.add(&[p.x, p.y, p.z], s as u64);
        }
        Self {
            tree,
            offsets,
            members,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Number of distinct positions held by the tree.
    #[must_use]
    pub fn n_positions(&self) -> usize {
        self.offsets.len() - 1
    }

    #[allow(clippy::cast_possible_truncation)]
    fn slot_members(&self, item: u64) -> &[usize] {
        let s = item as usize;
        &self.members[self.offsets[s]..self.offsets[s + 1]]
    }

    /// Indices and distances of all points within `radius` of `center`,
    /// nearest first.
    #[must_use]
    pub fn within(&self, center: &Point3, radius: f64) -> Vec<(usize, f64)> {
        if self.is_empty() || radius < 0.0 {
            return Vec::new();
        }
        self.tree
            .within::<SquaredEuclidean>(&[center.x, center.y, center.z], radius * radius)
            .into_iter()
            .flat_map(|n| {
                let d = n.distance.sqrt();
                self.slot_members(n.item).iter().map(move |&i| (i, d))
            })
            .collect()
    }

    /// The nearest indexed point to `query` and its distance. Of several
    /// points at the same position the smallest index is reported.
    #[must_use]
    pub fn nearest(&self, query: &Point3) -> Option<(usize, f64)> {
        if self.is_empty() {
            return None;
        }
        let n = self
            .tree
            .nearest_one::<SquaredEuclidean>(&[query.x, query.y, query.z]);
        let first = *self.slot_members(n.item).first()?;
        Some((first, n.distance.sqrt()))
    }

    /// The `k` nearest indexed points to `query`, nearest first.
    #[must_use]
    pub fn nearest_n(&self, query: &Point3, k: usize) -> Vec<(usize, f64)> {
        if self.is_empty() || k == 0 {
            return Vec::new();
        }
        // Each position holds at least one point, so `k` positions suffice.
        let mut out: Vec<(usize, f64)> = self
            .tree
            .nearest_n::<SquaredEuclidean>(&[query.x, query.y, query.z], k)
            .into_iter()
            .flat_map(|n| {
                let d = n.distance.sqrt();
                self.slot_members(n.item).iter().map(move |&i| (i, d))
            })
            .collect();
        out.truncate(k);
        out
    }

    /// For each centre, the indices of points within `radius + eps` of it.
    ///
    /// # Errors
    ///
    /// Returns an error if `centers` and `radii` differ in length.
    pub fn query_ball_point(
        &self,
        centers: &[Point3],
        radii: &[f64],
        eps: f64,
    ) -> Result<Vec<Vec<usize>>> {
        if centers.len() != radii.len() {
            return Err(GraphError::LengthMismatch {
                what: "ball query radii",
                expected: centers.len(),
                actual: radii.len(),
            }
            .into());
        }
        Ok(centers
            .iter()
            .zip(radii)
            .map(|(c, &r)| self.within(c, r + eps).into_iter().map(|(i, _)| i).collect())
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(n: usize) -> Vec<Point3> {
        (0..n).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect()
    }

    #[test]
    fn within_returns_points_in_ball() {
        let index = PointIndex::new(&line(10));
        let mut hits: Vec<usize> = index
            .within(&Point3::new(4.2, 0.0, 0.0), 1.5)
            .into_iter()
            .map(|(i, _)| i)
            .collect();
        hits.sort_unstable();
        assert_eq!(hits, vec![3, 4, 5]);
    }

    #[test]
    fn nearest_reports_distance() {
        let index = PointIndex::new(&line(5));
        let (i, d) = index.nearest(&Point3::new(2.9, 0.0, 0.0)).unwrap();
        assert_eq!(i, 3);
        assert!((d - 0.1).abs() < 1e-12);
    }

    #[test]
    fn empty_index() {
        let index = PointIndex::new(&[]);
        assert!(index.is_empty());
        assert!(index.nearest(&Point3::origin()).is_none());
        assert!(index.within(&Point3::origin(), 10.0).is_empty());
    }

    #[test]
    fn nearest_n_is_sorted() {
        let index = PointIndex::new(&line(10));
        let hits = index.nearest_n(&Point3::new(6.2, 0.0, 0.0), 3);
        let ids: Vec<usize> = hits.iter().map(|&(i, _)| i).collect();
        assert_eq!(ids, vec![6, 7, 5]);
        assert!(hits.windows(2).all(|w| w[0].1 <= w[1].1));
        assert_eq!(index.nearest_n(&Point3::origin(), 20).len(), 10);
    }

    #[test]
    fn ball_query_adds_eps() {
        let index = PointIndex::new(&line(4));
        let hits = index
            .query_ball_point(&[Point3::origin()], &[0.99], 0.02)
            .unwrap();
        let mut first = hits[0].clone();
        first.sort_unstable();
        assert_eq!(first, vec![0, 1]);
    }

    #[test]
    fn ball_query_length_mismatch() {
        let index = PointIndex::new(&line(4));
        assert!(index.query_ball_point(&[Point3::origin()], &[], 0.0).is_err());
    }

    #[test]
    fn coincident_points_share_one_position() {
        let mut pts = vec![Point3::new(1.0, 1.0, 1.0); 300];
        pts.push(Point3::new(2.0, 1.0, 1.0));
        pts.push(Point3::new(-0.0, 0.0, 0.0));
        pts.push(Point3::origin());
        let index = PointIndex::new(&pts);
        assert_eq!(index.len(), 303);
        assert_eq!(index.n_positions(), 3);

        let hits = index.within(&Point3::new(1.0, 1.0, 1.0), 0.5);
        let ids: Vec<usize> = hits.iter().map(|&(i, _)| i).collect();
        assert_eq!(ids, (0..300).collect::<Vec<_>>());
        assert!(hits.iter().all(|&(_, d)| d == 0.0));

        assert_eq!(index.nearest(&Point3::new(1.1, 1.0, 1.0)).unwrap().0, 0);
        assert_eq!(index.nearest(&Point3::new(0.0, 0.1, 0.0)).unwrap().0, 301);

        let near = index.nearest_n(&Point3::new(1.9, 1.0, 1.0), 3);
        assert_eq!(near.len(), 3);
        assert_eq!(near[0].0, 300);
        assert_eq!(&[near[1].0, near[2].0], &[0, 1]);
    }

    #[test]
    fn many_coplanar_points() {
        // Far more coplanar points than the 32-item default bucket holds.
        let pts: Vec<Point3> = (0..300)
            .map(|i| Point3::new(f64::from(i % 20), f64::from(i / 20), 0.0))
            .collect();
        let index = PointIndex::new(&pts);
        assert_eq!(index.len(), 300);
        assert_eq!(index.nearest(&Point3::new(3.1, 2.1, 0.4)).unwrap().0, 43);
    }
}
