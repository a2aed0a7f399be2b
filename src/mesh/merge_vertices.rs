use tracing::debug;

use crate::math::{Point3, Vector3};
use crate::spatial::PointIndex;

use super::TriangleMesh;

impl TriangleMesh {
    /// Welds vertices closer than `tolerance`.
    ///
    /// Vertices are visited in order; each unvisited vertex starts a cluster
    /// holding every unvisited vertex within `tolerance` of it, and the
    /// cluster is replaced by its mean position (and mean normal, if
    /// present). Triangles that lose a corner to the weld are removed.
    ///
    /// Returns the number of vertices removed.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn merge_close_vertices(&mut self, tolerance: f64) -> usize {
        let n = self.vertices.len();
        let has_normals = self.normals.len() == n;
        let index = PointIndex::new(&self.vertices);
        let mut remap: Vec<Option<u32>> = vec![None; n];
        let mut vertices = Vec::new();
        let mut normals = Vec::new();

        for i in 0..n {
            if remap[i].is_some() {
                continue;
            }
            let id = vertices.len() as u32;
            let mut members = vec![i];
            remap[i] = Some(id);
            for (j, _) in index.within(&self.vertices[i], tolerance.max(0.0)) {
                if remap[j].is_none() {
                    remap[j] = Some(id);
                    members.push(j);
                }
            }

            let count = members.len() as f64;
            let sum = members
                .iter()
                .fold(Vector3::zeros(), |acc, &m| acc + self.vertices[m].coords);
            vertices.push(Point3::from(sum / count));
            if has_normals {
                let normal = members
                    .iter()
                    .fold(Vector3::zeros(), |acc, &m| acc + self.normals[m]);
                normals.push(normal.try_normalize(f64::EPSILON).unwrap_or(normal));
            }
        }

        let before = self.indices.len();
        let indices: Vec<[u32; 3]> = self
            .indices
            .iter()
            .filter_map(|tri| {
                let [a, b, c] = tri.map(|v| remap[v as usize].unwrap_or(v));
                (a != b && b != c && c != a).then_some([a, b, c])
            })
            .collect();

        let removed = n - vertices.len();
        debug!(
            tolerance,
            removed_vertices = removed,
            removed_triangles = before - indices.len(),
            "merged close vertices"
        );
        self.vertices = vertices;
        self.normals = normals;
        self.indices = indices;
        removed
    }
}
