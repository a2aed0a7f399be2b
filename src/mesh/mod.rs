//! Indexed triangle meshes produced by surface reconstruction.

mod merge_vertices;

use std::collections::HashMap;

use crate::error::{GraphError, Result};
use crate::geometry::BoundingBox;
use crate::math::{Point3, Vector3};

/// An indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Vertex normals. Either empty or one per vertex.
    pub normals: Vec<Vector3>,
    /// Triangle indices (each triple defines a triangle, counter-clockwise
    /// seen from outside).
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Creates a mesh, checking that normals and indices are consistent with
    /// the vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if `normals` is neither empty nor one per vertex, or
    /// a triangle references a missing vertex.
    pub fn new(vertices: Vec<Point3>, normals: Vec<Vector3>, indices: Vec<[u32; 3]>) -> Result<Self> {
        if !normals.is_empty() && normals.len() != vertices.len() {
            return Err(GraphError::LengthMismatch {
                what: "vertex normals",
                expected: vertices.len(),
                actual: normals.len(),
            }
            .into());
        }
        if let Some(&index) = indices.iter().flatten().find(|&&v| v as usize >= vertices.len()) {
            return Err(GraphError::IndexOutOfRange {
                index: index as usize,
                len: vertices.len(),
            }
            .into());
        }
        Ok(Self {
            vertices,
            normals,
            indices,
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[must_use]
    pub fn n_vertices(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn n_triangles(&self) -> usize {
        self.indices.len()
    }

    /// Appends `other`, shifting its indices past this mesh's vertices.
    #[allow(clippy::cast_possible_truncation)]
    pub fn append(&mut self, other: &TriangleMesh) {
        let offset = self.vertices.len() as u32;
        if self.normals.len() == self.vertices.len() && other.normals.len() == other.vertices.len() {
            self.normals.extend_from_slice(&other.normals);
        } else {
            self.normals.clear();
        }
        self.vertices.extend_from_slice(&other.vertices);
        self.indices
            .extend(other.indices.iter().map(|t| t.map(|v| v + offset)));
    }

    /// Bounding box of the vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh has no vertices.
    pub fn bounding_box(&self) -> Result<BoundingBox> {
        BoundingBox::from_points(&self.vertices)
    }

    /// Recomputes vertex normals as area-weighted averages of the incident
    /// face normals.
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![Vector3::zeros(); self.vertices.len()];
        for tri in &self.indices {
            let [a, b, c] = tri.map(|v| self.vertices[v as usize]);
            let face = (b - a).cross(&(c - a));
            for &v in tri {
                normals[v as usize] += face;
            }
        }
        for n in &mut normals {
            *n = n.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros);
        }
        self.normals = normals;
    }

    /// Signed enclosed volume; positive for a closed mesh with outward
    /// winding.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        self.indices
            .iter()
            .map(|tri| {
                let [a, b, c] = tri.map(|v| self.vertices[v as usize].coords);
                a.dot(&b.cross(&c))
            })
            .sum::<f64>()
            / 6.0
    }

    /// Number of faces sharing each undirected edge.
    fn edge_use(&self) -> HashMap<(u32, u32), usize> {
        let mut uses = HashMap::with_capacity(self.indices.len() * 3 / 2);
        for &[a, b, c] in &self.indices {
            for (u, v) in [(a, b), (b, c), (c, a)] {
                *uses.entry((u.min(v), u.max(v))).or_insert(0) += 1;
            }
        }
        uses
    }

    /// Number of edges used by exactly one triangle.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_use().values().filter(|&&n| n == 1).count()
    }

    /// Returns `true` if no edge is shared by more than two triangles.
    #[must_use]
    pub fn is_edge_manifold(&self) -> bool {
        self.edge_use().values().all(|&n| n <= 2)
    }
}
