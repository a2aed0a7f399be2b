//! The vasculature skeleton: centreline vertices, their diameters, and the
//! segments joining them.

use std::collections::HashSet;

use crate::error::{GeometryError, GraphError, Result};
use crate::geometry::{BoundingBox, Grid};
use crate::math::Point3;

/// Undirected vertex/edge graph describing vessel centrelines.
///
/// Invariants, checked on construction:
/// - one diameter per vertex and one type per edge;
/// - every edge index is a valid vertex index;
/// - no edge joins a vertex to itself and no unordered pair repeats;
/// - diameters are finite and non-negative.
///
/// Built once and read-only afterwards; mesh generation consumes it by
/// reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkeletonGraph {
    points: Vec<Point3>,
    edges: Vec<[u32; 2]>,
    diameters: Vec<f64>,
    edge_types: Vec<i32>,
}

impl SkeletonGraph {
    /// Creates a skeleton, validating its invariants.
    ///
    /// # Errors
    ///
    /// Returns an error if the per-vertex or per-edge arrays do not match in
    /// length, an edge references a missing vertex, is a self-loop or
    /// repeats another edge, or a diameter is negative or not finite.
    pub fn new(
        points: Vec<Point3>,
        edges: Vec<[u32; 2]>,
        diameters: Vec<f64>,
        edge_types: Vec<i32>,
    ) -> Result<Self> {
        if diameters.len() != points.len() {
            return Err(GraphError::LengthMismatch {
                what: "diameters",
                expected: points.len(),
                actual: diameters.len(),
            }
            .into());
        }
        if edge_types.len() != edges.len() {
            return Err(GraphError::LengthMismatch {
                what: "edge types",
                expected: edges.len(),
                actual: edge_types.len(),
            }
            .into());
        }
        if let Some(&index) = edges.iter().flatten().find(|&&v| v as usize >= points.len()) {
            return Err(GraphError::IndexOutOfRange {
                index: index as usize,
                len: points.len(),
            }
            .into());
        }
        let mut pairs = HashSet::with_capacity(edges.len());
        for &[a, b] in &edges {
            if a == b {
                return Err(GraphError::SelfLoop { vertex: a as usize }.into());
            }
            if !pairs.insert((a.min(b), a.max(b))) {
                return Err(GraphError::DuplicateEdge {
                    a: a as usize,
                    b: b as usize,
                }
                .into());
            }
        }
        if let Some(&d) = diameters.iter().find(|d| !(d.is_finite() && **d >= 0.0)) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "diameter",
                value: d,
                min: 0.0,
                max: f64::INFINITY,
            }
            .into());
        }
        Ok(Self {
            points,
            edges,
            diameters,
            edge_types,
        })
    }

    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    #[must_use]
    pub fn edges(&self) -> &[[u32; 2]] {
        &self.edges
    }

    #[must_use]
    pub fn diameters(&self) -> &[f64] {
        &self.diameters
    }

    #[must_use]
    pub fn edge_types(&self) -> &[i32] {
        &self.edge_types
    }

    #[must_use]
    pub fn n_vertices(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn n_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of edges incident to each vertex.
    #[must_use]
    pub fn degrees(&self) -> Vec<u32> {
        let mut degrees = vec![0u32; self.points.len()];
        for &[a, b] in &self.edges {
            degrees[a as usize] += 1;
            degrees[b as usize] += 1;
        }
        degrees
    }

    /// Bounding box of the vertex positions.
    ///
    /// # Errors
    ///
    /// Returns an error if the skeleton has no vertices.
    pub fn bounding_box(&self) -> Result<BoundingBox> {
        BoundingBox::from_points(&self.points)
    }

    /// Returns `true` if the vertices span exactly the grid's bounding box.
    #[must_use]
    pub fn fits_grid(&self, grid: &Grid, tolerance: f64) -> bool {
        self.bounding_box()
            .is_ok_and(|bbox| bbox.approx_eq(&grid.bbox(), tolerance))
    }
}
