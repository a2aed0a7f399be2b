use crate::error::{GraphError, Result};
use crate::math::{is_numeric_zero, Point3};

use super::PointIndex;

/// Sparse symmetric adjacency in compressed-row form.
///
/// Row `i` holds the neighbours of point `i` in `indices[indptr[i]..indptr[i + 1]]`
/// with matching values in `data`. Column indices within a row are sorted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NeighborGraph {
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f64>,
}

impl NeighborGraph {
    /// Builds the graph linking every pair of distinct points closer than
    /// `radius`, storing their Euclidean distance. A point is never its own
    /// neighbour, but coincident distinct points are linked at distance zero.
    #[must_use]
    pub fn radius(points: &[Point3], radius: f64) -> Self {
        let index = PointIndex::new(points);
        let mut indptr = Vec::with_capacity(points.len() + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);

        for (i, p) in points.iter().enumerate() {
            let mut row: Vec<(usize, f64)> = index
                .within(p, radius)
                .into_iter()
                .filter(|&(j, _)| j != i)
                .collect();
            row.sort_unstable_by_key(|&(j, _)| j);
            for (j, d) in row {
                indices.push(j);
                data.push(d);
            }
            indptr.push(indices.len());
        }

        Self {
            indptr,
            indices,
            data,
        }
    }

    /// Number of rows (points).
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.indptr.len().saturating_sub(1)
    }

    /// Number of stored entries.
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Column indices and values of row `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n_rows()`.
    #[must_use]
    pub fn row(&self, i: usize) -> (&[usize], &[f64]) {
        let range = self.indptr[i]..self.indptr[i + 1];
        (&self.indices[range.clone()], &self.data[range])
    }

    /// Value stored at `(i, j)`, if any.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.n_rows() {
            return None;
        }
        let (cols, values) = self.row(i);
        cols.binary_search(&j).ok().map(|k| values[k])
    }

    /// Verifies that `(i, j)` and `(j, i)` are both present with matching values.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::AsymmetricNeighborGraph`] at the first mismatch.
    pub fn check_symmetric(&self, tolerance: f64) -> Result<()> {
        for i in 0..self.n_rows() {
            let (cols, values) = self.row(i);
            for (&j, &v) in cols.iter().zip(values) {
                match self.get(j, i) {
                    Some(w) if (v - w).abs() <= tolerance => {}
                    _ => return Err(GraphError::AsymmetricNeighborGraph { row: i, col: j }.into()),
                }
            }
        }
        Ok(())
    }

    /// Replaces every stored value `v` with `f(v)`.
    pub fn map_values(&mut self, f: impl Fn(f64) -> f64) {
        for v in &mut self.data {
            *v = f(*v);
        }
    }

    /// Drops entries whose value is numerically zero.
    pub fn eliminate_zeros(&mut self) {
        let mut indptr = Vec::with_capacity(self.indptr.len());
        let mut indices = Vec::with_capacity(self.indices.len());
        let mut data = Vec::with_capacity(self.data.len());
        indptr.push(0);
        for i in 0..self.n_rows() {
            let (cols, values) = self.row(i);
            for (&j, &v) in cols.iter().zip(values) {
                if !is_numeric_zero(v) {
                    indices.push(j);
                    data.push(v);
                }
            }
            indptr.push(indices.len());
        }
        self.indptr = indptr;
        self.indices = indices;
        self.data = data;
    }

    /// Sum of each row's values.
    #[must_use]
    pub fn row_sums(&self) -> Vec<f64> {
        (0..self.n_rows()).map(|i| self.row(i).1.iter().sum()).collect()
    }
}
