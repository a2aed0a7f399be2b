use crate::math::{Point3, Vector3};
use crate::mesh::TriangleMesh;

/// Scalar samples on a regular lattice of corners, `x` varying fastest.
///
/// Negative values are inside the surface.
pub(crate) struct Lattice {
    origin: Point3,
    spacing: f64,
    dims: [usize; 3],
    values: Vec<f64>,
}

impl Lattice {
    /// `values` must hold `dims[0] * dims[1] * dims[2]` entries.
    pub(crate) fn new(origin: Point3, spacing: f64, dims: [usize; 3], values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), dims.iter().product::<usize>());
        Self {
            origin,
            spacing,
            dims,
            values,
        }
    }

    fn value(&self, [i, j, k]: [usize; 3]) -> f64 {
        self.values[i + self.dims[0] * (j + self.dims[1] * k)]
    }

    #[allow(clippy::cast_precision_loss)]
    fn corner(&self, [i, j, k]: [usize; 3]) -> Point3 {
        self.origin + Vector3::new(i as f64, j as f64, k as f64) * self.spacing
    }

    fn cell_dims(&self) -> [usize; 3] {
        self.dims.map(|d| d.saturating_sub(1))
    }

    fn cell_index(&self, [i, j, k]: [usize; 3]) -> usize {
        let [cx, cy, _] = self.cell_dims();
        i + cx * (j + cy * k)
    }
}

fn inside(value: f64) -> bool {
    value < 0.0
}

/// Polygonises the zero level set with naive surface nets.
///
/// Every cell whose corners disagree in sign receives one vertex at the mean
/// of its edge crossings. Every lattice edge with a sign change yields a
/// quad over the four cells around it, split into two triangles and wound
/// so that normals point towards positive values.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn surface_nets(lattice: &Lattice, linear_fit: bool) -> TriangleMesh {
    let cell_dims = lattice.cell_dims();
    let mut cell_vertex: Vec<Option<u32>> = vec![None; cell_dims.iter().product()];
    let mut mesh = TriangleMesh::default();

    for k in 0..cell_dims[2] {
        for j in 0..cell_dims[1] {
            for i in 0..cell_dims[0] {
                let cell = [i, j, k];
                if let Some(p) = cell_vertex_position(lattice, cell, linear_fit) {
                    cell_vertex[lattice.cell_index(cell)] = Some(mesh.vertices.len() as u32);
                    mesh.vertices.push(p);
                }
            }
        }
    }

    let dims = lattice.dims;
    for k in 0..dims[2] {
        for j in 0..dims[1] {
            for i in 0..dims[0] {
                let c = [i, j, k];
                for axis in 0..3 {
                    if let Some(quad) = edge_quad(lattice, &cell_vertex, c, axis) {
                        let [q00, q10, q11, q01] = quad;
                        mesh.indices.push([q00, q10, q11]);
                        mesh.indices.push([q00, q11, q01]);
                    }
                }
            }
        }
    }
    mesh
}

/// Mean of the sign-change crossings on the twelve edges of `cell`.
#[allow(clippy::cast_precision_loss)]
fn cell_vertex_position(lattice: &Lattice, [i, j, k]: [usize; 3], linear_fit: bool) -> Option<Point3> {
    let mut sum = Vector3::zeros();
    let mut count = 0usize;
    for bits in 0..8usize {
        let a = [i + (bits & 1), j + ((bits >> 1) & 1), k + ((bits >> 2) & 1)];
        for axis in 0..3 {
            if bits & (1 << axis) != 0 {
                continue;
            }
            let mut b = a;
            b[axis] += 1;
            let (fa, fb) = (lattice.value(a), lattice.value(b));
            if inside(fa) == inside(fb) {
                continue;
            }
            let t = if linear_fit {
                (fa / (fa - fb)).clamp(0.0, 1.0)
            } else {
                0.5
            };
            let (pa, pb) = (lattice.corner(a), lattice.corner(b));
            sum += pa.coords + (pb - pa) * t;
            count += 1;
        }
    }
    (count > 0).then(|| Point3::from(sum / count as f64))
}

/// The four cell vertices around the lattice edge from `c` along `axis`, in
/// counter-clockwise order seen from the positive side, if the edge changes
/// sign.
fn edge_quad(lattice: &Lattice, cell_vertex: &[Option<u32>], c: [usize; 3], axis: usize) -> Option<[u32; 4]> {
    let dims = lattice.dims;
    let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
    if c[axis] + 1 >= dims[axis] || c[u] == 0 || c[v] == 0 || c[u] + 1 >= dims[u] || c[v] + 1 >= dims[v] {
        return None;
    }
    let mut end = c;
    end[axis] += 1;
    let (f0, f1) = (lattice.value(c), lattice.value(end));
    if inside(f0) == inside(f1) {
        return None;
    }

    let shifted = |du: usize, dv: usize| {
        let mut cell = c;
        cell[u] -= du;
        cell[v] -= dv;
        cell_vertex[lattice.cell_index(cell)]
    };
    let q00 = shifted(1, 1)?;
    let q10 = shifted(0, 1)?;
    let q11 = shifted(0, 0)?;
    let q01 = shifted(1, 0)?;

    if inside(f0) {
        Some([q00, q10, q11, q01])
    } else {
        Some([q00, q01, q11, q10])
    }
}
