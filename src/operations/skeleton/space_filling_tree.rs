use crate::math::{Point3, Vector3};

/// Corners of the unit cube, in the order children are emitted.
const ORTHANT_CORNERS: [[f64; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0],
];

/// Grows a self-similar octree-like tree of vertices centred at the origin.
///
/// Level `i` gives every vertex produced so far eight children, offset by the
/// orthant basis `0.5 * (corner - 0.5) * extents` scaled by `0.5^i`. The edge
/// list of each level replaces the previous one and joins every vertex to its
/// new children, so the tree has `9^depth` vertices and `8 * 9^(depth - 1)`
/// edges. Coincident vertices are expected and are merged afterwards.
pub struct SpaceFillingTree {
    extents: Vector3,
    depth: u32,
}

impl SpaceFillingTree {
    /// Creates a new `SpaceFillingTree` operation.
    #[must_use]
    pub fn new(extents: Vector3, depth: u32) -> Self {
        Self { extents, depth }
    }

    /// Offsets from a vertex to its eight children at level 0.
    #[must_use]
    pub fn orthant_basis(&self) -> [Vector3; 8] {
        ORTHANT_CORNERS.map(|[x, y, z]| {
            (Vector3::new(x, y, z) - Vector3::repeat(0.5)).component_mul(&self.extents) * 0.5
        })
    }

    /// Executes the growth and returns the raw vertices and edges.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn execute(&self) -> (Vec<Point3>, Vec<[u32; 2]>) {
        let basis = self.orthant_basis();
        let mut vertices = vec![Point3::origin()];
        let mut edges = Vec::new();
        let mut scale = 1.0;

        for _ in 0..self.depth {
            let roots = vertices.len();
            let mut next = Vec::with_capacity(roots * 9);
            next.extend_from_slice(&vertices);
            edges = Vec::with_capacity(roots * 8);
            for (i, root) in vertices.iter().enumerate() {
                for offset in &basis {
                    edges.push([i as u32, next.len() as u32]);
                    next.push(root + offset * scale);
                }
            }
            vertices = next;
            scale *= 0.5;
        }

        (vertices, edges)
    }
}
