mod build_mesh;

pub use build_mesh::{BuildMesh, MeshParams, SegmentPolicy};
