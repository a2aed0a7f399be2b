//! Builds a synthetic vasculature for a 70 um cubic grid and reports the
//! skeleton and mesh statistics.
//!
//! Usage:
//! ```text
//! cargo run --release --example mesh_stats            # depth 2, seed 0
//! cargo run --release --example mesh_stats -- 3 42    # depth 3, seed 42
//! ```

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;
use vascgen::geometry::Grid;
use vascgen::math::Point3;
use vascgen::operations::meshing::{BuildMesh, MeshParams};
use vascgen::operations::skeleton::{BuildSkeleton, SkeletonParams};
use vascgen::reconstruction::ImplicitReconstructor;

fn main() -> vascgen::Result<()> {
    // Default: WARN for everything, INFO for vascgen.
    // Override with RUST_LOG env var (e.g. RUST_LOG=vascgen=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("mesh_stats=info".parse().unwrap_or_default())
        .add_directive("vascgen=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut args = std::env::args().skip(1);
    let depth = args.next().and_then(|a| a.parse().ok()).unwrap_or(2);
    let seed = args.next().and_then(|a| a.parse().ok()).unwrap_or(0);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let grid = Grid::from_cubic_bbox(70.0, 7.0, Point3::origin())?;
    let skeleton = BuildSkeleton::new(
        grid,
        SkeletonParams {
            depth,
            ..SkeletonParams::default()
        },
    )
    .execute(&mut rng)?;
    info!(
        vertices = skeleton.n_vertices(),
        edges = skeleton.n_edges(),
        fits_grid = skeleton.fits_grid(&grid, 1e-9),
        "skeleton"
    );

    let mesh = BuildMesh::new(MeshParams::default()).execute(
        &skeleton,
        &ImplicitReconstructor::new(),
        &mut rng,
    )?;
    let bbox = mesh.bounding_box()?;
    info!(
        vertices = mesh.n_vertices(),
        triangles = mesh.n_triangles(),
        volume = mesh.signed_volume(),
        boundary_edges = mesh.boundary_edge_count(),
        edge_manifold = mesh.is_edge_manifold(),
        min = ?bbox.min_point(),
        max = ?bbox.max_point(),
        "mesh"
    );
    Ok(())
}
