use super::{Matrix3, Vector3};

/// Below this value of `1 + u.z` the target direction is treated as `-z`.
const ANTIPARALLEL_TOLERANCE: f64 = 1e-9;

/// Builds the rotation that maps the canonical z-axis onto the unit vector `u`.
///
/// With `v = z x u = (-u.y, u.x, 0)` and `K` its skew-symmetric matrix, the
/// Rodrigues form reduces to `R = I + K + K^2 / (1 + u.z)`, which needs no
/// trigonometric calls. The formula is singular at `u = -z`; there the
/// half-turn about the x-axis is returned instead.
///
/// `u` must be a unit vector.
#[must_use]
#[allow(clippy::many_single_char_names, clippy::suspicious_operation_groupings)]
pub fn rotate_z_axis_to_vector(u: &Vector3) -> Matrix3 {
    let denom = 1.0 + u.z;
    if denom <= ANTIPARALLEL_TOLERANCE {
        tracing::debug!("segment axis is antiparallel to z, using half-turn about x");
        return Matrix3::new(
            1.0, 0.0, 0.0,
            0.0, -1.0, 0.0,
            0.0, 0.0, -1.0,
        );
    }

    let a = 1.0 / denom;
    let (x, y) = (u.x, u.y);
    let xy = -x * y * a;

    Matrix3::new(
        1.0 - x * x * a, xy,              x,
        xy,              1.0 - y * y * a, y,
        -x,              -y,              1.0 - (x * x + y * y) * a,
    )
}
