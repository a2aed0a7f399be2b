pub mod rotation;

pub use rotation::rotate_z_axis_to_vector;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Single-precision 3D point, used for sampled surface data.
pub type Point3f = nalgebra::Point3<f32>;

/// Single-precision 3D vector, used for sampled surface normals.
pub type Vector3f = nalgebra::Vector3<f32>;

/// 3x3 matrix type.
pub type Matrix3 = nalgebra::Matrix3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Absolute tolerance under which a weight is treated as zero.
pub const NUMERIC_ZERO: f64 = 1e-8;

/// Returns `true` if `value` is zero within [`NUMERIC_ZERO`].
#[must_use]
pub fn is_numeric_zero(value: f64) -> bool {
    value.abs() <= NUMERIC_ZERO
}

/// Scales `value` by `10^decimals` and rounds half to even.
///
/// Two values rounding to the same decimal place produce the same key. The
/// key is exact only while `|value| * 10^decimals` stays below `2^63`;
/// beyond that it saturates to `i64::MIN` or `i64::MAX`, and NaN maps to 0.
/// Use [`checked_decimal_key`] when inputs are not known to be bounded.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn decimal_key(value: f64, decimals: u32) -> i64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round_ties_even() as i64
}

/// Like [`decimal_key`], but `None` when the rounded value is not finite or
/// does not fit in an `i64`.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss
)]
pub fn checked_decimal_key(value: f64, decimals: u32) -> Option<i64> {
    // 2^63 is exact in f64; i64::MIN is -2^63.
    const LIMIT: f64 = i64::MAX as f64;
    let scaled = (value * 10f64.powi(decimals as i32)).round_ties_even();
    (scaled.is_finite() && (-LIMIT..LIMIT).contains(&scaled)).then_some(scaled as i64)
}
