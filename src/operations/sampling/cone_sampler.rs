use std::f64::consts::TAU;

use rand::Rng;

use crate::error::{OperationError, Result};
use crate::geometry::Frustum;
use crate::math::{rotate_z_axis_to_vector, Point3, Point3f, Vector3, Vector3f};

/// Share of the samples placed on the two end caps.
const CAP_SHARE: f64 = 0.2;

/// One oriented sample on a segment surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    pub position: Point3f,
    pub normal: Vector3f,
}

/// Draws area-uniform samples on the lateral surface and end caps of a
/// frustum.
///
/// The azimuths and uniform values are drawn once per sampler and reused for
/// every frustum, so sampling a segment costs no random draws. Sample `i`
/// always uses azimuth `i` and uniform `i`:
///
/// - the first `floor(0.2 n) / 2` samples lie on the narrow cap,
/// - the rest of the first `floor(0.2 n)` lie on the wide cap,
/// - the remaining samples cover the lateral surface.
#[derive(Debug, Clone)]
pub struct ConeSurfaceSampler {
    cos_phi: Vec<f64>,
    sin_phi: Vec<f64>,
    uniforms: Vec<f64>,
}

impl ConeSurfaceSampler {
    /// Creates a sampler drawing `n_samples` azimuths and uniforms from `rng`.
    pub fn new<R: Rng + ?Sized>(n_samples: usize, rng: &mut R) -> Self {
        let angles: Vec<f64> = (0..n_samples).map(|_| rng.gen_range(0.0..TAU)).collect();
        let uniforms: Vec<f64> = (0..n_samples).map(|_| rng.gen::<f64>()).collect();
        Self::from_parts(&angles, uniforms)
    }

    /// Creates a sampler from explicit azimuths (radians) and uniform values
    /// in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the two slices differ in length, or a uniform
    /// value lies outside `[0, 1]`.
    pub fn from_cached(angles: &[f64], uniforms: &[f64]) -> Result<Self> {
        if angles.len() != uniforms.len() {
            return Err(OperationError::InvalidInput(format!(
                "{} cached angles but {} cached uniforms",
                angles.len(),
                uniforms.len()
            ))
            .into());
        }
        if let Some(u) = uniforms.iter().find(|u| !(0.0..=1.0).contains(*u)) {
            return Err(
                OperationError::InvalidInput(format!("cached uniform {u} is outside [0, 1]"))
                    .into(),
            );
        }
        Ok(Self::from_parts(angles, uniforms.to_vec()))
    }

    fn from_parts(angles: &[f64], uniforms: Vec<f64>) -> Self {
        Self {
            cos_phi: angles.iter().map(|a| a.cos()).collect(),
            sin_phi: angles.iter().map(|a| a.sin()).collect(),
            uniforms,
        }
    }

    /// Number of samples produced per frustum.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.uniforms.len()
    }

    /// Number of samples on both caps together.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn n_cap_samples(&self) -> usize {
        (CAP_SHARE * self.n_samples() as f64) as usize
    }

    /// Samples `frustum` in world coordinates.
    #[must_use]
    pub fn sample(&self, frustum: &Frustum) -> Vec<SurfacePoint> {
        let rotation = rotate_z_axis_to_vector(&frustum.axis());
        let origin = frustum.p_min().coords;
        self.sample_local(frustum)
            .into_iter()
            .map(|(p, n)| SurfacePoint {
                position: Point3::from(rotation * p.coords + origin).cast::<f32>(),
                normal: (rotation * n).cast::<f32>(),
            })
            .collect()
    }

    /// Samples `frustum` in its local frame: the narrow disc centred at the
    /// origin, the axis along `+z`.
    fn sample_local(&self, frustum: &Frustum) -> Vec<(Point3, Vector3)> {
        let n = self.n_samples();
        let n_caps = self.n_cap_samples();
        let n_half = n_caps / 2;
        let length = frustum.length();
        let (r_min, r_max) = (frustum.r_min(), frustum.r_max());
        let mut out = Vec::with_capacity(n);

        for i in 0..n_caps {
            let (r, z, nz) = if i < n_half {
                (r_min, 0.0, -1.0)
            } else {
                (r_max, length, 1.0)
            };
            let r = self.uniforms[i].sqrt() * r;
            out.push((
                Point3::new(r * self.cos_phi[i], r * self.sin_phi[i], z),
                Vector3::new(0.0, 0.0, nz),
            ));
        }

        match frustum.apex_heights() {
            None => {
                for i in n_caps..n {
                    let (c, s) = (self.cos_phi[i], self.sin_phi[i]);
                    out.push((
                        Point3::new(r_max * c, r_max * s, self.uniforms[i] * length),
                        Vector3::new(c, s, 0.0),
                    ));
                }
            }
            Some((h_min, h_max)) => {
                let norm = h_max.hypot(r_max);
                let (h_min2, span) = (h_min * h_min, h_max * h_max - h_min * h_min);
                for i in n_caps..n {
                    let (c, s) = (self.cos_phi[i], self.sin_phi[i]);
                    let h = (self.uniforms[i] * span + h_min2).sqrt();
                    let r = h * r_max / h_max;
                    // Deliberately not the common `(h_max c, h_max s, r_max)`
                    // form: its axial part points into the solid when the
                    // radius grows with height.
                    out.push((
                        Point3::new(r * c, r * s, h - h_min),
                        Vector3::new(h_max * c, h_max * s, -r_max) / norm,
                    ));
                }
            }
        }
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn sampler(n: usize) -> ConeSurfaceSampler {
        ConeSurfaceSampler::new(n, &mut ChaCha8Rng::seed_from_u64(0))
    }

    fn to_f64(p: &Point3f) -> Point3 {
        p.cast::<f64>()
    }

    /// Height along the axis and distance from the axis of a world point.
    fn axial_coords(frustum: &Frustum, p: &Point3) -> (f64, Vector3) {
        let axis = frustum.axis();
        let rel = p - frustum.p_min();
        let h = rel.dot(&axis);
        (h, rel - axis * h)
    }

    /// Kolmogorov-Smirnov statistic of `samples` against `cdf`.
    #[allow(clippy::cast_precision_loss)]
    fn ks_statistic(mut samples: Vec<f64>, cdf: impl Fn(f64) -> f64) -> f64 {
        samples.sort_by(f64::total_cmp);
        let n = samples.len() as f64;
        samples
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                let f = cdf(x);
                (f - i as f64 / n).abs().max(((i + 1) as f64 / n - f).abs())
            })
            .fold(0.0, f64::max)
    }

    #[test]
    fn produces_requested_count() {
        let s = sampler(1000);
        let f = Frustum::new(Point3::origin(), Point3::new(3.0, 4.0, 0.0), 1.0, 2.0).unwrap();
        assert_eq!(s.sample(&f).len(), 1000);
        assert_eq!(s.n_cap_samples(), 200);
    }

    #[test]
    fn caps_sit_on_end_discs() {
        let s = sampler(1000);
        let f = Frustum::new(
            Point3::new(1.0, 2.0, 3.0),
            Point3::new(4.0, -2.0, 15.0),
            2.5,
            3.5,
        )
        .unwrap();
        let axis = f.axis();
        let pts = s.sample(&f);
        for (i, sp) in pts.iter().take(s.n_cap_samples()).enumerate() {
            let (h, radial) = axial_coords(&f, &to_f64(&sp.position));
            let normal = sp.normal.cast::<f64>();
            if i < 100 {
                assert!(h.abs() < 1e-4);
                assert!(radial.norm() <= f.r_min() + 1e-4);
                assert_relative_eq!(normal, -axis, epsilon = 1e-6);
            } else {
                assert!((h - f.length()).abs() < 1e-4);
                assert!(radial.norm() <= f.r_max() + 1e-4);
                assert_relative_eq!(normal, axis, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn cylinder_heights_are_uniform() {
        let n = 10_000;
        let s = sampler(n);
        let f = Frustum::new(Point3::origin(), Point3::new(0.0, 10.0, 0.0), 2.0, 2.0).unwrap();
        let length = f.length();
        let heights: Vec<f64> = s
            .sample(&f)
            .iter()
            .skip(s.n_cap_samples())
            .map(|sp| axial_coords(&f, &to_f64(&sp.position)).0)
            .collect();
        let n_body = heights.len();
        let d = ks_statistic(heights, |h| (h / length).clamp(0.0, 1.0));
        assert!(d < 1.95 / (n_body as f64).sqrt(), "KS statistic {d}");
    }

    #[test]
    fn frustum_heights_follow_lateral_area() {
        let n = 10_000;
        let s = sampler(n);
        let f = Frustum::new(Point3::origin(), Point3::new(0.0, 0.0, 6.0), 1.0, 4.0).unwrap();
        let (h_min, h_max) = f.apex_heights().unwrap();
        let heights: Vec<f64> = s
            .sample(&f)
            .iter()
            .skip(s.n_cap_samples())
            .map(|sp| axial_coords(&f, &to_f64(&sp.position)).0)
            .collect();
        let n_body = heights.len();
        let d = ks_statistic(heights, |t| {
            let h = (h_min + t).clamp(h_min, h_max);
            (h * h - h_min * h_min) / (h_max * h_max - h_min * h_min)
        });
        assert!(d < 1.95 / (n_body as f64).sqrt(), "KS statistic {d}");
    }

    #[test]
    fn cylinder_normals_point_radially_outward() {
        let s = sampler(2000);
        let f = Frustum::new(
            Point3::new(-1.0, 0.5, 2.0),
            Point3::new(3.0, 1.0, -4.0),
            1.5,
            1.5,
        )
        .unwrap();
        for sp in s.sample(&f).iter().skip(s.n_cap_samples()) {
            let (_, radial) = axial_coords(&f, &to_f64(&sp.position));
            assert!((radial.norm() - 1.5).abs() < 1e-4);
            let dot = radial.normalize().dot(&sp.normal.cast::<f64>());
            assert!((dot - 1.0).abs() < 1e-5, "dot {dot}");
        }
    }

    #[test]
    fn cone_normals_are_outward_and_tilted() {
        let s = sampler(2000);
        let f = Frustum::new(Point3::origin(), Point3::new(2.0, 2.0, 1.0), 0.5, 2.0).unwrap();
        let (_, h_max) = f.apex_heights().unwrap();
        let norm = h_max.hypot(f.r_max());
        let axis = f.axis();
        for sp in s.sample(&f).iter().skip(s.n_cap_samples()) {
            let (h, radial) = axial_coords(&f, &to_f64(&sp.position));
            let expected_r = f.r_min() + (f.r_max() - f.r_min()) * h / f.length();
            assert!((radial.norm() - expected_r).abs() < 1e-4);
            let normal = sp.normal.cast::<f64>();
            assert!((normal.norm() - 1.0).abs() < 1e-5);
            assert!((radial.normalize().dot(&normal) - h_max / norm).abs() < 1e-5);
            assert!((axis.dot(&normal) + f.r_max() / norm).abs() < 1e-5);
        }
    }

    #[test]
    fn antiparallel_segment_is_sampled() {
        let s = sampler(500);
        let f = Frustum::new(Point3::new(0.0, 0.0, 5.0), Point3::origin(), 1.0, 1.0).unwrap();
        let pts = s.sample(&f);
        assert!(pts
            .iter()
            .all(|sp| sp.position.iter().all(|c| c.is_finite())));
        for sp in pts.iter().skip(s.n_cap_samples()) {
            let z = f64::from(sp.position.z);
            assert!((-1e-4..=5.0 + 1e-4).contains(&z));
        }
    }

    #[test]
    fn cached_values_are_validated() {
        assert!(ConeSurfaceSampler::from_cached(&[0.0, 1.0], &[0.5]).is_err());
        assert!(ConeSurfaceSampler::from_cached(&[0.0], &[1.5]).is_err());
        let s = ConeSurfaceSampler::from_cached(&[0.0; 10], &[0.25; 10]).unwrap();
        assert_eq!(s.n_samples(), 10);
        assert_eq!(s.n_cap_samples(), 2);
    }

    #[test]
    fn cached_sampler_is_reproducible() {
        let f = Frustum::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0), 1.0, 1.0).unwrap();
        let angles = [0.0, 1.0, 2.0, 3.0, 4.0];
        let uniforms = [0.1, 0.3, 0.5, 0.7, 0.9];
        let a = ConeSurfaceSampler::from_cached(&angles, &uniforms).unwrap();
        let b = ConeSurfaceSampler::from_cached(&angles, &uniforms).unwrap();
        assert_eq!(a.sample(&f), b.sample(&f));
    }
}
