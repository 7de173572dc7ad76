//! Random Fourier and triangle-wave features for flat real vectors.
//!
//! Model
//! - A fixed projection `W ∈ R^{dim_in × dim_out/2}` with `N(0, σ²)` entries.
//! - For `x` of shape `(*batch, dim_in)`, phases `z = x·W` (in cycles) map to
//!   `[c(z), s(z)]` along the last axis, so `dim_out` must be even.
//! - Fourier: `c(z) = cos(2πz)`, `s(z) = sin(2πz)`.
//! - Triangle: unit-period piecewise-linear analogues, `s(z) = c(z − 1/4)`.
//!
//! The triangle wave comes with an explicit slope table (`triangle_wave_slope`)
//! for callers that differentiate through it.

use ndarray::{Array2, ArrayD, ArrayViewD, Axis, IxDyn};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::cfg::validate_sigma;
use crate::error::EmbedError;

/// Unit-period triangle wave: `1` at integers, `−1` at half-integers, linear between.
#[inline]
pub fn triangle_wave(u: f64) -> f64 {
    let frac = u - u.floor();
    if frac < 0.5 {
        1.0 - 4.0 * frac
    } else {
        4.0 * frac - 3.0
    }
}

/// Derivative of `triangle_wave`: `−4` on `[k, k + 1/2)`, `+4` on `[k + 1/2, k + 1)`.
///
/// At the kinks the right-hand slope is returned.
#[inline]
pub fn triangle_wave_slope(u: f64) -> f64 {
    let frac = u - u.floor();
    if frac < 0.5 {
        -4.0
    } else {
        4.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Wave {
    Sinusoid,
    Triangle,
}

impl Wave {
    #[inline]
    fn pair(self, z: f64) -> (f64, f64) {
        match self {
            Wave::Sinusoid => {
                let (s, c) = (std::f64::consts::TAU * z).sin_cos();
                (c, s)
            }
            Wave::Triangle => (triangle_wave(z), triangle_wave(z - 0.25)),
        }
    }
}

#[derive(Clone, Debug)]
struct Projection {
    w: Array2<f64>,
    sigma: f64,
}

impl Projection {
    fn draw<R: Rng>(
        dim_in: usize,
        dim_out: usize,
        sigma: f64,
        rng: &mut R,
    ) -> Result<Self, EmbedError> {
        if dim_in == 0 {
            return Err(EmbedError::invalid("dim_in must be > 0"));
        }
        if dim_out == 0 || dim_out % 2 != 0 {
            return Err(EmbedError::invalid(format!(
                "dim_out must be even and > 0, got {dim_out}"
            )));
        }
        validate_sigma(sigma)?;
        let w = Array2::from_shape_simple_fn((dim_in, dim_out / 2), || {
            let z: f64 = rng.sample(StandardNormal);
            sigma * z
        });
        Ok(Self { w, sigma })
    }

    fn embed(&self, x: ArrayViewD<'_, f64>, wave: Wave) -> Result<ArrayD<f64>, EmbedError> {
        let dim_in = self.w.nrows();
        let half = self.w.ncols();
        match x.shape().last() {
            Some(&d) if d == dim_in => {}
            _ => {
                return Err(EmbedError::shape(format!(
                    "input must be (*batch, {dim_in}), got {:?}",
                    x.shape()
                )))
            }
        }
        let last = Axis(x.ndim() - 1);
        let mut out = Vec::with_capacity(x.len() / dim_in * 2 * half);
        for row in x.lanes(last) {
            let base = out.len();
            out.resize(base + 2 * half, 0.0);
            for k in 0..half {
                let z: f64 = row.iter().zip(self.w.column(k)).map(|(a, b)| a * b).sum();
                let (c, s) = wave.pair(z);
                out[base + k] = c;
                out[base + half + k] = s;
            }
        }
        let mut shape = x.shape().to_vec();
        if let Some(d) = shape.last_mut() {
            *d = 2 * half;
        }
        ArrayD::from_shape_vec(IxDyn(&shape), out).map_err(|e| EmbedError::shape(e.to_string()))
    }
}

/// Random Fourier features `[cos(2π x·W), sin(2π x·W)]`.
#[derive(Clone, Debug)]
pub struct RandomFourierFeatures {
    proj: Projection,
}

impl RandomFourierFeatures {
    pub fn new(dim_in: usize, dim_out: usize, sigma: f64) -> Result<Self, EmbedError> {
        Self::with_rng(dim_in, dim_out, sigma, &mut rand::thread_rng())
    }

    pub fn with_rng<R: Rng>(
        dim_in: usize,
        dim_out: usize,
        sigma: f64,
        rng: &mut R,
    ) -> Result<Self, EmbedError> {
        let proj = Projection::draw(dim_in, dim_out, sigma, rng)?;
        tracing::debug!(dim_in, dim_out, sigma, "drew random Fourier projection");
        Ok(Self { proj })
    }

    #[inline]
    pub fn dim_in(&self) -> usize {
        self.proj.w.nrows()
    }

    #[inline]
    pub fn dim_out(&self) -> usize {
        2 * self.proj.w.ncols()
    }

    #[inline]
    pub fn sigma(&self) -> f64 {
        self.proj.sigma
    }

    /// `(*batch, dim_in)` → `(*batch, dim_out)`.
    pub fn embed(&self, x: ArrayViewD<'_, f64>) -> Result<ArrayD<f64>, EmbedError> {
        self.proj.embed(x, Wave::Sinusoid)
    }
}

/// Triangle-wave counterpart of `RandomFourierFeatures`.
#[derive(Clone, Debug)]
pub struct RandomTriangleFeatures {
    proj: Projection,
}

impl RandomTriangleFeatures {
    pub fn new(dim_in: usize, dim_out: usize, sigma: f64) -> Result<Self, EmbedError> {
        Self::with_rng(dim_in, dim_out, sigma, &mut rand::thread_rng())
    }

    pub fn with_rng<R: Rng>(
        dim_in: usize,
        dim_out: usize,
        sigma: f64,
        rng: &mut R,
    ) -> Result<Self, EmbedError> {
        let proj = Projection::draw(dim_in, dim_out, sigma, rng)?;
        tracing::debug!(dim_in, dim_out, sigma, "drew random triangle projection");
        Ok(Self { proj })
    }

    #[inline]
    pub fn dim_in(&self) -> usize {
        self.proj.w.nrows()
    }

    #[inline]
    pub fn dim_out(&self) -> usize {
        2 * self.proj.w.ncols()
    }

    #[inline]
    pub fn sigma(&self) -> f64 {
        self.proj.sigma
    }

    /// `(*batch, dim_in)` → `(*batch, dim_out)`; values lie in `[−1, 1]`.
    pub fn embed(&self, x: ArrayViewD<'_, f64>) -> Result<ArrayD<f64>, EmbedError> {
        self.proj.embed(x, Wave::Triangle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, ArrayD};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn inputs(shape: &[usize], seed: u64) -> ArrayD<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        Array::from_shape_simple_fn(IxDyn(shape), || rng.gen_range(-1.0..1.0))
    }

    #[test]
    fn triangle_wave_table() {
        let cases = [(0.0, 1.0), (0.25, 0.0), (0.5, -1.0), (0.75, 0.0), (1.0, 1.0), (-0.25, 0.0)];
        for (u, v) in cases {
            assert!((triangle_wave(u) - v).abs() < 1e-12, "u={u}");
        }
        assert_eq!(triangle_wave_slope(0.1), -4.0);
        assert_eq!(triangle_wave_slope(0.6), 4.0);
        assert_eq!(triangle_wave_slope(-0.1), 4.0);
    }

    #[test]
    fn triangle_slope_matches_finite_differences() {
        let h = 1e-7;
        for k in 0..40 {
            // Stay away from the kinks at multiples of 1/2.
            let u = -2.0 + 0.1 * k as f64 + 0.013;
            let fd = (triangle_wave(u + h) - triangle_wave(u - h)) / (2.0 * h);
            assert!((fd - triangle_wave_slope(u)).abs() < 1e-5, "u={u}");
        }
    }

    #[test]
    fn fourier_shapes_and_unit_circle() {
        let mut rng = StdRng::seed_from_u64(1);
        let rff = RandomFourierFeatures::with_rng(3, 8, 1.0, &mut rng).unwrap();
        assert_eq!((rff.dim_in(), rff.dim_out()), (3, 8));
        let x = inputs(&[4, 2, 3], 2);
        let y = rff.embed(x.view()).unwrap();
        assert_eq!(y.shape(), &[4, 2, 8]);
        // cos² + sin² = 1 for every projected direction.
        for row in y.lanes(Axis(2)) {
            let row: Vec<f64> = row.iter().copied().collect();
            for k in 0..4 {
                assert!((row[k] * row[k] + row[k + 4] * row[k + 4] - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn fourier_matches_direct_formula() {
        let mut rng = StdRng::seed_from_u64(3);
        let rff = RandomFourierFeatures::with_rng(2, 4, 0.5, &mut rng).unwrap();
        let x = inputs(&[2], 4);
        let y = rff.embed(x.view()).unwrap();
        let w = &rff.proj.w;
        for k in 0..2 {
            let z = x[[0]] * w[[0, k]] + x[[1]] * w[[1, k]];
            assert!((y[[k]] - (std::f64::consts::TAU * z).cos()).abs() < 1e-12);
            assert!((y[[k + 2]] - (std::f64::consts::TAU * z).sin()).abs() < 1e-12);
        }
    }

    #[test]
    fn triangle_features_are_bounded() {
        let mut rng = StdRng::seed_from_u64(5);
        let tri = RandomTriangleFeatures::with_rng(5, 6, 2.0, &mut rng).unwrap();
        let y = tri.embed(inputs(&[7, 5], 6).view()).unwrap();
        assert_eq!(y.shape(), &[7, 6]);
        assert!(y.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn rejects_bad_construction_and_inputs() {
        assert!(matches!(
            RandomFourierFeatures::new(3, 7, 1.0),
            Err(EmbedError::InvalidArgument { .. })
        ));
        assert!(matches!(
            RandomTriangleFeatures::new(0, 4, 1.0),
            Err(EmbedError::InvalidArgument { .. })
        ));
        assert!(matches!(
            RandomFourierFeatures::new(3, 4, 0.0),
            Err(EmbedError::InvalidArgument { .. })
        ));
        let rff = RandomFourierFeatures::new(3, 4, 1.0).unwrap();
        assert!(matches!(
            rff.embed(inputs(&[2, 4], 1).view()),
            Err(EmbedError::ShapeError { .. })
        ));
    }
}
