//! Standard Normal CDF and pseudo-random Normal deviates.
//!
//! The CDF evaluates the convergent series
//!
//! ```text
//! Phi(x) = 1/2 + exp(-x²/2)/sqrt(2π) · (x + x³/3 + x⁵/(3·5) + x⁷/(3·5·7) + …)
//! ```
//!
//! iterated until the partial sum stops changing. Deviates come from the
//! Marsaglia polar method: two uniforms on (-1, 1) are rejected unless their
//! squared radius lies in (0, 1), and each accepted pair yields two draws,
//! one of which is cached for the next call.
//!
//! The generator owns the uniform stream (a `ChaCha8Rng`) and the one-slot
//! cache. Re-seeding means constructing a fresh generator, which also clears
//! the cache, so a fixed seed reproduces the draw sequence bit for bit.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::Result;
use crate::matrix::Matrix;
use crate::solve::{affine, cholesky};

/// Cumulative distribution function of the standard Normal.
///
/// Clamps to 0 or 1 beyond `|x| = 8`, where the tail mass is below the
/// resolution of `f64` anyway.
pub fn normal_cdf(x: f64) -> f64 {
    if x < -8.0 {
        return 0.0;
    }
    if x > 8.0 {
        return 1.0;
    }
    let mut sum = x;
    let mut term = x;
    let mut j = 1.0;
    loop {
        term *= x * x / (2.0 * j + 1.0);
        let next = sum + term;
        if next == sum {
            break;
        }
        sum = next;
        j += 1.0;
    }
    0.5 + sum * (-0.5 * x * x).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

/// Scalar and matrix Normal deviate generator.
#[derive(Debug, Clone)]
pub struct Gaussian {
    rng: ChaCha8Rng,
    spare: Option<f64>,
}

impl Gaussian {
    /// Deterministic generator seeded from an integer.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            spare: None,
        }
    }

    /// Generator seeded from the wall clock.
    pub fn from_clock() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Self::with_seed(nanos)
    }

    /// Draws one standard Normal deviate.
    ///
    /// Consumes the cached partner of the previous accepted pair before
    /// touching the uniform stream again.
    pub fn next_standard(&mut self) -> f64 {
        if let Some(z) = self.spare.take() {
            return z;
        }
        loop {
            let u: f64 = self.rng.gen_range(-1.0..1.0);
            let v: f64 = self.rng.gen_range(-1.0..1.0);
            let r = u * u + v * v;
            if r > 0.0 && r < 1.0 {
                let p = (-2.0 * r.ln() / r).sqrt();
                self.spare = Some(p * u);
                return p * v;
            }
        }
    }

    /// Fills a `rows x cols` matrix with independent standard Normal draws.
    pub fn standard_matrix(&mut self, rows: usize, cols: usize) -> Matrix {
        let mut out = Matrix::zeros(rows, cols);
        for r in 0..rows {
            for c in 0..cols {
                out[(r, c)] = self.next_standard();
            }
        }
        out
    }

    /// Draws `count` independent rows from `N(mu, sigma)`.
    ///
    /// `mu` is a `1 x n` row, `sigma` an SPD `n x n` covariance, and `count`
    /// must be positive. With `sigma = L·L'`, the draws are
    /// `X = Z·L' + 1·mu` for `Z` of independent standard Normals, so a
    /// non-positive-definite covariance fails with `NotSpd`.
    pub fn multivariate(&mut self, mu: &Matrix, sigma: &Matrix, count: usize) -> Result<Matrix> {
        assert!(count > 0, "draw count must be positive");
        assert_eq!(mu.rows(), 1, "mu must be a row vector");
        assert_eq!(sigma.rows(), sigma.cols(), "sigma must be square");
        assert_eq!(
            mu.cols(),
            sigma.rows(),
            "mu and sigma dimensions must agree"
        );
        let u = cholesky(sigma)?.transpose();
        let z = self.standard_matrix(count, mu.cols());
        Ok(affine(&z, &u, mu))
    }
}
