//! Oneka regression assembly and posterior inference.
//!
//! The discharge-potential field is the six-term quadratic
//!
//! ```text
//! Phi(x, y) = A·dx² + B·dy² + C·dx·dy + D·dx + E·dy + F
//! ```
//!
//! with `dx = x - Xo`, `dy = y - Yo`. Each piezometer contributes one row of
//! a weighted regression for the coefficients `(A, B, C, D, E, F)`:
//!
//! 1. The observed head `E[p]`, relative to the aquifer base, maps to a
//!    discharge-potential mean and standard deviation by Girinskii's rule:
//!    unconfined (`h < H`) gives `mu = k·(h² + S²)/2`, `sigma = k·h·S`;
//!    confined (`h >= H`) gives `mu = k·H·(h - H/2)`, `sigma = k·H·S`.
//! 2. The known wells contribute `sum Q/(4π)·ln((x-xw)² + (y-yw)²)`, which
//!    is subtracted from the observation.
//! 3. Row `p` of the design matrix and response is divided by `sigma`, so
//!    tighter observations weigh more.
//!
//! The posterior over the coefficients is Normal with covariance
//! `(A'A)^-1` and mean the least-squares solution; realizations are rows of
//! the multivariate generator. A rank-deficient system (fewer than six
//! usable piezometers, or collinear geometry) surfaces as
//! [`EngineError::Singular`].

use chrono::Utc;

use oneka_model::{COEF_COUNT, OnekaInput, OnekaOutput};

use crate::error::EngineError;
use crate::gaussian::Gaussian;
use crate::matrix::Matrix;
use crate::solve::{least_squares, spd_inverse};

const FOUR_PI: f64 = 4.0 * std::f64::consts::PI;

/// Discharge-potential mean and standard deviation for one observed head.
fn head_to_potential(k: f64, thickness: f64, head: f64, sigma_head: f64) -> (f64, f64) {
    if head < thickness {
        // Unconfined: Phi = k·h²/2, with the observation variance folded in.
        (
            0.5 * k * (head * head + sigma_head * sigma_head),
            k * head * sigma_head,
        )
    } else {
        // Confined: Phi = k·H·(h - H/2).
        (
            k * thickness * (head - 0.5 * thickness),
            k * thickness * sigma_head,
        )
    }
}

/// Combined well potential at `(x, y)`.
fn well_potential(input: &OnekaInput, x: f64, y: f64) -> f64 {
    let mut phi = 0.0;
    for w in 0..input.n_wells() {
        let dx = x - input.well_x[w];
        let dy = y - input.well_y[w];
        phi += input.well_q[w] / FOUR_PI * (dx * dx + dy * dy).ln();
    }
    phi
}

/// Builds the weighted design matrix (`P x 6`) and response (`P x 1`).
pub fn assemble_system(input: &OnekaInput) -> (Matrix, Matrix) {
    check_contract(input);
    let p_count = input.n_piezometers();
    let mut a = Matrix::zeros(p_count, COEF_COUNT);
    let mut b = Matrix::zeros(p_count, 1);
    for p in 0..p_count {
        let head = input.piez_head[p] - input.base;
        let (mu_phi, sigma_phi) = head_to_potential(
            input.conductivity,
            input.thickness,
            head,
            input.piez_std[p],
        );
        let phi_wells = well_potential(input, input.piez_x[p], input.piez_y[p]);
        let dx = input.piez_x[p] - input.origin_x;
        let dy = input.piez_y[p] - input.origin_y;
        a[(p, 0)] = dx * dx / sigma_phi;
        a[(p, 1)] = dy * dy / sigma_phi;
        a[(p, 2)] = dx * dy / sigma_phi;
        a[(p, 3)] = dx / sigma_phi;
        a[(p, 4)] = dy / sigma_phi;
        a[(p, 5)] = 1.0 / sigma_phi;
        b[(p, 0)] = (mu_phi - phi_wells) / sigma_phi;
    }
    (a, b)
}

/// Runs the full inference: posterior mean, posterior covariance, and
/// `n_sims` equiprobable coefficient realizations.
pub fn run(input: &OnekaInput, sampler: &mut Gaussian) -> Result<OnekaOutput, EngineError> {
    let (a, b) = assemble_system(input);

    let cov = spd_inverse(&a.tr_mul(&a))?;
    let mu = least_squares(&a, &b)?;

    let realizations = if input.n_sims == 0 {
        Vec::new()
    } else {
        sampler
            .multivariate(&mu.transpose(), &cov, input.n_sims)?
            .to_rows()
    };

    Ok(OnekaOutput {
        version: env!("CARGO_PKG_VERSION").to_string(),
        run_stamp: Utc::now().to_rfc3339(),
        mu: mu.as_slice().to_vec(),
        cov: cov.to_rows(),
        n_sims: input.n_sims,
        realizations,
    })
}

fn check_contract(input: &OnekaInput) {
    assert!(
        input.conductivity > 0.0,
        "hydraulic conductivity must be positive"
    );
    assert!(input.thickness > 0.0, "aquifer thickness must be positive");
    assert_eq!(
        input.well_x.len(),
        input.well_y.len(),
        "well arrays must agree in length"
    );
    assert_eq!(
        input.well_x.len(),
        input.well_q.len(),
        "well arrays must agree in length"
    );
    let p = input.n_piezometers();
    assert!(p > 0, "at least one piezometer is required");
    assert_eq!(
        input.piez_y.len(),
        p,
        "piezometer arrays must agree in length"
    );
    assert_eq!(
        input.piez_head.len(),
        p,
        "piezometer arrays must agree in length"
    );
    assert_eq!(
        input.piez_std.len(),
        p,
        "piezometer arrays must agree in length"
    );
    assert!(
        input.piez_std.iter().all(|s| *s > 0.0),
        "head standard deviations must be positive"
    );
}
