//! End-to-end engine runs on a synthetic aquifer.
//!
//! The heads are generated from known coefficients by evaluating the
//! quadratic discharge-potential field plus the well term at each
//! piezometer and inverting Girinskii's potential back to a head:
//!
//! ```text
//! Phi < k·H²/2   (unconfined)   h = sqrt(2·Phi/k)
//! Phi >= k·H²/2  (confined)     h = Phi/(k·H) + H/2
//! ```
//!
//! With tight head standard deviations the posterior mean must reproduce
//! the planted coefficients, and the whole run must be reproducible under
//! a fixed seed.

use oneka_engine::{EngineError, Gaussian};
use oneka_model::OnekaInput;

const TRUE_COEF: [f64; 6] = [-0.01, -0.01, 0.001, -2.0, 1.0, 1300.0];
const FOUR_PI: f64 = 4.0 * std::f64::consts::PI;

/// Eight piezometers on the +/-100 square around the origin.
const PIEZ_XY: [(f64, f64); 8] = [
    (100.0, 0.0),
    (-100.0, 0.0),
    (0.0, 100.0),
    (0.0, -100.0),
    (100.0, 100.0),
    (-100.0, 100.0),
    (100.0, -100.0),
    (-100.0, -100.0),
];

fn synthetic_input(sigma: f64, n_sims: usize) -> OnekaInput {
    let conductivity = 1.0;
    let thickness = 50.0;
    let base = 0.0;
    let (well_x, well_y, well_q) = (0.0, 0.0, 30.0);

    let mut piez_x = Vec::new();
    let mut piez_y = Vec::new();
    let mut piez_head = Vec::new();
    for (x, y) in PIEZ_XY {
        let [a, b, c, d, e, f] = TRUE_COEF;
        let model = a * x * x + b * y * y + c * x * y + d * x + e * y + f;
        let r2 = (x - well_x) * (x - well_x) + (y - well_y) * (y - well_y);
        let phi = model + well_q / FOUR_PI * r2.ln();

        let head = if phi < 0.5 * conductivity * thickness * thickness {
            (2.0 * phi / conductivity).sqrt()
        } else {
            phi / (conductivity * thickness) + 0.5 * thickness
        };
        piez_x.push(x);
        piez_y.push(y);
        piez_head.push(head + base);
    }

    OnekaInput {
        conductivity,
        thickness,
        base,
        well_x: vec![well_x],
        well_y: vec![well_y],
        well_q: vec![well_q],
        piez_x,
        piez_y,
        piez_head,
        piez_std: vec![sigma; 8],
        origin_x: 0.0,
        origin_y: 0.0,
        n_sims,
    }
}

#[test]
fn test_posterior_mean_recovers_planted_coefficients() {
    let input = synthetic_input(0.01, 0);
    let output = oneka_engine::run(&input, &mut Gaussian::with_seed(1)).expect("well posed");

    // The synthetic system is consistent up to the k·S²/2 folding on the
    // unconfined rows, so the fit lands on the planted coefficients.
    let tolerances = [1e-4, 1e-4, 1e-4, 1e-2, 1e-2, 1.0];
    for i in 0..6 {
        let error = (output.mu[i] - TRUE_COEF[i]).abs();
        assert!(
            error < tolerances[i],
            "coefficient {i}: got {}, planted {}, error {error}",
            output.mu[i],
            TRUE_COEF[i]
        );
    }
}

#[test]
fn test_posterior_covariance_is_symmetric_with_positive_variances() {
    let input = synthetic_input(1.0, 0);
    let output = oneka_engine::run(&input, &mut Gaussian::with_seed(1)).expect("well posed");

    for i in 0..6 {
        assert!(output.cov[i][i] > 0.0, "variance {i} not positive");
        for j in 0..6 {
            let skew = (output.cov[i][j] - output.cov[j][i]).abs();
            assert!(skew < 1e-12, "covariance not symmetric at ({i}, {j})");
        }
    }
}

#[test]
fn test_fixed_seed_reproduces_realizations() {
    let input = synthetic_input(1.0, 50);
    let first = oneka_engine::run(&input, &mut Gaussian::with_seed(99)).expect("well posed");
    let second = oneka_engine::run(&input, &mut Gaussian::with_seed(99)).expect("well posed");

    assert_eq!(first.mu, second.mu);
    assert_eq!(first.cov, second.cov);
    assert_eq!(first.realizations, second.realizations);
    assert_eq!(first.realizations.len(), 50);
    assert!(first.realizations.iter().all(|row| row.len() == 6));
}

#[test]
fn test_zero_simulations_yield_no_realizations() {
    let input = synthetic_input(1.0, 0);
    let output = oneka_engine::run(&input, &mut Gaussian::with_seed(3)).expect("well posed");
    assert_eq!(output.n_sims, 0);
    assert!(output.realizations.is_empty());
}

#[test]
fn test_realization_spread_matches_posterior_scale() {
    // Marginal spread of many realizations should sit near the posterior
    // standard deviation for every coefficient (loose 3-sigma-ish band).
    let input = synthetic_input(1.0, 4000);
    let output = oneka_engine::run(&input, &mut Gaussian::with_seed(12345)).expect("well posed");

    for c in 0..6 {
        let n = output.realizations.len() as f64;
        let mean: f64 = output.realizations.iter().map(|row| row[c]).sum::<f64>() / n;
        let var: f64 = output
            .realizations
            .iter()
            .map(|row| (row[c] - mean) * (row[c] - mean))
            .sum::<f64>()
            / (n - 1.0);
        let ratio = var / output.cov[c][c];
        assert!(
            (0.9..1.1).contains(&ratio),
            "coefficient {c}: sample/posterior variance ratio {ratio}"
        );
    }
}

#[test]
fn test_piezometers_on_a_line_are_singular() {
    // Every piezometer at x = Xo kills the dx-dependent columns outright.
    let mut input = synthetic_input(1.0, 0);
    for x in &mut input.piez_x {
        *x = 0.0;
    }
    let result = oneka_engine::run(&input, &mut Gaussian::with_seed(1));
    assert_eq!(result.unwrap_err(), EngineError::Singular);
}
