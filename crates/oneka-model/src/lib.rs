//! Plain value bundles exchanged with the Oneka inference engine.

use serde::{Deserialize, Serialize};

/// Number of coefficients in the quadratic discharge-potential model.
pub const COEF_COUNT: usize = 6;

/// Aquifer description, observations, and run controls for one inference.
///
/// Wells carry known discharges; piezometers carry Normally distributed head
/// observations (mean `piez_head`, standard deviation `piez_std`). All
/// coordinates share one Cartesian frame with the model origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnekaInput {
    /// Hydraulic conductivity (positive).
    pub conductivity: f64,
    /// Aquifer thickness (positive).
    pub thickness: f64,
    /// Aquifer base elevation.
    pub base: f64,
    pub well_x: Vec<f64>,
    pub well_y: Vec<f64>,
    /// Well discharges, one per well.
    pub well_q: Vec<f64>,
    pub piez_x: Vec<f64>,
    pub piez_y: Vec<f64>,
    /// Expected heads, one per piezometer.
    pub piez_head: Vec<f64>,
    /// Head standard deviations, one per piezometer (strictly positive).
    pub piez_std: Vec<f64>,
    /// Model origin for the quadratic terms.
    pub origin_x: f64,
    pub origin_y: f64,
    /// Number of posterior realizations to draw.
    pub n_sims: usize,
}

impl OnekaInput {
    pub fn n_wells(&self) -> usize {
        self.well_x.len()
    }

    pub fn n_piezometers(&self) -> usize {
        self.piez_x.len()
    }

    /// Reports the first structural defect in the bundle, if any.
    ///
    /// Host code runs this before handing the bundle to the engine; the
    /// engine itself treats these defects as contract violations.
    pub fn validate(&self) -> Result<(), String> {
        if self.well_y.len() != self.n_wells() || self.well_q.len() != self.n_wells() {
            return Err(format!(
                "well arrays disagree in length: x={}, y={}, q={}",
                self.well_x.len(),
                self.well_y.len(),
                self.well_q.len()
            ));
        }
        let p = self.n_piezometers();
        if self.piez_y.len() != p || self.piez_head.len() != p || self.piez_std.len() != p {
            return Err(format!(
                "piezometer arrays disagree in length: x={}, y={}, head={}, std={}",
                self.piez_x.len(),
                self.piez_y.len(),
                self.piez_head.len(),
                self.piez_std.len()
            ));
        }
        if p < COEF_COUNT {
            return Err(format!(
                "at least {COEF_COUNT} piezometers are required to fit {COEF_COUNT} coefficients, got {p}"
            ));
        }
        if !(self.conductivity > 0.0) {
            return Err(format!(
                "hydraulic conductivity must be positive, got {}",
                self.conductivity
            ));
        }
        if !(self.thickness > 0.0) {
            return Err(format!(
                "aquifer thickness must be positive, got {}",
                self.thickness
            ));
        }
        for (i, s) in self.piez_std.iter().enumerate() {
            if !(*s > 0.0) {
                return Err(format!(
                    "piezometer {i} has non-positive head standard deviation {s}"
                ));
            }
        }
        Ok(())
    }
}

/// Posterior summary and realizations produced by one engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnekaOutput {
    /// Engine crate version.
    pub version: String,
    /// RFC 3339 UTC stamp taken when the run completed.
    pub run_stamp: String,
    /// Posterior means of the coefficients `(A, B, C, D, E, F)`.
    pub mu: Vec<f64>,
    /// Posterior 6 x 6 covariance, row by row.
    pub cov: Vec<Vec<f64>>,
    pub n_sims: usize,
    /// `n_sims` rows of 6 simulated coefficients each.
    pub realizations: Vec<Vec<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> OnekaInput {
        OnekaInput {
            conductivity: 1.0,
            thickness: 50.0,
            base: 0.0,
            well_x: vec![0.0],
            well_y: vec![0.0],
            well_q: vec![30.0],
            piez_x: vec![100.0, -100.0, 0.0, 0.0, 100.0, -100.0],
            piez_y: vec![0.0, 0.0, 100.0, -100.0, 100.0, -100.0],
            piez_head: vec![45.0, 45.0, 46.0, 46.0, 44.0, 44.0],
            piez_std: vec![1.0; 6],
            origin_x: 0.0,
            origin_y: 0.0,
            n_sims: 10,
        }
    }

    #[test]
    fn valid_bundle_passes() {
        assert_eq!(sample_input().validate(), Ok(()));
    }

    #[test]
    fn rejects_short_piezometer_set() {
        let mut input = sample_input();
        for v in [
            &mut input.piez_x,
            &mut input.piez_y,
            &mut input.piez_head,
            &mut input.piez_std,
        ] {
            v.truncate(5);
        }
        let err = input.validate().unwrap_err();
        assert!(err.contains("at least 6"));
    }

    #[test]
    fn rejects_ragged_well_arrays() {
        let mut input = sample_input();
        input.well_q.push(5.0);
        assert!(input.validate().unwrap_err().contains("well arrays"));
    }

    #[test]
    fn rejects_non_positive_sigma() {
        let mut input = sample_input();
        input.piez_std[3] = 0.0;
        assert!(input.validate().unwrap_err().contains("piezometer 3"));
    }

    #[test]
    fn rejects_non_positive_conductivity() {
        let mut input = sample_input();
        input.conductivity = -2.0;
        assert!(input.validate().unwrap_err().contains("conductivity"));
    }

    #[test]
    fn bundle_round_trips_through_json() {
        let input = sample_input();
        let text = serde_json::to_string(&input).expect("serialize");
        let back: OnekaInput = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(back, input);
    }
}
