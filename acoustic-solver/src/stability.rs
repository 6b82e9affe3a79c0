//! Von Neumann stability limits.
//!
//! For a plane wave `e^{iθk}` the staggered spatial operator has a symbol
//! bounded by `2·Σ|b_k|`. The time integrators are written in terms of the
//! shift `z = e^{-iθ}`, and the largest real part of
//!
//! ```text
//! -i·(z^{a} - z^{a-1}) / (2·Σ|b_k| · P(z))
//! ```
//!
//! over all sampled `θ` is the largest stable Courant number. `P` is the
//! polynomial of integrator weights (`1` for leapfrog).

use std::f64::consts::TAU;

use num::Complex;

use crate::{
    Error,
    fd::scheme::TimeIntegrator,
    stencil::StencilCoefficients,
};

#[derive(Clone, Copy, Debug)]
pub struct StabilityAnalyzer {
    /// Sampling step in `[0, 2π)`.
    pub theta_step: f64,
}

impl Default for StabilityAnalyzer {
    fn default() -> Self {
        Self { theta_step: 0.01 }
    }
}

impl StabilityAnalyzer {
    pub fn max_courant(
        &self,
        spatial_order: usize,
        integrator: TimeIntegrator,
    ) -> Result<f64, Error> {
        let coefficients = StencilCoefficients::compute(spatial_order)?;
        Ok(self.max_courant_for_weights(coefficients.abs_sum(), integrator))
    }

    /// Stability limit for a stencil whose absolute weights sum to
    /// `abs_weight_sum`.
    pub fn max_courant_for_weights(&self, abs_weight_sum: f64, integrator: TimeIntegrator) -> f64 {
        let (leading, trailing) = phase_exponents(integrator);
        let weights = integrator.weights();

        let mut max_courant = f64::NEG_INFINITY;
        let mut i = 0;
        loop {
            let theta = i as f64 * self.theta_step;
            if theta >= TAU {
                break;
            }
            i += 1;

            let z = Complex::from_polar(1.0, -theta);

            let numerator = -Complex::<f64>::i() * (z.powf(leading) - z.powf(trailing));

            // Σ w_j z^{n-1-j}, newest weight on the highest power
            let n = weights.len();
            let polynomial: Complex<f64> = weights
                .iter()
                .enumerate()
                .map(|(j, w)| z.powi((n - 1 - j) as i32) * *w)
                .sum();

            let ratio = numerator / (polynomial * (2.0 * abs_weight_sum));
            if ratio.re.is_finite() {
                max_courant = max_courant.max(ratio.re);
            }
        }

        max_courant
    }

    pub fn report(
        &self,
        spatial_order: usize,
        integrator: TimeIntegrator,
    ) -> Result<StabilityReport, Error> {
        let max_courant = self.max_courant(spatial_order, integrator)?;
        Ok(StabilityReport {
            spatial_order,
            integrator,
            max_courant,
        })
    }
}

fn phase_exponents(integrator: TimeIntegrator) -> (f64, f64) {
    match integrator {
        TimeIntegrator::Leapfrog2 | TimeIntegrator::AdamsBashforth3 => (2.5, 1.5),
        TimeIntegrator::AdamsBashforth4 => (3.5, 2.5),
    }
}

/// Advisory stability limit for a pair of spatial order and time
/// integrator.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StabilityReport {
    pub spatial_order: usize,
    pub integrator: TimeIntegrator,
    pub max_courant: f64,
}

impl StabilityReport {
    pub fn is_stable(&self, courant_number: f64) -> bool {
        courant_number <= self.max_courant
    }

    pub fn check(&self, courant_number: f64) -> Result<(), Error> {
        if self.is_stable(courant_number) {
            Ok(())
        }
        else {
            Err(Error::StabilityViolation {
                spatial_order: self.spatial_order,
                integrator: self.integrator,
                courant_number,
                max_courant: self.max_courant,
            })
        }
    }
}
