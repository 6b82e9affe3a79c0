//! Staggered-grid finite-difference weights.
//!
//! A first derivative of order `N` on a staggered grid is approximated as
//!
//! ```text
//! f'(x) ≈ 1/Δx · Σ_{k=1}^{N/2} b_k · (f(x + (2k-1)Δx/2) - f(x - (2k-1)Δx/2))
//! ```
//!
//! The weights `b_k` follow from matching the Taylor expansion: the first odd
//! moment has to be one and the higher odd moments have to vanish. See
//! Dablain (1986), "The application of high-order differencing to the scalar
//! wave equation".

use nalgebra::{
    DMatrix,
    DVector,
};

use crate::Error;

/// Weights for the second-order accurate staggered third derivative.
///
/// Applied like the first derivative weights, but scaled by `1/Δx³`.
pub const THIRD_DERIVATIVE_WEIGHTS: [f64; 2] = [-3.0, 1.0];

/// Weights `b_1..b_{N/2}` of a centered staggered first derivative of even
/// order `N`.
#[derive(Clone, Debug, PartialEq)]
pub struct StencilCoefficients {
    order: usize,
    weights: Vec<f64>,
}

impl StencilCoefficients {
    /// Solves the moment conditions for the weights of the given spatial
    /// order.
    ///
    /// Fails with [`Error::InvalidOrder`] if `order` is odd or smaller than 4.
    pub fn compute(order: usize) -> Result<Self, Error> {
        if order % 2 != 0 || order < 4 {
            return Err(Error::InvalidOrder { order });
        }

        let n = order / 2;

        // row 0: Σ b_k (2k-1) = 1
        // row j: Σ b_k (2k-1)^(2j+1) = 0
        let matrix = DMatrix::from_fn(n, n, |row, column| {
            let odd = (2 * column + 1) as f64;
            odd.powi(2 * row as i32 + 1)
        });
        let rhs = DVector::from_fn(n, |row, _| if row == 0 { 1.0 } else { 0.0 });

        let lu = matrix.clone().lu();
        let mut weights = lu
            .solve(&rhs)
            .ok_or(Error::SingularStencil { order })?;

        // one step of iterative refinement. the high moments have large
        // entries, so the plain solve loses a few digits.
        let residual = &rhs - &matrix * &weights;
        let correction = lu
            .solve(&residual)
            .ok_or(Error::SingularStencil { order })?;
        weights += correction;

        Ok(Self {
            order,
            weights: weights.iter().copied().collect(),
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of cells the stencil reaches to either side.
    pub fn half_width(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// `Σ |b_k|`, which enters the stability analysis.
    pub fn abs_sum(&self) -> f64 {
        self.weights.iter().map(|b| b.abs()).sum()
    }

    /// Undivided difference at `k + 1/2`, given samples `f(m) = f[k + m]`.
    pub fn forward(&self, f: impl Fn(isize) -> f64) -> f64 {
        forward_difference(&self.weights, f)
    }

    /// Undivided difference at `k - 1/2`, given samples `f(m) = f[k + m]`.
    pub fn backward(&self, f: impl Fn(isize) -> f64) -> f64 {
        backward_difference(&self.weights, f)
    }
}

pub fn forward_difference(weights: &[f64], f: impl Fn(isize) -> f64) -> f64 {
    weights
        .iter()
        .zip(1isize..)
        .map(|(b, m)| b * (f(m) - f(1 - m)))
        .sum()
}

pub fn backward_difference(weights: &[f64], f: impl Fn(isize) -> f64) -> f64 {
    weights
        .iter()
        .zip(1isize..)
        .map(|(b, m)| b * (f(m - 1) - f(-m)))
        .sum()
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        stencil::{
            StencilCoefficients,
            THIRD_DERIVATIVE_WEIGHTS,
            forward_difference,
        },
    };

    fn moment(weights: &[f64], power: i32) -> f64 {
        weights
            .iter()
            .enumerate()
            .map(|(k, b)| b * ((2 * k + 1) as f64).powi(power))
            .sum()
    }

    #[test]
    fn it_satisfies_the_moment_conditions() {
        for order in [4, 6, 8, 10] {
            let coefficients = StencilCoefficients::compute(order).unwrap();
            let weights = coefficients.weights();
            assert_eq!(weights.len(), order / 2);
            assert!((moment(weights, 1) - 1.0).abs() < 1e-10, "order {order}");
            for j in 2..=order / 2 {
                let m = moment(weights, 2 * j as i32 - 1);
                assert!(m.abs() < 1e-10, "order {order}, j = {j}: {m}");
            }
        }
    }

    #[test]
    fn it_computes_fourth_order_weights() {
        let coefficients = StencilCoefficients::compute(4).unwrap();
        let expected = [9.0 / 8.0, -1.0 / 24.0];
        for (b, e) in coefficients.weights().iter().zip(expected) {
            assert!((b - e).abs() < 1e-12, "{b} != {e}");
        }
        assert_eq!(coefficients.half_width(), 2);
    }

    #[test]
    fn it_computes_eighth_order_weights() {
        let coefficients = StencilCoefficients::compute(8).unwrap();
        let expected = [1225.0 / 1024.0, -245.0 / 3072.0, 49.0 / 5120.0, -5.0 / 7168.0];
        for (b, e) in coefficients.weights().iter().zip(expected) {
            assert!((b - e).abs() < 1e-12, "{b} != {e}");
        }
    }

    #[test]
    fn it_rejects_invalid_orders() {
        for order in [0, 1, 2, 3, 5, 7] {
            assert!(matches!(
                StencilCoefficients::compute(order),
                Err(Error::InvalidOrder { order: o }) if o == order
            ));
        }
    }

    #[test]
    fn it_differentiates_polynomials_exactly() {
        // a 4th order stencil is exact for cubics. derivative at x = 0.5 of
        // f(x) = x³ - 2x is 3/4 - 2.
        let coefficients = StencilCoefficients::compute(4).unwrap();
        let f = |m: isize| {
            let x = m as f64;
            x.powi(3) - 2.0 * x
        };
        let derivative = coefficients.forward(f);
        assert!((derivative - (0.75 - 2.0)).abs() < 1e-12);

        // at x = -0.5 using the backward form
        let derivative = coefficients.backward(f);
        assert!((derivative - (0.75 - 2.0)).abs() < 1e-12);
    }

    #[test]
    fn it_takes_third_derivatives() {
        // f(x) = x³ has f''' = 6 everywhere
        let third = forward_difference(&THIRD_DERIVATIVE_WEIGHTS, |m| (m as f64).powi(3));
        assert!((third - 6.0).abs() < 1e-12);
    }
}
