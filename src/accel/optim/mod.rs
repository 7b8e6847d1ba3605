// This file is part of the movie recommendation engine.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Gradient-based minimization.

use ndarray::{Array1, ArrayView1};

use crate::errors::Result;

mod cg;
mod line_search;

pub use cg::{minimize_cg, CgOptions, CgResult, CgStatus};
pub use line_search::{strong_wolfe, LinePoint, LineSearchOptions};

/// A differentiable function of a parameter vector.
pub trait Objective {
    /// Length of the parameter vector.
    fn dim(&self) -> usize;

    /// Evaluate the function value and its gradient.
    fn cost_grad(&self, params: ArrayView1<f64>) -> Result<(f64, Array1<f64>)>;
}

/// Infinity norm of a vector; NaN if any component is NaN.
pub(crate) fn max_abs(v: &Array1<f64>) -> f64 {
    v.iter().fold(0.0, |m: f64, x| {
        if m.is_nan() || x.is_nan() {
            f64::NAN
        } else {
            m.max(x.abs())
        }
    })
}

#[cfg(test)]
mod test {
    use ndarray::array;

    use super::*;

    #[test]
    fn test_max_abs() {
        assert_eq!(max_abs(&array![1.0, -3.0, 2.0]), 3.0);
        assert_eq!(max_abs(&Array1::zeros(0)), 0.0);
        assert!(max_abs(&array![f64::NAN, 1.0]).is_nan());
        assert!(max_abs(&array![1.0, f64::NAN]).is_nan());
    }
}
