// This file is part of the movie recommendation engine.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Nonlinear conjugate gradient (Polak-Ribière+).

use log::*;
use ndarray::Array1;

use super::{line_search::strong_wolfe, max_abs, LineSearchOptions, Objective};
use crate::errors::{CofiError, Result};

/// Options for conjugate-gradient minimization.
#[derive(Debug, Clone, Copy)]
pub struct CgOptions {
    pub max_iterations: usize,
    /// Stop once the largest gradient component falls below this.
    pub gtol: f64,
    pub line_search: LineSearchOptions,
}

impl Default for CgOptions {
    fn default() -> Self {
        CgOptions {
            max_iterations: 100,
            gtol: 1e-5,
            line_search: LineSearchOptions::default(),
        }
    }
}

/// Why minimization stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CgStatus {
    /// The gradient norm fell below tolerance.
    Converged,
    /// The iteration cap was reached.
    MaxIterations,
    /// No acceptable step could be found along the search direction.
    LineSearchFailed,
    /// The objective or gradient became non-finite.
    NonFinite,
}

/// Result of a minimization run.
#[derive(Debug, Clone)]
pub struct CgResult {
    pub params: Array1<f64>,
    pub cost: f64,
    pub grad_norm: f64,
    pub iterations: usize,
    pub evaluations: usize,
    pub status: CgStatus,
}

/// Minimize an objective from a starting point with nonlinear conjugate
/// gradient.
///
/// The result always holds the last accepted point, whatever the status.
pub fn minimize_cg<O: Objective>(obj: &O, x0: Array1<f64>, opts: &CgOptions) -> Result<CgResult> {
    if x0.len() != obj.dim() {
        return Err(CofiError::dimension("initial parameters", obj.dim(), x0.len()));
    }

    let mut x = x0;
    let (mut cost, mut grad) = obj.cost_grad(x.view())?;
    let mut evaluations = 1;
    let mut grad_norm = max_abs(&grad);
    let mut dir = -&grad;
    // seeds the first step-size estimate
    let mut prev_cost = cost + grad.dot(&grad).sqrt() / 2.0;
    let mut iterations = 0;

    let status = loop {
        if !cost.is_finite() || !grad_norm.is_finite() {
            warn!(
                "non-finite cost or gradient at iteration {} (cost {:.6e})",
                iterations, cost
            );
            break CgStatus::NonFinite;
        }
        if grad_norm <= opts.gtol {
            break CgStatus::Converged;
        }
        if iterations >= opts.max_iterations {
            break CgStatus::MaxIterations;
        }

        let mut slope = grad.dot(&dir);
        if slope >= 0.0 {
            // not a descent direction, restart along steepest descent
            dir = -&grad;
            slope = grad.dot(&dir);
        }

        let mut step = 1.01 * 2.0 * (cost - prev_cost) / slope;
        if !step.is_finite() || step <= 0.0 {
            step = 1.0;
        }
        let step = step.min(1.0);

        let (point, evals) = strong_wolfe(
            obj,
            x.view(),
            dir.view(),
            cost,
            slope,
            step,
            &opts.line_search,
        )?;
        evaluations += evals;
        let Some(point) = point else {
            warn!(
                "line search failed at iteration {} (cost {:.6e})",
                iterations, cost
            );
            break CgStatus::LineSearchFailed;
        };

        // Polak-Ribière+ update
        let gg = grad.dot(&grad);
        let beta = ((&point.grad - &grad).dot(&point.grad) / gg).max(0.0);
        dir = &dir * beta - &point.grad;

        prev_cost = cost;
        x = point.params;
        cost = point.cost;
        grad = point.grad;
        grad_norm = max_abs(&grad);
        iterations += 1;
        trace!(
            "iteration {}: cost {:.6e}, |g| {:.3e}, step {:.3e}",
            iterations,
            cost,
            grad_norm,
            point.step
        );
    };

    debug!(
        "conjugate gradient stopped after {} iterations ({} evaluations): {:?}, cost {:.6e}",
        iterations, evaluations, status, cost
    );

    Ok(CgResult {
        params: x,
        cost,
        grad_norm,
        iterations,
        evaluations,
        status,
    })
}

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;
    use ndarray::{array, ArrayView1};

    use super::*;

    /// Rosenbrock's banana function.
    struct Rosenbrock;

    impl Objective for Rosenbrock {
        fn dim(&self) -> usize {
            2
        }

        fn cost_grad(&self, p: ArrayView1<f64>) -> Result<(f64, Array1<f64>)> {
            let (x, y) = (p[0], p[1]);
            let cost = (1.0 - x).powi(2) + 100.0 * (y - x * x).powi(2);
            let gx = -2.0 * (1.0 - x) - 400.0 * x * (y - x * x);
            let gy = 200.0 * (y - x * x);
            Ok((cost, array![gx, gy]))
        }
    }

    /// Quadratic with a given diagonal Hessian, minimized at 0.
    struct Diagonal(Array1<f64>);

    impl Objective for Diagonal {
        fn dim(&self) -> usize {
            self.0.len()
        }

        fn cost_grad(&self, p: ArrayView1<f64>) -> Result<(f64, Array1<f64>)> {
            let g = &self.0 * &p;
            Ok((0.5 * g.dot(&p), g))
        }
    }

    #[test]
    fn test_quadratic_converges() {
        let obj = Diagonal(array![1.0, 4.0, 9.0, 16.0]);
        let res = minimize_cg(&obj, array![1.0, -1.0, 2.0, 0.5], &CgOptions::default())
            .expect("minimize");
        assert_eq!(res.status, CgStatus::Converged);
        assert!(res.grad_norm <= 1e-5);
        for v in res.params.iter() {
            assert_abs_diff_eq!(*v, 0.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_rosenbrock() {
        let opts = CgOptions {
            max_iterations: 2000,
            ..CgOptions::default()
        };
        let res = minimize_cg(&Rosenbrock, array![-1.2, 1.0], &opts).expect("minimize");
        assert!(res.cost < 1e-5, "final cost {}", res.cost);
        assert_abs_diff_eq!(res.params[0], 1.0, epsilon = 2e-2);
        assert_abs_diff_eq!(res.params[1], 1.0, epsilon = 5e-2);
    }

    #[test]
    fn test_iteration_cap() {
        let opts = CgOptions {
            max_iterations: 2,
            ..CgOptions::default()
        };
        let res = minimize_cg(&Rosenbrock, array![-1.2, 1.0], &opts).expect("minimize");
        assert_eq!(res.iterations, 2);
        assert_eq!(res.status, CgStatus::MaxIterations);
        // never worse than the start
        assert!(res.cost < 24.2 + 1e-9);
    }

    #[test]
    fn test_already_optimal() {
        let obj = Diagonal(array![2.0, 3.0]);
        let res = minimize_cg(&obj, array![0.0, 0.0], &CgOptions::default()).expect("minimize");
        assert_eq!(res.status, CgStatus::Converged);
        assert_eq!(res.iterations, 0);
        assert_eq!(res.evaluations, 1);
    }

    /// (x − 3)², undefined from x = 2 on.
    struct Cliff;

    impl Objective for Cliff {
        fn dim(&self) -> usize {
            1
        }

        fn cost_grad(&self, p: ArrayView1<f64>) -> Result<(f64, Array1<f64>)> {
            let x = p[0];
            if x >= 2.0 {
                Ok((f64::NAN, array![f64::NAN]))
            } else {
                Ok(((x - 3.0).powi(2), array![2.0 * (x - 3.0)]))
            }
        }
    }

    /// Flat cost with a gradient that claims it slopes downhill.
    struct Plateau;

    impl Objective for Plateau {
        fn dim(&self) -> usize {
            2
        }

        fn cost_grad(&self, _p: ArrayView1<f64>) -> Result<(f64, Array1<f64>)> {
            Ok((1.0, array![1.0, -0.5]))
        }
    }

    #[test]
    fn test_nan_start() {
        let x0 = array![2.5];
        let res = minimize_cg(&Cliff, x0.clone(), &CgOptions::default()).expect("minimize");
        assert_eq!(res.status, CgStatus::NonFinite);
        assert_eq!(res.iterations, 0);
        assert_eq!(res.params, x0);
        assert!(res.cost.is_nan());
    }

    #[test]
    fn test_nan_region_never_accepted() {
        let res = minimize_cg(&Cliff, array![0.0], &CgOptions::default()).expect("minimize");
        assert_ne!(res.status, CgStatus::Converged);
        assert!(res.iterations >= 1);
        assert!(res.params[0] > 0.0 && res.params[0] < 2.0);
        assert!(res.cost.is_finite());
        assert!(res.cost < 9.0);
        assert!(res.grad_norm.is_finite());
    }

    #[test]
    fn test_line_search_failure_keeps_start() {
        let x0 = array![0.25, -1.0];
        let res = minimize_cg(&Plateau, x0.clone(), &CgOptions::default()).expect("minimize");
        assert_eq!(res.status, CgStatus::LineSearchFailed);
        assert_eq!(res.iterations, 0);
        assert_eq!(res.params, x0);
        assert_eq!(res.cost, 1.0);
        assert!(res.evaluations > 1);
    }

    #[test]
    fn test_bad_start_length() {
        let obj = Diagonal(array![2.0, 3.0]);
        assert!(minimize_cg(&obj, array![0.0], &CgOptions::default()).is_err());
    }
}
