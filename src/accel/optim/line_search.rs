// This file is part of the movie recommendation engine.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Line search satisfying the strong Wolfe conditions.
//!
//! This follows the bracketing and zoom procedure of Nocedal & Wright,
//! *Numerical Optimization*, algorithms 3.5 and 3.6, with a safeguarded
//! quadratic interpolation step inside the zoom phase.

use log::*;
use ndarray::{Array1, ArrayView1};

use super::Objective;
use crate::errors::Result;

/// Line search parameters.
#[derive(Debug, Clone, Copy)]
pub struct LineSearchOptions {
    /// Sufficient-decrease constant.
    pub c1: f64,
    /// Curvature constant.
    pub c2: f64,
    /// Largest step to try.
    pub max_step: f64,
    /// Maximum number of bracketing and zoom steps (each).
    pub max_iter: usize,
}

impl Default for LineSearchOptions {
    fn default() -> Self {
        LineSearchOptions {
            c1: 1e-4,
            c2: 0.4,
            max_step: 1e10,
            max_iter: 30,
        }
    }
}

/// An evaluated point along the search direction.
#[derive(Debug, Clone)]
pub struct LinePoint {
    pub step: f64,
    pub params: Array1<f64>,
    pub cost: f64,
    pub grad: Array1<f64>,
    /// Directional derivative at this point.
    pub slope: f64,
}

struct Search<'a, O: Objective> {
    obj: &'a O,
    x: ArrayView1<'a, f64>,
    dir: ArrayView1<'a, f64>,
    evals: usize,
}

impl<O: Objective> Search<'_, O> {
    fn eval(&mut self, step: f64) -> Result<LinePoint> {
        let params = &self.x + &(step * &self.dir);
        let (cost, grad) = self.obj.cost_grad(params.view())?;
        self.evals += 1;
        let slope = grad.dot(&self.dir);
        Ok(LinePoint {
            step,
            params,
            cost,
            grad,
            slope,
        })
    }
}

/// Search along `dir` from `x` for a step satisfying the strong Wolfe
/// conditions.
///
/// `cost0` and `slope0` are the function value and directional derivative
/// at `x`; `slope0` must be negative. Returns the accepted point, if any,
/// and the number of objective evaluations performed.
pub fn strong_wolfe<'a, O: Objective>(
    obj: &'a O,
    x: ArrayView1<'a, f64>,
    dir: ArrayView1<'a, f64>,
    cost0: f64,
    slope0: f64,
    initial_step: f64,
    opts: &LineSearchOptions,
) -> Result<(Option<LinePoint>, usize)> {
    let mut search = Search {
        obj,
        x,
        dir,
        evals: 0,
    };
    if slope0 >= 0.0 {
        return Ok((None, 0));
    }

    let armijo = |p: &LinePoint| p.cost.is_finite() && p.cost <= cost0 + opts.c1 * p.step * slope0;
    let curvature = |p: &LinePoint| p.slope.abs() <= -opts.c2 * slope0;

    let mut prev_step = 0.0;
    let mut prev_cost = cost0;
    let mut prev_slope = slope0;
    let mut step = initial_step.min(opts.max_step);

    for i in 0..opts.max_iter {
        let pt = search.eval(step)?;
        if !armijo(&pt) || (i > 0 && pt.cost >= prev_cost) {
            let lo = (prev_step, prev_cost, prev_slope);
            let res = zoom(&mut search, lo, (pt.step, pt.cost), cost0, slope0, opts)?;
            return Ok((res, search.evals));
        }
        if curvature(&pt) {
            return Ok((Some(pt), search.evals));
        }
        if pt.slope >= 0.0 {
            let lo = (pt.step, pt.cost, pt.slope);
            let res = zoom(&mut search, lo, (prev_step, prev_cost), cost0, slope0, opts)?;
            return Ok((res, search.evals));
        }

        prev_step = pt.step;
        prev_cost = pt.cost;
        prev_slope = pt.slope;
        step = (2.0 * step).min(opts.max_step);
        if step <= prev_step {
            break;
        }
    }

    debug!("line search failed to bracket a step");
    Ok((None, search.evals))
}

/// Narrow a bracket `[lo, hi]` until a point satisfies the strong Wolfe
/// conditions. `lo` always satisfies sufficient decrease.
fn zoom<O: Objective>(
    search: &mut Search<'_, O>,
    lo: (f64, f64, f64),
    hi: (f64, f64),
    cost0: f64,
    slope0: f64,
    opts: &LineSearchOptions,
) -> Result<Option<LinePoint>> {
    let (mut a_lo, mut f_lo, mut d_lo) = lo;
    let (mut a_hi, mut f_hi) = hi;

    for _ in 0..opts.max_iter {
        let step = interpolate(a_lo, f_lo, d_lo, a_hi, f_hi);
        if (a_hi - a_lo).abs() < f64::EPSILON * a_lo.abs().max(1.0) {
            break;
        }

        let pt = search.eval(step)?;
        let decreased = pt.cost.is_finite() && pt.cost <= cost0 + opts.c1 * step * slope0;
        if !decreased || pt.cost >= f_lo {
            a_hi = step;
            f_hi = pt.cost;
        } else {
            if pt.slope.abs() <= -opts.c2 * slope0 {
                return Ok(Some(pt));
            }
            if pt.slope * (a_hi - a_lo) >= 0.0 {
                a_hi = a_lo;
                f_hi = f_lo;
            }
            a_lo = step;
            f_lo = pt.cost;
            d_lo = pt.slope;
        }
    }

    trace!("zoom exhausted between steps {} and {}", a_lo, a_hi);
    Ok(None)
}

/// Minimizer of the quadratic through `(a, fa)` with slope `da` at `a` and
/// through `(b, fb)`, kept away from the bracket ends; falls back to
/// bisection.
fn interpolate(a: f64, fa: f64, da: f64, b: f64, fb: f64) -> f64 {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    let margin = 0.1 * (hi - lo);
    let mid = 0.5 * (a + b);

    let d = b - a;
    let denom = 2.0 * (fb - fa - da * d);
    if !fb.is_finite() || denom <= 0.0 {
        return mid;
    }
    let step = a - da * d * d / denom;
    if step.is_finite() && step > lo + margin && step < hi - margin {
        step
    } else {
        mid
    }
}
