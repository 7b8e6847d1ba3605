// This file is part of the movie recommendation engine.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Regularized squared-error objective for collaborative filtering.
//!
//! The objective is evaluated over the whole dense item × user matrix; the
//! observation mask zeroes the residual of every unobserved cell, so those
//! cells contribute neither cost nor gradient.

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};

use crate::errors::{check_shape, CofiError, Result};
use crate::optim::Objective;

/// Item and user latent feature matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct Factors {
    /// Item features (items × features).
    pub x: Array2<f64>,
    /// User features (users × features).
    pub theta: Array2<f64>,
}

/// Layout of the flattened parameter vector.
///
/// Parameters are stored as the item features in row-major order,
/// followed by the user features in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamLayout {
    pub n_items: usize,
    pub n_users: usize,
    pub n_features: usize,
}

impl ParamLayout {
    pub fn new(n_items: usize, n_users: usize, n_features: usize) -> Self {
        ParamLayout {
            n_items,
            n_users,
            n_features,
        }
    }

    fn item_len(&self) -> usize {
        self.n_items * self.n_features
    }

    /// Total number of parameters.
    pub fn len(&self) -> usize {
        (self.n_items + self.n_users) * self.n_features
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten factor matrices into a parameter vector.
    pub fn flatten(&self, factors: &Factors) -> Result<Array1<f64>> {
        check_shape!("item features", factors.x, [self.n_items, self.n_features]);
        check_shape!("user features", factors.theta, [self.n_users, self.n_features]);
        Ok(factors.x.iter().chain(factors.theta.iter()).copied().collect())
    }

    /// Split a parameter vector back into factor matrices.
    pub fn reshape(&self, params: ArrayView1<f64>) -> Result<Factors> {
        self.check(params)?;
        let split = self.item_len();
        let x = Array2::from_shape_vec(
            (self.n_items, self.n_features),
            params.slice(s![..split]).to_vec(),
        );
        let theta = Array2::from_shape_vec(
            (self.n_users, self.n_features),
            params.slice(s![split..]).to_vec(),
        );
        match (x, theta) {
            (Ok(x), Ok(theta)) => Ok(Factors { x, theta }),
            _ => Err(CofiError::dimension("parameter vector", self.len(), params.len())),
        }
    }

    fn check(&self, params: ArrayView1<f64>) -> Result<()> {
        if params.len() != self.len() {
            Err(CofiError::dimension("parameter vector", self.len(), params.len()))
        } else {
            Ok(())
        }
    }
}

/// Collaborative-filtering cost over a fixed (Y, R) pair.
#[derive(Debug, Clone)]
pub struct CofiObjective<'a> {
    y: ArrayView2<'a, f64>,
    r: ArrayView2<'a, f64>,
    layout: ParamLayout,
    reg: f64,
}

impl<'a> CofiObjective<'a> {
    /// Set up the objective, checking that `y` and `r` agree in shape.
    pub fn new(
        y: ArrayView2<'a, f64>,
        r: ArrayView2<'a, f64>,
        n_features: usize,
        reg: f64,
    ) -> Result<Self> {
        check_shape!("observation mask", r, y.shape());
        let (n_items, n_users) = y.dim();
        Ok(CofiObjective {
            y,
            r,
            layout: ParamLayout::new(n_items, n_users, n_features),
            reg,
        })
    }

    pub fn layout(&self) -> ParamLayout {
        self.layout
    }

    /// Masked residual `(X·Θᵗ − Y) ⊙ R`.
    fn residual(&self, factors: &Factors) -> Array2<f64> {
        let mut err = factors.x.dot(&factors.theta.t());
        err -= &self.y;
        err *= &self.r;
        err
    }

    fn penalty(&self, factors: &Factors) -> f64 {
        let sq = |a: &Array2<f64>| a.iter().map(|v| v * v).sum::<f64>();
        0.5 * self.reg * (sq(&factors.x) + sq(&factors.theta))
    }

    /// Compute the cost at a parameter vector.
    pub fn cost(&self, params: ArrayView1<f64>) -> Result<f64> {
        let factors = self.layout.reshape(params)?;
        let err = self.residual(&factors);
        Ok(0.5 * err.iter().map(|e| e * e).sum::<f64>() + self.penalty(&factors))
    }

    /// Compute the gradient at a parameter vector, in the parameter layout.
    pub fn gradient(&self, params: ArrayView1<f64>) -> Result<Array1<f64>> {
        let factors = self.layout.reshape(params)?;
        let err = self.residual(&factors);
        self.gradient_from(&factors, &err)
    }

    fn gradient_from(&self, factors: &Factors, err: &Array2<f64>) -> Result<Array1<f64>> {
        let grad = Factors {
            x: err.dot(&factors.theta) + self.reg * &factors.x,
            theta: err.t().dot(&factors.x) + self.reg * &factors.theta,
        };
        self.layout.flatten(&grad)
    }
}

impl Objective for CofiObjective<'_> {
    fn dim(&self) -> usize {
        self.layout.len()
    }

    fn cost_grad(&self, params: ArrayView1<f64>) -> Result<(f64, Array1<f64>)> {
        let factors = self.layout.reshape(params)?;
        let err = self.residual(&factors);
        let cost = 0.5 * err.iter().map(|e| e * e).sum::<f64>() + self.penalty(&factors);
        let grad = self.gradient_from(&factors, &err)?;
        Ok((cost, grad))
    }
}

/// Compute the collaborative-filtering cost for a parameter vector.
pub fn cofi_cost<'a>(
    params: ArrayView1<f64>,
    y: ArrayView2<'a, f64>,
    r: ArrayView2<'a, f64>,
    n_features: usize,
    reg: f64,
) -> Result<f64> {
    CofiObjective::new(y, r, n_features, reg)?.cost(params)
}

/// Compute the collaborative-filtering gradient for a parameter vector.
pub fn cofi_gradient<'a>(
    params: ArrayView1<f64>,
    y: ArrayView2<'a, f64>,
    r: ArrayView2<'a, f64>,
    n_features: usize,
    reg: f64,
) -> Result<Array1<f64>> {
    CofiObjective::new(y, r, n_features, reg)?.gradient(params)
}
