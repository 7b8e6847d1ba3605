// This file is part of the movie recommendation engine.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Factorization training.

use log::*;
use ndarray::{Array2, ArrayView2};
use rand::Rng;

use crate::config::TrainConfig;
use crate::errors::Result;
use crate::objective::{CofiObjective, Factors};
use crate::optim::{minimize_cg, CgStatus, Objective};

/// Outcome of one training run.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub factors: Factors,
    pub initial_cost: f64,
    pub cost: f64,
    pub iterations: usize,
    pub status: CgStatus,
}

/// Trains item and user factors by conjugate-gradient minimization.
#[derive(Debug, Clone)]
pub struct Trainer {
    config: TrainConfig,
}

impl Trainer {
    pub fn new(config: TrainConfig) -> Result<Self> {
        config.validate()?;
        Ok(Trainer { config })
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Draw starting factors uniformly from [0, 1): item features first,
    /// then user features.
    pub fn initial_factors<R: Rng + ?Sized>(
        &self,
        n_items: usize,
        n_users: usize,
        rng: &mut R,
    ) -> Factors {
        let k = self.config.features;
        let x = Array2::from_shape_simple_fn((n_items, k), || rng.random::<f64>());
        let theta = Array2::from_shape_simple_fn((n_users, k), || rng.random::<f64>());
        Factors { x, theta }
    }

    /// Fit factors to mean-centered ratings `ynorm` with observation mask `r`.
    ///
    /// The run is fully determined by the inputs and the state of `rng`.
    pub fn train<'a, R: Rng + ?Sized>(
        &self,
        ynorm: ArrayView2<'a, f64>,
        r: ArrayView2<'a, f64>,
        rng: &mut R,
    ) -> Result<TrainOutcome> {
        let objective = CofiObjective::new(
            ynorm,
            r,
            self.config.features,
            self.config.regularization,
        )?;
        let layout = objective.layout();

        let init = self.initial_factors(layout.n_items, layout.n_users, rng);
        let x0 = layout.flatten(&init)?;
        let (initial_cost, _) = objective.cost_grad(x0.view())?;
        debug!(
            "training {} item and {} user factors (k={}, λ={}), initial cost {:.4e}",
            layout.n_items,
            layout.n_users,
            layout.n_features,
            self.config.regularization,
            initial_cost
        );

        let res = minimize_cg(&objective, x0, &self.config.cg_options())?;

        Ok(TrainOutcome {
            factors: layout.reshape(res.params.view())?,
            initial_cost,
            cost: res.cost,
            iterations: res.iterations,
            status: res.status,
        })
    }
}
