// This file is part of the movie recommendation engine.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Training configuration.

use serde::{Deserialize, Serialize};

use crate::errors::{CofiError, Result};
use crate::optim::{CgOptions, LineSearchOptions};

/// Hyperparameters for factorization training.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainConfig {
    /// Latent feature dimensionality.
    pub features: usize,
    /// L2 regularization strength.
    pub regularization: f64,
    /// Optimizer iteration cap.
    pub max_iterations: usize,
    /// Gradient tolerance for early stopping.
    pub gtol: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            features: 10,
            regularization: 1.0,
            max_iterations: 100,
            gtol: 1e-5,
        }
    }
}

impl TrainConfig {
    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: TrainConfig = serde_json::from_str(json)
            .map_err(|e| CofiError::InvalidConfig(format!("malformed JSON: {}", e)))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.features == 0 {
            return Err(CofiError::InvalidConfig("features must be positive".into()));
        }
        if !self.regularization.is_finite() || self.regularization < 0.0 {
            return Err(CofiError::InvalidConfig(format!(
                "regularization must be finite and non-negative, got {}",
                self.regularization
            )));
        }
        if self.max_iterations == 0 {
            return Err(CofiError::InvalidConfig(
                "max_iterations must be positive".into(),
            ));
        }
        if !self.gtol.is_finite() || self.gtol < 0.0 {
            return Err(CofiError::InvalidConfig(format!(
                "gtol must be finite and non-negative, got {}",
                self.gtol
            )));
        }
        Ok(())
    }

    pub(crate) fn cg_options(&self) -> CgOptions {
        CgOptions {
            max_iterations: self.max_iterations,
            gtol: self.gtol,
            line_search: LineSearchOptions::default(),
        }
    }
}
