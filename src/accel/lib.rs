// This file is part of the movie recommendation engine.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Collaborative-filtering recommendations by low-rank matrix factorization.
//!
//! Ratings are arranged into a dense item × user matrix, centered on each
//! item's mean, and factored into item and user feature matrices by
//! minimizing a regularized squared error with nonlinear conjugate
//! gradient. Everything is recomputed from a ratings snapshot on each call.

pub mod config;
pub mod data;
mod errors;
pub mod normalize;
pub mod objective;
pub mod optim;
pub mod predict;
pub mod rank;
pub mod recommend;
pub mod train;

#[cfg(feature = "python")]
mod python;

pub use config::TrainConfig;
pub use data::{IdIndex, Rating, RatingMatrix, RatingSnapshot};
pub use errors::{CofiError, Result};
pub use normalize::normalize_ratings;
pub use objective::{cofi_cost, cofi_gradient, CofiObjective, Factors, ParamLayout};
pub use predict::{predict, Prediction};
pub use rank::{rank_items, RankedItem};
pub use recommend::{recommend, recommend_entropy, Recommendation};
pub use train::{TrainOutcome, Trainer};
