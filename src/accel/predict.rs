// This file is part of the movie recommendation engine.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Prediction matrices.

use ndarray::{Array1, Array2, Axis};

use crate::errors::{CofiError, Result};
use crate::objective::Factors;

/// Predicted scores for every (item, user) pair.
///
/// `scores` holds `X·Θᵗ` *without* the item means; add `item_means` back
/// (see [`Prediction::decentered`]) to put them on the rating scale. The
/// values are unclipped and are meant as ranking signals, not calibrated
/// ratings: they can fall well outside the range of the input ratings.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Centered scores (items × users).
    pub scores: Array2<f64>,
    /// Per-item mean rating.
    pub item_means: Array1<f64>,
}

/// Compute the prediction matrix from trained factors.
pub fn predict(factors: &Factors, item_means: Array1<f64>) -> Result<Prediction> {
    let scores = factors.x.dot(&factors.theta.t());
    if item_means.len() != scores.nrows() {
        return Err(CofiError::dimension(
            "item means",
            scores.nrows(),
            item_means.len(),
        ));
    }
    Ok(Prediction { scores, item_means })
}

impl Prediction {
    /// The "no data" output: a 1×1 zero matrix with a single zero mean.
    pub fn degenerate() -> Self {
        Prediction {
            scores: Array2::zeros((1, 1)),
            item_means: Array1::zeros(1),
        }
    }

    /// Check whether this is the "no data" output.
    ///
    /// A genuine one-item, one-user model is indistinguishable by shape, so
    /// callers holding a snapshot should prefer checking it for emptiness.
    pub fn is_degenerate(&self) -> bool {
        self.scores.dim() == (1, 1)
            && self.scores[[0, 0]] == 0.0
            && self.item_means.len() == 1
            && self.item_means.get(0) == Some(&0.0)
    }

    pub fn n_items(&self) -> usize {
        self.scores.nrows()
    }

    pub fn n_users(&self) -> usize {
        self.scores.ncols()
    }

    /// Scores with the item means added back.
    pub fn decentered(&self) -> Array2<f64> {
        &self.scores + &self.item_means.view().insert_axis(Axis(1))
    }

    /// De-centered scores for one user column.
    pub fn user_scores(&self, col: usize) -> Option<Array1<f64>> {
        if col >= self.n_users() {
            return None;
        }
        Some(&self.scores.column(col) + &self.item_means)
    }
}

#[cfg(test)]
mod test {
    use ndarray::array;

    use super::*;

    fn sample() -> Prediction {
        let factors = Factors {
            x: array![[1.0, 0.0], [0.0, 2.0], [1.0, 1.0]],
            theta: array![[3.0, 1.0], [0.0, -1.0]],
        };
        predict(&factors, array![4.0, 4.0, 2.0]).expect("shapes agree")
    }

    #[test]
    fn test_scores() {
        let p = sample();
        assert_eq!(p.scores, array![[3.0, 0.0], [2.0, -2.0], [4.0, -1.0]]);
        assert_eq!(p.n_items(), 3);
        assert_eq!(p.n_users(), 2);
        assert!(!p.is_degenerate());
    }

    #[test]
    fn test_decentered() {
        let p = sample();
        assert_eq!(p.decentered(), array![[7.0, 4.0], [6.0, 2.0], [6.0, 1.0]]);
        assert_eq!(p.user_scores(1), Some(array![4.0, 2.0, 1.0]));
        assert_eq!(p.user_scores(2), None);
    }

    #[test]
    fn test_degenerate() {
        let p = Prediction::degenerate();
        assert_eq!(p.scores.dim(), (1, 1));
        assert_eq!(p.scores[[0, 0]], 0.0);
        assert_eq!(p.item_means.len(), 1);
        assert_eq!(p.item_means[0], 0.0);
        assert!(p.is_degenerate());
    }

    #[test]
    fn test_degenerate_needs_one_mean() {
        let p = Prediction {
            scores: Array2::zeros((1, 1)),
            item_means: Array1::zeros(0),
        };
        assert!(!p.is_degenerate());

        let p = Prediction {
            scores: Array2::zeros((1, 1)),
            item_means: array![0.5],
        };
        assert!(!p.is_degenerate());
    }

    #[test]
    fn test_mean_length_checked() {
        let factors = Factors {
            x: array![[1.0]],
            theta: array![[1.0]],
        };
        assert!(predict(&factors, array![1.0, 2.0]).is_err());
    }
}
