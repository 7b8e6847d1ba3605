// This file is part of the movie recommendation engine.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Dense rating matrices built from a snapshot.

use log::*;
use ndarray::Array2;

use super::{IdIndex, RatingSnapshot};

/// Dense item × user rating matrix and its observation mask.
#[derive(Debug, Clone)]
pub struct RatingMatrix {
    /// Ratings, 0 where unobserved.
    pub y: Array2<f64>,
    /// Observation mask (1.0 observed, 0.0 otherwise).
    pub r: Array2<f64>,
    /// Row index.
    pub items: IdIndex,
    /// Column index.
    pub users: IdIndex,
}

impl RatingMatrix {
    /// Build the matrices for a snapshot.
    ///
    /// Returns `None` if the snapshot has no ratings. When an (item, user)
    /// pair is rated more than once, the later observation wins.
    pub fn build(snapshot: &RatingSnapshot) -> Option<RatingMatrix> {
        if snapshot.is_empty() {
            return None;
        }

        let ratings = snapshot.ratings();
        let items = IdIndex::from_ids(ratings.iter().map(|r| r.item));
        let users = IdIndex::from_ids(ratings.iter().map(|r| r.user));
        let shape = (items.len(), users.len());
        debug!(
            "building {} x {} rating matrix from {} ratings",
            shape.0,
            shape.1,
            ratings.len()
        );

        let mut y = Array2::zeros(shape);
        let mut r = Array2::zeros(shape);
        for rating in ratings {
            // both lookups succeed, the indexes were built from these ratings
            if let (Some(i), Some(u)) = (items.position(rating.item), users.position(rating.user)) {
                y[[i, u]] = rating.rating;
                r[[i, u]] = 1.0;
            }
        }

        Some(RatingMatrix { y, r, items, users })
    }

    pub fn n_items(&self) -> usize {
        self.items.len()
    }

    pub fn n_users(&self) -> usize {
        self.users.len()
    }

    /// Number of distinct observed cells.
    pub fn n_observed(&self) -> usize {
        self.r.iter().filter(|v| **v > 0.0).count()
    }
}
