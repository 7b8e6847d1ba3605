// This file is part of the movie recommendation engine.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! End-to-end recommendation pipeline.
//!
//! Each call builds the rating matrices, centers them, trains fresh
//! factors and predicts, with no state carried between calls.

use log::*;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::config::TrainConfig;
use crate::data::{IdIndex, RatingMatrix, RatingSnapshot};
use crate::errors::{CofiError, Result};
use crate::normalize::normalize_ratings;
use crate::predict::{predict, Prediction};
use crate::rank::{rank_items, RankedItem};
use crate::train::Trainer;

/// Predictions together with the snapshot they were trained from.
///
/// Index lookups go through the snapshot's own ID indexes, so rows and
/// columns always line up with the prediction matrix.
#[derive(Debug, Clone)]
pub struct Recommendation {
    prediction: Prediction,
    items: IdIndex,
    users: IdIndex,
    snapshot: RatingSnapshot,
}

/// Train on a ratings snapshot and predict every (item, user) score.
///
/// An empty snapshot yields [`Prediction::degenerate`]. The random source
/// drives factor initialization; the same snapshot and RNG state give the
/// same result.
pub fn recommend<R: Rng + ?Sized>(
    snapshot: &RatingSnapshot,
    config: &TrainConfig,
    rng: &mut R,
) -> Result<Recommendation> {
    let trainer = Trainer::new(*config)?;

    let Some(matrix) = RatingMatrix::build(snapshot) else {
        debug!("no ratings in snapshot, returning degenerate prediction");
        return Ok(Recommendation {
            prediction: Prediction::degenerate(),
            items: IdIndex::default(),
            users: IdIndex::default(),
            snapshot: snapshot.clone(),
        });
    };

    let (ynorm, means) = normalize_ratings(matrix.y.view(), matrix.r.view())?;
    let outcome = trainer.train(ynorm.view(), matrix.r.view(), rng)?;
    debug!(
        "trained on {} observed cells: cost {:.4e} -> {:.4e} in {} iterations",
        matrix.n_observed(),
        outcome.initial_cost,
        outcome.cost,
        outcome.iterations
    );
    let prediction = predict(&outcome.factors, means)?;

    Ok(Recommendation {
        prediction,
        items: matrix.items,
        users: matrix.users,
        snapshot: snapshot.clone(),
    })
}

/// Run [`recommend`] with a freshly seeded random source.
pub fn recommend_entropy(snapshot: &RatingSnapshot, config: &TrainConfig) -> Result<Recommendation> {
    let mut rng = Pcg64::from_rng(&mut rand::rng());
    recommend(snapshot, config, &mut rng)
}

impl Recommendation {
    pub fn prediction(&self) -> &Prediction {
        &self.prediction
    }

    pub fn into_prediction(self) -> Prediction {
        self.prediction
    }

    /// Row index: item IDs in row order.
    pub fn items(&self) -> &IdIndex {
        &self.items
    }

    /// Column index: user IDs in column order.
    pub fn users(&self) -> &IdIndex {
        &self.users
    }

    /// True when the snapshot had no ratings.
    pub fn is_degenerate(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// Column of the prediction matrix for a user.
    pub fn user_column(&self, user: i64) -> Option<usize> {
        self.users.position(user)
    }

    /// Top `n` unrated items for a user, by de-centered predicted score.
    ///
    /// Returns an empty list when the snapshot had no ratings.
    pub fn top_n(&self, user: i64, n: usize) -> Result<Vec<RankedItem>> {
        if self.is_degenerate() {
            return Ok(Vec::new());
        }
        let col = self.user_column(user).ok_or(CofiError::UnknownUser(user))?;
        let scores = self
            .prediction
            .user_scores(col)
            .ok_or(CofiError::UnknownUser(user))?;

        let rated: FxHashSet<usize> = self
            .snapshot
            .items_rated_by(user)
            .filter_map(|item| self.items.position(item))
            .collect();

        let ranked = rank_items(scores.view(), |row| rated.contains(&row))
            .into_iter()
            .take(n)
            .filter_map(|row| {
                self.items.id(row).map(|item| RankedItem {
                    item,
                    score: scores[row],
                })
            })
            .collect();
        Ok(ranked)
    }

    /// Top `n` items for several users at once.
    pub fn top_n_many(&self, users: &[i64], n: usize) -> Result<Vec<Vec<RankedItem>>> {
        users.par_iter().map(|u| self.top_n(*u, n)).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data::Rating;

    fn snapshot() -> RatingSnapshot {
        RatingSnapshot::new(vec![
            Rating::new(1, 100, 5.0),
            Rating::new(2, 100, 3.0),
            Rating::new(1, 200, 4.0),
            Rating::new(2, 300, 2.0),
        ])
    }

    #[test]
    fn test_empty_snapshot() {
        let snap = RatingSnapshot::new(Vec::new());
        let mut rng = Pcg64::seed_from_u64(0);
        let rec = recommend(&snap, &TrainConfig::default(), &mut rng).expect("runs");
        assert!(rec.is_degenerate());
        assert!(rec.prediction().is_degenerate());
        assert!(rec.top_n(1, 5).expect("empty ok").is_empty());
        assert_eq!(rec.user_column(1), None);
    }

    #[test]
    fn test_top_n_excludes_rated() {
        let mut rng = Pcg64::seed_from_u64(11);
        let rec = recommend(&snapshot(), &TrainConfig::default(), &mut rng).expect("runs");

        let recs = rec.top_n(1, 10).expect("known user");
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].item, 300);

        let recs = rec.top_n(2, 10).expect("known user");
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].item, 200);
    }

    #[test]
    fn test_unknown_user() {
        let mut rng = Pcg64::seed_from_u64(11);
        let rec = recommend(&snapshot(), &TrainConfig::default(), &mut rng).expect("runs");
        assert!(matches!(rec.top_n(99, 3), Err(CofiError::UnknownUser(99))));
        assert!(rec.top_n_many(&[1, 99], 3).is_err());
    }

    #[test]
    fn test_top_n_many_matches_single() {
        let mut rng = Pcg64::seed_from_u64(3);
        let rec = recommend(&snapshot(), &TrainConfig::default(), &mut rng).expect("runs");
        let many = rec.top_n_many(&[2, 1], 2).expect("known users");
        assert_eq!(many.len(), 2);
        assert_eq!(many[0], rec.top_n(2, 2).expect("known"));
        assert_eq!(many[1], rec.top_n(1, 2).expect("known"));
    }

    #[test]
    fn test_invalid_config() {
        let cfg = TrainConfig {
            regularization: f64::NAN,
            ..TrainConfig::default()
        };
        let res = recommend_entropy(&snapshot(), &cfg);
        assert!(matches!(res, Err(CofiError::InvalidConfig(_))));
    }
}
