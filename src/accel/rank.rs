// This file is part of the movie recommendation engine.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Ranking predicted scores.

use ndarray::ArrayView1;
use ordered_float::OrderedFloat;
use rayon::slice::ParallelSliceMut;

/// An item with its predicted score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedItem {
    pub item: i64,
    pub score: f64,
}

/// Order row positions by descending score, dropping excluded rows.
///
/// NaN scores sort last; ties keep row order.
pub fn rank_items<F>(scores: ArrayView1<f64>, exclude: F) -> Vec<usize>
where
    F: Fn(usize) -> bool,
{
    let mut rows: Vec<usize> = (0..scores.len()).filter(|i| !exclude(*i)).collect();
    rows.par_sort_by_key(|i| {
        let s = scores[*i];
        OrderedFloat(if s.is_nan() { f64::INFINITY } else { -s })
    });
    rows
}
