// This file is part of the movie recommendation engine.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Per-item mean centering.

use ndarray::{Array1, Array2, ArrayView2, Axis, Zip};

use crate::errors::{check_shape, Result};

/// Subtract each item's mean observed rating from its observed entries.
///
/// Returns the normalized matrix and the vector of item means. Items with
/// no observations get a mean of 0 and their row is copied unchanged.
pub fn normalize_ratings(y: ArrayView2<f64>, r: ArrayView2<f64>) -> Result<(Array2<f64>, Array1<f64>)> {
    check_shape!("observation mask", r, y.shape());

    let mut ynorm = y.to_owned();
    let mut means = Array1::zeros(y.nrows());

    Zip::from(ynorm.axis_iter_mut(Axis(0)))
        .and(r.axis_iter(Axis(0)))
        .and(&mut means)
        .for_each(|mut row, mask, mean| {
            let (sum, n) = row
                .iter()
                .zip(mask.iter())
                .filter(|(_, m)| **m > 0.0)
                .fold((0.0, 0usize), |(s, n), (v, _)| (s + v, n + 1));
            if n == 0 {
                return;
            }

            *mean = sum / n as f64;
            Zip::from(&mut row).and(&mask).for_each(|v, m| {
                if *m > 0.0 {
                    *v -= *mean;
                }
            });
        });

    Ok((ynorm, means))
}
