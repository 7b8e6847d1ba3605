// This file is part of the movie recommendation engine.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Python bindings for the recommendation pipeline.

use arrow::{
    array::{make_array, ArrayData},
    pyarrow::PyArrowType,
};
use numpy::{PyArray1, PyArray2};
use pyo3::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg64;

use crate::config::TrainConfig;
use crate::data::RatingSnapshot;
use crate::recommend::{recommend, recommend_entropy, Recommendation};

/// Rating columns passed in from Python.
#[derive(FromPyObject)]
struct RatingColumns {
    users: PyArrowType<ArrayData>,
    items: PyArrowType<ArrayData>,
    ratings: PyArrowType<ArrayData>,
}

impl TryInto<RatingSnapshot> for RatingColumns {
    type Error = PyErr;

    fn try_into(self) -> PyResult<RatingSnapshot> {
        let users = make_array(self.users.0);
        let items = make_array(self.items.0);
        let ratings = make_array(self.ratings.0);
        Ok(RatingSnapshot::from_arrays(
            users.as_ref(),
            items.as_ref(),
            ratings.as_ref(),
        )?)
    }
}

fn run_pipeline(
    py: Python<'_>,
    data: RatingColumns,
    config: Option<&str>,
    seed: Option<u64>,
) -> PyResult<Recommendation> {
    let snapshot: RatingSnapshot = data.try_into()?;
    let config = match config {
        Some(json) => TrainConfig::from_json(json)?,
        None => TrainConfig::default(),
    };

    let rec = py.allow_threads(|| match seed {
        Some(seed) => recommend(&snapshot, &config, &mut Pcg64::seed_from_u64(seed)),
        None => recommend_entropy(&snapshot, &config),
    })?;
    Ok(rec)
}

type PredictionArrays<'py> = (
    Bound<'py, PyArray2<f64>>,
    Bound<'py, PyArray1<f64>>,
    Bound<'py, PyArray1<i64>>,
    Bound<'py, PyArray1<i64>>,
);

/// Train on rating data and return `(scores, item_means, item_ids, user_ids)`.
///
/// `data` is any object with `users`, `items` and `ratings` Arrow arrays.
/// `scores` is centered; add `item_means` to each row to get rating-scale
/// values. An empty table gives a 1×1 zero matrix and empty ID arrays.
#[pyfunction]
#[pyo3(name = "recommend", signature = (data, *, config=None, seed=None))]
fn py_recommend<'py>(
    py: Python<'py>,
    data: RatingColumns,
    config: Option<&str>,
    seed: Option<u64>,
) -> PyResult<PredictionArrays<'py>> {
    let rec = run_pipeline(py, data, config, seed)?;
    let item_ids = PyArray1::from_slice(py, rec.items().ids());
    let user_ids = PyArray1::from_slice(py, rec.users().ids());
    let pred = rec.into_prediction();

    Ok((
        PyArray2::from_owned_array(py, pred.scores),
        PyArray1::from_owned_array(py, pred.item_means),
        item_ids,
        user_ids,
    ))
}

/// Train on rating data and return the top `n` unrated items for a
/// user as `(item_id, score)` pairs.
#[pyfunction]
#[pyo3(name = "top_n", signature = (data, user, n, *, config=None, seed=None))]
fn py_top_n(
    py: Python<'_>,
    data: RatingColumns,
    user: i64,
    n: usize,
    config: Option<&str>,
    seed: Option<u64>,
) -> PyResult<Vec<(i64, f64)>> {
    let rec = run_pipeline(py, data, config, seed)?;
    let ranked = rec.top_n(user, n)?;
    Ok(ranked.into_iter().map(|r| (r.item, r.score)).collect())
}

/// Entry point for the Python extension module.
#[pymodule]
fn cofi(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();
    m.add_function(wrap_pyfunction!(py_recommend, m)?)?;
    m.add_function(wrap_pyfunction!(py_top_n, m)?)?;
    Ok(())
}
