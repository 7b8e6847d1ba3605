// This file is part of the movie recommendation engine.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Error types for the factorization engine.

use arrow_schema::ArrowError;
use thiserror::Error;

/// Errors raised by the collaborative-filtering pipeline.
#[derive(Error, Debug)]
pub enum CofiError {
    /// Two arrays that must agree in shape do not.
    #[error("dimension mismatch for {what}: expected {expected}, found {actual}")]
    Dimension {
        what: &'static str,
        expected: String,
        actual: String,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("user {0} has no ratings in this snapshot")]
    UnknownUser(i64),
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
}

pub type Result<T> = std::result::Result<T, CofiError>;

impl CofiError {
    pub(crate) fn dimension<E: std::fmt::Debug, A: std::fmt::Debug>(
        what: &'static str,
        expected: E,
        actual: A,
    ) -> Self {
        CofiError::Dimension {
            what,
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        }
    }
}

/// Check that an array has the expected shape.
macro_rules! check_shape {
    ($what:expr, $arr:expr, $shape:expr) => {
        if $arr.shape() != &$shape[..] {
            return Err($crate::errors::CofiError::dimension(
                $what,
                &$shape[..],
                $arr.shape(),
            ));
        }
    };
}

pub(crate) use check_shape;

#[cfg(feature = "python")]
impl From<CofiError> for pyo3::PyErr {
    fn from(err: CofiError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyKeyError, PyTypeError, PyValueError};
        match err {
            CofiError::UnknownUser(_) => PyKeyError::new_err(err.to_string()),
            CofiError::InvalidInput(_) | CofiError::Arrow(_) => {
                PyTypeError::new_err(err.to_string())
            }
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}
