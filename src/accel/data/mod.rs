// This file is part of the movie recommendation engine.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Rating data and matrix construction.

mod index;
mod matrix;
mod ratings;

pub use index::IdIndex;
pub use matrix::RatingMatrix;
pub use ratings::{Rating, RatingSnapshot};
