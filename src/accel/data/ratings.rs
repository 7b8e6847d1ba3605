// This file is part of the movie recommendation engine.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Rating observations and snapshots.

use std::sync::Arc;

use arrow::{
    array::{Array, ArrayRef, AsArray, RecordBatch},
    compute::cast,
    datatypes::{Float64Type, Int64Type},
};
use arrow_schema::DataType;
use log::*;

use crate::errors::{CofiError, Result};

/// A single (user, item, rating) observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rating {
    pub user: i64,
    pub item: i64,
    pub rating: f64,
}

impl Rating {
    pub fn new(user: i64, item: i64, rating: f64) -> Rating {
        Rating { user, item, rating }
    }
}

/// A read-only snapshot of the rating store.
///
/// Training matrices and user/item lookups must come from the same
/// snapshot; indices computed from two different reads of the store will
/// not line up.
#[derive(Debug, Clone)]
pub struct RatingSnapshot {
    ratings: Arc<[Rating]>,
}

impl RatingSnapshot {
    pub fn new(ratings: Vec<Rating>) -> Self {
        RatingSnapshot {
            ratings: ratings.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    /// Iterate over the items a user has rated.
    pub fn items_rated_by(&self, user: i64) -> impl Iterator<Item = i64> + '_ {
        self.ratings
            .iter()
            .filter(move |r| r.user == user)
            .map(|r| r.item)
    }

    /// Build a snapshot from user, item, and rating columns.
    ///
    /// IDs may be any integer type; ratings may be integer or floating-point.
    pub fn from_arrays(users: &dyn Array, items: &dyn Array, ratings: &dyn Array) -> Result<Self> {
        let n = users.len();
        if items.len() != n || ratings.len() != n {
            return Err(CofiError::dimension(
                "rating columns",
                n,
                (items.len(), ratings.len()),
            ));
        }

        let users = id_column("user", users)?;
        let items = id_column("item", items)?;
        let ratings = rating_column(ratings)?;
        let users = users.as_primitive::<Int64Type>();
        let items = items.as_primitive::<Int64Type>();
        let ratings = ratings.as_primitive::<Float64Type>();

        let obs: Vec<Rating> = users
            .values()
            .iter()
            .zip(items.values().iter())
            .zip(ratings.values().iter())
            .map(|((u, i), r)| Rating::new(*u, *i, *r))
            .collect();
        debug!("loaded snapshot with {} ratings", obs.len());

        Ok(RatingSnapshot::new(obs))
    }

    /// Build a snapshot from a record batch with `user_id`, `item_id`, and
    /// `rating` columns.
    pub fn from_record_batch(batch: &RecordBatch) -> Result<Self> {
        let users = named_column(batch, "user_id")?;
        let items = named_column(batch, "item_id")?;
        let ratings = named_column(batch, "rating")?;
        Self::from_arrays(users.as_ref(), items.as_ref(), ratings.as_ref())
    }
}

impl FromIterator<Rating> for RatingSnapshot {
    fn from_iter<T: IntoIterator<Item = Rating>>(iter: T) -> Self {
        RatingSnapshot::new(iter.into_iter().collect())
    }
}

fn named_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .ok_or_else(|| CofiError::InvalidInput(format!("missing column: {}", name)))
}

fn id_column(name: &str, array: &dyn Array) -> Result<ArrayRef> {
    check_nulls(name, array)?;
    match array.data_type() {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32 => Ok(cast(array, &DataType::Int64)?),
        dt => Err(CofiError::InvalidInput(format!(
            "invalid {} ID type {}, expected integer",
            name, dt
        ))),
    }
}

fn rating_column(array: &dyn Array) -> Result<ArrayRef> {
    check_nulls("rating", array)?;
    let dt = array.data_type();
    if dt.is_integer() || dt.is_floating() {
        Ok(cast(array, &DataType::Float64)?)
    } else {
        Err(CofiError::InvalidInput(format!(
            "invalid rating type {}, expected numeric",
            dt
        )))
    }
}

fn check_nulls(name: &str, array: &dyn Array) -> Result<()> {
    if array.null_count() > 0 {
        Err(CofiError::InvalidInput(format!(
            "{} column has {} nulls",
            name,
            array.null_count()
        )))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use arrow::array::{
        Float32Array, Int32Array, Int64Array, Int8Array, StringArray, UInt64Array, UInt8Array,
    };
    use arrow_schema::{Field, Schema};

    use super::*;

    #[test]
    fn test_from_arrays_casts() {
        let users = Int32Array::from(vec![1, 2, 2]);
        let items = Int64Array::from(vec![10, 10, 30]);
        let ratings = Int32Array::from(vec![5, 3, 2]);

        let snap = RatingSnapshot::from_arrays(&users, &items, &ratings).expect("valid input");
        assert_eq!(snap.len(), 3);
        assert_eq!(snap.ratings()[2], Rating::new(2, 30, 2.0));
        assert_eq!(snap.items_rated_by(2).collect::<Vec<_>>(), vec![10, 30]);
    }

    #[test]
    fn test_from_record_batch() {
        let schema = Schema::new(vec![
            Field::new("user_id", DataType::Int64, false),
            Field::new("item_id", DataType::Int64, false),
            Field::new("rating", DataType::Float32, false),
        ]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(Int64Array::from(vec![7, 8])) as ArrayRef,
                Arc::new(Int64Array::from(vec![1, 1])) as ArrayRef,
                Arc::new(Float32Array::from(vec![4.0, 1.0])) as ArrayRef,
            ],
        )
        .expect("valid batch");

        let snap = RatingSnapshot::from_record_batch(&batch).expect("valid input");
        assert_eq!(snap.ratings(), &[Rating::new(7, 1, 4.0), Rating::new(8, 1, 1.0)]);
    }

    #[test]
    fn test_small_int_ids() {
        let users = Int8Array::from(vec![-3, 4]);
        let items = UInt8Array::from(vec![200, 7]);
        let ratings = UInt8Array::from(vec![5, 1]);

        let snap = RatingSnapshot::from_arrays(&users, &items, &ratings).expect("valid input");
        assert_eq!(snap.ratings(), &[Rating::new(-3, 200, 5.0), Rating::new(4, 7, 1.0)]);
    }

    #[test]
    fn test_rejects_u64_ids() {
        let users = UInt64Array::from(vec![1u64]);
        let items = Int32Array::from(vec![1]);
        let ratings = Int32Array::from(vec![1]);
        let res = RatingSnapshot::from_arrays(&users, &items, &ratings);
        assert!(matches!(res, Err(CofiError::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_string_ids() {
        let users = StringArray::from(vec!["a"]);
        let items = Int32Array::from(vec![1]);
        let ratings = Int32Array::from(vec![1]);
        let res = RatingSnapshot::from_arrays(&users, &items, &ratings);
        assert!(matches!(res, Err(CofiError::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_nulls_and_ragged() {
        let users = Int32Array::from(vec![Some(1), None]);
        let items = Int32Array::from(vec![1, 2]);
        let ratings = Int32Array::from(vec![1, 2]);
        assert!(RatingSnapshot::from_arrays(&users, &items, &ratings).is_err());

        let users = Int32Array::from(vec![1]);
        let res = RatingSnapshot::from_arrays(&users, &items, &ratings);
        assert!(matches!(res, Err(CofiError::Dimension { .. })));
    }
}
