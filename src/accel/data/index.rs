// This file is part of the movie recommendation engine.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Sorted ID index.

use rustc_hash::FxHashMap;

/// Bijection between external IDs and dense positions.
///
/// Positions are assigned by sorting the distinct IDs ascending, so adding
/// a single ID can renumber every later position. Indexes are only
/// meaningful for the snapshot they were built from.
#[derive(Debug, Clone, Default)]
pub struct IdIndex {
    /// The IDs, in position order.
    ids: Vec<i64>,

    /// Lookup table.
    positions: FxHashMap<i64, usize>,
}

impl IdIndex {
    /// Build an index from (possibly repeated) IDs.
    pub fn from_ids<I: IntoIterator<Item = i64>>(ids: I) -> Self {
        let mut ids: Vec<i64> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();

        let positions = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        IdIndex { ids, positions }
    }

    /// Look up the position of an ID.
    pub fn position(&self, id: i64) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Get the ID at a position.
    pub fn id(&self, pos: usize) -> Option<i64> {
        self.ids.get(pos).copied()
    }

    /// Get the ID array.
    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
