//! Dedup-by-id merge of record batches into a running collection

use crate::storage::Keyed;
use std::collections::HashSet;

/// What to do with records that carry no identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unkeyed {
    /// Append them; they cannot collide with anything
    Keep,
    /// Leave them out of the merge
    Drop,
}

/// Set of identifiers already present in a collection
#[derive(Debug, Clone, Default)]
pub struct IdIndex {
    ids: HashSet<String>,
}

impl IdIndex {
    /// Creates an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index over every keyed record of `records`
    pub fn from_records<T: Keyed>(records: &[T]) -> Self {
        let ids = records
            .iter()
            .filter_map(|r| r.key())
            .map(str::to_string)
            .collect();
        Self { ids }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Records `id`, returning false if it was already known
    pub fn insert(&mut self, id: &str) -> bool {
        self.ids.insert(id.to_string())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Appends the records of `batch` whose id is not yet in `index`
///
/// First-seen wins: a record whose id is already indexed (from the existing
/// collection or from earlier in the same batch) is discarded. Returns the
/// number of records appended.
pub fn merge_new<T: Keyed>(
    collection: &mut Vec<T>,
    index: &mut IdIndex,
    batch: Vec<T>,
    unkeyed: Unkeyed,
) -> usize {
    let before = collection.len();

    for record in batch {
        let accept = match record.key() {
            Some(id) => index.insert(id),
            None => unkeyed == Unkeyed::Keep,
        };
        if accept {
            collection.push(record);
        }
    }

    collection.len() - before
}
