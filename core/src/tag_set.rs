//! Deduplicating set of tag identifiers seen during one window
//!
//! Backed by a sorted `heapless::Vec`, so iteration order is ascending by
//! identifier and stable for as long as the set is not mutated.

use heapless::Vec;

use crate::epc::TagId;
use crate::error::TagSetFull;

/// Identifiers the default set can hold
pub const DEFAULT_TAG_CAPACITY: usize = 256;

#[derive(Debug, Clone, Default)]
pub struct TagSet<const N: usize = DEFAULT_TAG_CAPACITY> {
    tags: Vec<TagId, N>,
}

impl<const N: usize> TagSet<N> {
    pub const fn new() -> Self {
        Self { tags: Vec::new() }
    }

    /// Insert `id`, returning `true` if it was not present yet
    ///
    /// Re-inserting a known identifier succeeds even when the set is full.
    pub fn insert(&mut self, id: TagId) -> Result<bool, TagSetFull> {
        match self.tags.binary_search(&id) {
            Ok(_) => Ok(false),
            Err(pos) => self
                .tags
                .insert(pos, id)
                .map(|()| true)
                .map_err(|_| TagSetFull),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tags
            .binary_search_by(|probe| probe.as_str().cmp(id))
            .is_ok()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn capacity(&self) -> usize {
        N
    }

    /// Identifiers in ascending order
    pub fn as_slice(&self) -> &[TagId] {
        &self.tags
    }

    pub fn iter(&self) -> core::slice::Iter<'_, TagId> {
        self.tags.iter()
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }
}
