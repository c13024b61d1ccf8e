use crate::row::{RowEq, RowHasher};
use ahash::AHashMap;
use smallvec::SmallVec;

/// Hash index over row handles with pluggable hash and equality strategies.
///
/// Only row indices are stored. Each distinct row seen so far is a *group*; its
/// representative is the first row inserted for it. Buckets chain the groups whose rows
/// share a 64-bit hash, so a collision costs one extra equality check, never a wrong
/// answer.
pub struct RowHashIndex<H, E> {
    hasher: H,
    eq: E,
    buckets: AHashMap<u64, SmallVec<[usize; 1]>>,
    representatives: Vec<usize>,
}

impl<H: RowHasher, E: RowEq> RowHashIndex<H, E> {
    pub fn new(hasher: H, eq: E) -> Self {
        Self::with_capacity(hasher, eq, 0)
    }

    pub fn with_capacity(hasher: H, eq: E, capacity: usize) -> Self {
        Self {
            hasher,
            eq,
            buckets: AHashMap::with_capacity(capacity),
            representatives: Vec::new(),
        }
    }

    /// Find the group `row` belongs to, creating one if needed.
    ///
    /// Returns the group id and whether `row` started a new group.
    pub fn insert(&mut self, row: usize) -> (usize, bool) {
        let hash = self.hasher.hash_row(row);
        let bucket = self.buckets.entry(hash).or_default();
        for &group in bucket.iter() {
            if self.eq.rows_equal(self.representatives[group], row) {
                return (group, false);
            }
        }

        let group = self.representatives.len();
        bucket.push(group);
        self.representatives.push(row);
        (group, true)
    }

    /// Representative row of each group, in group-id (first insertion) order.
    pub fn representatives(&self) -> &[usize] {
        &self.representatives
    }

    pub fn group_count(&self) -> usize {
        self.representatives.len()
    }

    pub fn into_representatives(self) -> Vec<usize> {
        self.representatives
    }
}
