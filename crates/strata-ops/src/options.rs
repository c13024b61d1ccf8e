/// Whether two null key values compare equal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NullEquality {
    /// Nulls in the same key column are one value.
    #[default]
    Equal,
    /// Every null is distinct from every other value, other nulls included.
    Unequal,
}

/// Which member of each class of equal rows `distinct` retains.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DuplicateKeep {
    /// Lowest row index.
    #[default]
    First,
    /// Highest row index.
    Last,
    /// Only rows that have no duplicate at all.
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistinctOptions {
    pub nulls: NullEquality,
    pub keep: DuplicateKeep,
    /// Row count at which hashing and deduplication switch to the partitioned parallel
    /// path (only with the `parallel` feature).
    pub parallel_threshold: usize,
}

impl Default for DistinctOptions {
    fn default() -> Self {
        Self {
            nulls: NullEquality::Equal,
            keep: DuplicateKeep::First,
            parallel_threshold: 262_144,
        }
    }
}

impl DistinctOptions {
    pub fn with_nulls(mut self, nulls: NullEquality) -> Self {
        self.nulls = nulls;
        self
    }

    pub fn with_keep(mut self, keep: DuplicateKeep) -> Self {
        self.keep = keep;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReduceOptions {
    /// Row count at which reductions fold chunks concurrently (only with the `parallel`
    /// feature).
    pub parallel_threshold: usize,
    /// Rows per chunk on the parallel path. Chunk boundaries are fixed so floating point
    /// results do not depend on thread scheduling.
    pub chunk_rows: usize,
    /// Minimum number of valid values; below it every aggregation yields null.
    pub min_count: usize,
}

impl Default for ReduceOptions {
    fn default() -> Self {
        Self {
            parallel_threshold: 1 << 20,
            chunk_rows: 65_536,
            min_count: 0,
        }
    }
}

impl ReduceOptions {
    pub fn with_min_count(mut self, min_count: usize) -> Self {
        self.min_count = min_count;
        self
    }
}
