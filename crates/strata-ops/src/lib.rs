//! Row-oriented and column-oriented operators over [`strata_columnar`] tables.
//!
//! - [`distinct`]: indices of the first occurrence of every distinct key row, with
//!   configurable null equality.
//! - [`reduce`]: single-scalar aggregations over a column, reading dictionary-encoded
//!   columns through their keys instead of expanding them.
//!
//! With the default `parallel` feature, large inputs are processed on a crate-local Rayon
//! pool. Results never depend on whether the parallel path ran.

#![forbid(unsafe_code)]

mod distinct;
mod error;
mod hash_index;
mod options;
mod parallel;
mod reduce;
pub mod row;

pub use crate::distinct::{distinct, distinct_count, distinct_table, distinct_with_options};
pub use crate::error::{OpsError, OpsResult};
pub use crate::hash_index::RowHashIndex;
pub use crate::options::{DistinctOptions, DuplicateKeep, NullEquality, ReduceOptions};
pub use crate::reduce::{reduce, reduce_with_options, Aggregation};
pub use crate::row::{RowComparator, RowEq, RowHashes, RowHasher, RowKeys};
