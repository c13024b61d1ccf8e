use crate::reduce::Aggregation;
use strata_columnar::{ColumnType, ColumnarError};
use thiserror::Error;

pub type OpsResult<T> = Result<T, OpsError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum OpsError {
    #[error("key column index {index} out of range for table with {columns} columns")]
    InvalidColumnIndex { index: usize, columns: usize },

    #[error("distinct requires at least one key column")]
    EmptyKeySet,

    #[error("aggregation {aggregation} is not supported for {column_type} columns")]
    UnsupportedAggregation {
        aggregation: Aggregation,
        column_type: ColumnType,
    },

    #[error("corrupt input: {0}")]
    CorruptInput(String),

    #[error(transparent)]
    Columnar(#[from] ColumnarError),
}
