use thiserror::Error;

pub type ColumnarResult<T> = Result<T, ColumnarError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ColumnarError {
    #[error("shape mismatch for column {column}: expected {expected} values, got {actual}")]
    ShapeMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("row {row} out of bounds for column of length {len}")]
    RowOutOfBounds { row: usize, len: usize },

    #[error("column index {index} out of range for table with {columns} columns")]
    InvalidColumnIndex { index: usize, columns: usize },

    #[error("corrupt input: {0}")]
    CorruptInput(String),
}
