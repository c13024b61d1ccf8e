#![forbid(unsafe_code)]

use crate::column::Column;
use crate::error::{ColumnarError, ColumnarResult};

/// An ordered set of columns sharing one row count.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// Build a table; every column must have the same length as the first.
    pub fn new(columns: Vec<Column>) -> ColumnarResult<Self> {
        let rows = columns.first().map_or(0, Column::len);
        if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
            return Err(ColumnarError::ShapeMismatch {
                column: bad.name().to_owned(),
                expected: rows,
                actual: bad.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    /// A new table holding the columns at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> ColumnarResult<Table> {
        let mut columns = Vec::with_capacity(indices.len());
        for &index in indices {
            let column = self
                .columns
                .get(index)
                .ok_or(ColumnarError::InvalidColumnIndex {
                    index,
                    columns: self.columns.len(),
                })?;
            columns.push(column.clone());
        }
        Ok(Table {
            columns,
            rows: self.rows,
        })
    }

    /// A new table holding the rows at `rows`, in that order.
    pub fn gather(&self, rows: &[usize]) -> ColumnarResult<Table> {
        let columns = self
            .columns
            .iter()
            .map(|c| c.gather(rows))
            .collect::<ColumnarResult<Vec<_>>>()?;
        Ok(Table {
            columns,
            rows: rows.len(),
        })
    }
}
