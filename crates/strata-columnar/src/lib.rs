//! Typed, nullable columnar storage for Strata.
//!
//! This crate focuses on:
//! - Contiguous typed buffers with an optional validity bitmap per column.
//! - Dictionary encoding (keys + per-row indices) that is never expanded on read.
//! - A single type-dispatch point ([`ColumnVisitor`]) so compute kernels are written once
//!   against [`ValueAccess`] and work for plain and dictionary-encoded columns alike.

#![forbid(unsafe_code)]

mod access;
mod bitmap;
mod column;
mod dictionary;
mod error;
mod scalar;
mod table;
mod types;

pub use crate::access::{DictionaryValues, PlainValues, ValueAccess};
pub use crate::bitmap::BitVec;
pub use crate::column::{Column, ColumnData, ColumnVisitor, Encoding};
pub use crate::dictionary::Dictionary;
pub use crate::error::{ColumnarError, ColumnarResult};
pub use crate::scalar::Scalar;
pub use crate::table::Table;
pub use crate::types::{ColumnType, Primitive, TimeUnit};
