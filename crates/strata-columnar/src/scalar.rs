#![forbid(unsafe_code)]

use crate::types::{ColumnType, TimeUnit};
use chrono::{DateTime, Utc};

/// A single typed value that may be null.
///
/// The variant carries the type even when the value is null, so a null MIN over an `Int32`
/// column is still an `Int32` scalar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar {
    Bool8(Option<bool>),
    Int8(Option<i8>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Timestamp(TimeUnit, Option<i64>),
}

impl Scalar {
    /// A null scalar of the given type.
    pub fn null(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::Bool8 => Scalar::Bool8(None),
            ColumnType::Int8 => Scalar::Int8(None),
            ColumnType::Int32 => Scalar::Int32(None),
            ColumnType::Int64 => Scalar::Int64(None),
            ColumnType::Float32 => Scalar::Float32(None),
            ColumnType::Float64 => Scalar::Float64(None),
            ColumnType::Timestamp(unit) => Scalar::Timestamp(unit, None),
        }
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Scalar::Bool8(_) => ColumnType::Bool8,
            Scalar::Int8(_) => ColumnType::Int8,
            Scalar::Int32(_) => ColumnType::Int32,
            Scalar::Int64(_) => ColumnType::Int64,
            Scalar::Float32(_) => ColumnType::Float32,
            Scalar::Float64(_) => ColumnType::Float64,
            Scalar::Timestamp(unit, _) => ColumnType::Timestamp(*unit),
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Scalar::Bool8(v) => v.is_some(),
            Scalar::Int8(v) => v.is_some(),
            Scalar::Int32(v) => v.is_some(),
            Scalar::Int64(v) => v.is_some(),
            Scalar::Float32(v) => v.is_some(),
            Scalar::Float64(v) => v.is_some(),
            Scalar::Timestamp(_, v) => v.is_some(),
        }
    }

    pub fn is_null(&self) -> bool {
        !self.is_valid()
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool8(v) => *v,
            _ => None,
        }
    }

    /// Integer payload of integer and timestamp scalars.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int8(v) => v.map(i64::from),
            Scalar::Int32(v) => v.map(i64::from),
            Scalar::Int64(v) | Scalar::Timestamp(_, v) => *v,
            _ => None,
        }
    }

    /// Numeric payload widened to `f64` (booleans map to 0/1).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Bool8(v) => v.map(|b| if b { 1.0 } else { 0.0 }),
            Scalar::Int8(v) => v.map(f64::from),
            Scalar::Int32(v) => v.map(f64::from),
            Scalar::Int64(v) => v.map(|n| n as f64),
            Scalar::Float32(v) => v.map(f64::from),
            Scalar::Float64(v) => *v,
            Scalar::Timestamp(..) => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Scalar::Timestamp(unit, Some(ticks)) => unit.to_datetime(*ticks),
            _ => None,
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool8(Some(value))
    }
}

impl From<i8> for Scalar {
    fn from(value: i8) -> Self {
        Scalar::Int8(Some(value))
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int32(Some(value))
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int64(Some(value))
    }
}

impl From<f32> for Scalar {
    fn from(value: f32) -> Self {
        Scalar::Float32(Some(value))
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float64(Some(value))
    }
}
