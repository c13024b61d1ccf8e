#![forbid(unsafe_code)]

use crate::column::ColumnData;
use crate::scalar::Scalar;
use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Seconds,
    Milliseconds,
    Microseconds,
    Nanoseconds,
}

impl TimeUnit {
    fn ticks_per_second(self) -> i64 {
        match self {
            TimeUnit::Seconds => 1,
            TimeUnit::Milliseconds => 1_000,
            TimeUnit::Microseconds => 1_000_000,
            TimeUnit::Nanoseconds => 1_000_000_000,
        }
    }

    /// Convert ticks since the Unix epoch into a UTC datetime.
    ///
    /// Returns `None` when the instant is outside chrono's representable range.
    pub fn to_datetime(self, ticks: i64) -> Option<DateTime<Utc>> {
        let per_second = self.ticks_per_second();
        let secs = ticks.div_euclid(per_second);
        let sub = ticks.rem_euclid(per_second);
        let nanos = sub * (1_000_000_000 / per_second);
        DateTime::from_timestamp(secs, u32::try_from(nanos).ok()?)
    }

    /// Convert a UTC datetime into ticks of this unit, truncating sub-unit precision.
    ///
    /// Returns `None` when the instant does not fit into an `i64` tick count.
    pub fn from_datetime(self, value: &DateTime<Utc>) -> Option<i64> {
        match self {
            TimeUnit::Seconds => Some(value.timestamp()),
            TimeUnit::Milliseconds => Some(value.timestamp_millis()),
            TimeUnit::Microseconds => Some(value.timestamp_micros()),
            TimeUnit::Nanoseconds => value.timestamp_nanos_opt(),
        }
    }
}

/// Logical element type of a column.
///
/// This is the one place that maps native element types to type identifiers; every
/// hashing, comparison and aggregation kernel dispatches on it through
/// [`crate::ColumnVisitor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Bool8,
    Int8,
    Int32,
    Int64,
    Float32,
    Float64,
    Timestamp(TimeUnit),
}

impl ColumnType {
    pub fn is_boolean(self) -> bool {
        matches!(self, ColumnType::Bool8)
    }

    pub fn is_integer(self) -> bool {
        matches!(self, ColumnType::Int8 | ColumnType::Int32 | ColumnType::Int64)
    }

    pub fn is_floating(self) -> bool {
        matches!(self, ColumnType::Float32 | ColumnType::Float64)
    }

    pub fn is_timestamp(self) -> bool {
        matches!(self, ColumnType::Timestamp(_))
    }

    /// Integers and floats; booleans and timestamps are excluded.
    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_floating()
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Bool8 => f.write_str("bool8"),
            ColumnType::Int8 => f.write_str("int8"),
            ColumnType::Int32 => f.write_str("int32"),
            ColumnType::Int64 => f.write_str("int64"),
            ColumnType::Float32 => f.write_str("float32"),
            ColumnType::Float64 => f.write_str("float64"),
            ColumnType::Timestamp(TimeUnit::Seconds) => f.write_str("timestamp[s]"),
            ColumnType::Timestamp(TimeUnit::Milliseconds) => f.write_str("timestamp[ms]"),
            ColumnType::Timestamp(TimeUnit::Microseconds) => f.write_str("timestamp[us]"),
            ColumnType::Timestamp(TimeUnit::Nanoseconds) => f.write_str("timestamp[ns]"),
        }
    }
}

const CANONICAL_NAN_F32: u32 = 0x7fc0_0000;
const CANONICAL_NAN_F64: u64 = 0x7ff8_0000_0000_0000;

/// A native element type that can back a column buffer.
///
/// `canonical_bits` is the identity used for hashing and row equality: two values are
/// "the same key" iff their canonical bits match. Floats fold `-0.0` into `+0.0` and every
/// NaN payload into one canonical NaN, so hash-equal values are always comparator-equal.
pub trait Primitive: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Native column type for this element (timestamps reuse the `i64` storage).
    const COLUMN_TYPE: ColumnType;

    fn canonical_bits(self) -> u64;

    /// Non-zero test used by ALL / ANY.
    fn is_truthy(self) -> bool;

    fn to_f64(self) -> f64;

    /// Integer view used by exact integer sums; `None` for floating point.
    fn to_i64(self) -> Option<i64>;

    /// Total order used by MIN / MAX. Floats order NaN above every number.
    fn total_cmp(&self, other: &Self) -> Ordering;

    fn into_data(values: Vec<Self>, column_type: ColumnType) -> ColumnData;

    fn into_scalar(value: Option<Self>, column_type: ColumnType) -> Scalar;
}

impl Primitive for bool {
    const COLUMN_TYPE: ColumnType = ColumnType::Bool8;

    fn canonical_bits(self) -> u64 {
        self as u64
    }

    fn is_truthy(self) -> bool {
        self
    }

    fn to_f64(self) -> f64 {
        if self {
            1.0
        } else {
            0.0
        }
    }

    fn to_i64(self) -> Option<i64> {
        Some(self as i64)
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn into_data(values: Vec<Self>, _column_type: ColumnType) -> ColumnData {
        ColumnData::Bool8(values)
    }

    fn into_scalar(value: Option<Self>, _column_type: ColumnType) -> Scalar {
        Scalar::Bool8(value)
    }
}

macro_rules! impl_integer_primitive {
    ($native:ty, $variant:ident) => {
        impl Primitive for $native {
            const COLUMN_TYPE: ColumnType = ColumnType::$variant;

            fn canonical_bits(self) -> u64 {
                self as i64 as u64
            }

            fn is_truthy(self) -> bool {
                self != 0
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn to_i64(self) -> Option<i64> {
                Some(self as i64)
            }

            fn total_cmp(&self, other: &Self) -> Ordering {
                self.cmp(other)
            }

            fn into_data(values: Vec<Self>, _column_type: ColumnType) -> ColumnData {
                ColumnData::$variant(values)
            }

            fn into_scalar(value: Option<Self>, _column_type: ColumnType) -> Scalar {
                Scalar::$variant(value)
            }
        }
    };
}

impl_integer_primitive!(i8, Int8);
impl_integer_primitive!(i32, Int32);

impl Primitive for i64 {
    const COLUMN_TYPE: ColumnType = ColumnType::Int64;

    fn canonical_bits(self) -> u64 {
        self as u64
    }

    fn is_truthy(self) -> bool {
        self != 0
    }

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn to_i64(self) -> Option<i64> {
        Some(self)
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn into_data(values: Vec<Self>, column_type: ColumnType) -> ColumnData {
        match column_type {
            ColumnType::Timestamp(unit) => ColumnData::Timestamp { unit, values },
            _ => ColumnData::Int64(values),
        }
    }

    fn into_scalar(value: Option<Self>, column_type: ColumnType) -> Scalar {
        match column_type {
            ColumnType::Timestamp(unit) => Scalar::Timestamp(unit, value),
            _ => Scalar::Int64(value),
        }
    }
}

impl Primitive for f32 {
    const COLUMN_TYPE: ColumnType = ColumnType::Float32;

    fn canonical_bits(self) -> u64 {
        if self.is_nan() {
            CANONICAL_NAN_F32 as u64
        } else if self == 0.0 {
            0
        } else {
            self.to_bits() as u64
        }
    }

    fn is_truthy(self) -> bool {
        self != 0.0
    }

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn to_i64(self) -> Option<i64> {
        None
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        OrderedFloat(*self).cmp(&OrderedFloat(*other))
    }

    fn into_data(values: Vec<Self>, _column_type: ColumnType) -> ColumnData {
        ColumnData::Float32(values)
    }

    fn into_scalar(value: Option<Self>, _column_type: ColumnType) -> Scalar {
        Scalar::Float32(value)
    }
}

impl Primitive for f64 {
    const COLUMN_TYPE: ColumnType = ColumnType::Float64;

    fn canonical_bits(self) -> u64 {
        if self.is_nan() {
            CANONICAL_NAN_F64
        } else if self == 0.0 {
            0
        } else {
            self.to_bits()
        }
    }

    fn is_truthy(self) -> bool {
        self != 0.0
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn to_i64(self) -> Option<i64> {
        None
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        OrderedFloat(*self).cmp(&OrderedFloat(*other))
    }

    fn into_data(values: Vec<Self>, _column_type: ColumnType) -> ColumnData {
        ColumnData::Float64(values)
    }

    fn into_scalar(value: Option<Self>, _column_type: ColumnType) -> Scalar {
        Scalar::Float64(value)
    }
}
