#![forbid(unsafe_code)]

use crate::access::{DictionaryValues, PlainValues, ValueAccess};
use crate::bitmap::BitVec;
use crate::dictionary::{self, Dictionary};
use crate::error::{ColumnarError, ColumnarResult};
use crate::scalar::Scalar;
use crate::types::{ColumnType, Primitive, TimeUnit};
use chrono::{DateTime, Utc};

/// Contiguous typed storage for one column (no validity).
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnData {
    Bool8(Vec<bool>),
    Int8(Vec<i8>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Timestamp { unit: TimeUnit, values: Vec<i64> },
}

/// Expand `$body` once per element type with `$values` bound to the typed buffer and
/// `$ty` to its [`ColumnType`]. This is the only match over [`ColumnData`] variants that
/// kernels go through.
macro_rules! dispatch_data {
    ($data:expr, |$ty:ident, $values:ident| $body:expr) => {
        match $data {
            ColumnData::Bool8($values) => {
                let $ty = ColumnType::Bool8;
                $body
            }
            ColumnData::Int8($values) => {
                let $ty = ColumnType::Int8;
                $body
            }
            ColumnData::Int32($values) => {
                let $ty = ColumnType::Int32;
                $body
            }
            ColumnData::Int64($values) => {
                let $ty = ColumnType::Int64;
                $body
            }
            ColumnData::Float32($values) => {
                let $ty = ColumnType::Float32;
                $body
            }
            ColumnData::Float64($values) => {
                let $ty = ColumnType::Float64;
                $body
            }
            ColumnData::Timestamp {
                unit,
                values: $values,
            } => {
                let $ty = ColumnType::Timestamp(*unit);
                $body
            }
        }
    };
}

impl ColumnData {
    pub fn len(&self) -> usize {
        dispatch_data!(self, |_ty, values| values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_type(&self) -> ColumnType {
        dispatch_data!(self, |ty, _values| ty)
    }

    /// Copy out the values at `rows`. Callers bounds-check `rows`.
    pub(crate) fn gather(&self, rows: &[usize]) -> ColumnData {
        dispatch_data!(self, |ty, values| {
            let picked: Vec<_> = rows.iter().map(|&row| values[row]).collect();
            Primitive::into_data(picked, ty)
        })
    }
}

/// Physical layout of a column's values.
#[derive(Clone, Debug, PartialEq)]
pub enum Encoding {
    Plain(ColumnData),
    Dictionary(Dictionary),
}

/// Callback invoked with a typed, encoding-specific view of a column.
///
/// [`Column::visit`] resolves the element type and encoding once and hands the visitor a
/// monomorphized [`ValueAccess`], so per-row loops inside `visit` never re-dispatch.
pub trait ColumnVisitor<'a>: Sized {
    type Output;

    fn visit<T: Primitive, A: ValueAccess<T> + 'a>(
        self,
        column_type: ColumnType,
        values: A,
    ) -> Self::Output;

    /// Dictionary-encoded columns land here first. Override to exploit the keys directly;
    /// the default treats the dictionary as just another `ValueAccess`.
    fn visit_dictionary<T: Primitive>(
        self,
        column_type: ColumnType,
        values: DictionaryValues<'a, T>,
    ) -> Self::Output {
        self.visit(column_type, values)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    name: String,
    encoding: Encoding,
    validity: Option<BitVec>,
}

fn normalize_validity(validity: Option<BitVec>) -> Option<BitVec> {
    validity.filter(|v| !v.all_true())
}

impl Column {
    /// Build a plain column from a typed buffer and an optional validity bitmap.
    pub fn new(
        name: impl Into<String>,
        data: ColumnData,
        validity: Option<BitVec>,
    ) -> ColumnarResult<Self> {
        let name = name.into();
        if let Some(v) = &validity {
            if v.len() != data.len() {
                return Err(ColumnarError::ShapeMismatch {
                    column: name,
                    expected: data.len(),
                    actual: v.len(),
                });
            }
        }

        Ok(Self {
            name,
            encoding: Encoding::Plain(data),
            validity: normalize_validity(validity),
        })
    }

    /// Build a dictionary-encoded column.
    ///
    /// Every index of a valid row must address a key; null rows may carry any index.
    pub fn dictionary(
        name: impl Into<String>,
        keys: ColumnData,
        indices: Vec<u32>,
        validity: Option<BitVec>,
    ) -> ColumnarResult<Self> {
        let name = name.into();
        if let Some(v) = &validity {
            if v.len() != indices.len() {
                return Err(ColumnarError::ShapeMismatch {
                    column: name,
                    expected: indices.len(),
                    actual: v.len(),
                });
            }
        }

        let key_count = keys.len();
        for (row, &idx) in indices.iter().enumerate() {
            let valid = validity.as_ref().map_or(true, |v| v.get(row));
            if valid && idx as usize >= key_count {
                return Err(ColumnarError::CorruptInput(format!(
                    "dictionary index {idx} at row {row} of column {name} exceeds {key_count} keys"
                )));
            }
        }

        Ok(Self {
            name,
            encoding: Encoding::Dictionary(Dictionary::new(keys, indices)),
            validity: normalize_validity(validity),
        })
    }

    pub fn from_values<T: Primitive>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        let values: Vec<T> = values.into_iter().collect();
        Self {
            name: name.into(),
            encoding: Encoding::Plain(T::into_data(values, T::COLUMN_TYPE)),
            validity: None,
        }
    }

    /// Build a plain column where `None` marks a null row.
    pub fn from_options<T: Primitive>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = Option<T>>,
    ) -> Self {
        let (values, validity) = split_options(values);
        Self {
            name: name.into(),
            encoding: Encoding::Plain(T::into_data(values, T::COLUMN_TYPE)),
            validity: normalize_validity(Some(validity)),
        }
    }

    /// Build a plain column from parallel value / validity iterators.
    pub fn from_values_with_validity<T: Primitive>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = T>,
        validity: impl IntoIterator<Item = bool>,
    ) -> ColumnarResult<Self> {
        let values: Vec<T> = values.into_iter().collect();
        let validity: BitVec = validity.into_iter().collect();
        Self::new(name, T::into_data(values, T::COLUMN_TYPE), Some(validity))
    }

    /// Build a timestamp column from tick counts of `unit`.
    pub fn timestamps(
        name: impl Into<String>,
        unit: TimeUnit,
        ticks: impl IntoIterator<Item = Option<i64>>,
    ) -> Self {
        let (values, validity) = split_options(ticks);
        Self {
            name: name.into(),
            encoding: Encoding::Plain(ColumnData::Timestamp { unit, values }),
            validity: normalize_validity(Some(validity)),
        }
    }

    /// Build a timestamp column from UTC datetimes, truncated to `unit`.
    pub fn from_datetimes(
        name: impl Into<String>,
        unit: TimeUnit,
        values: impl IntoIterator<Item = Option<DateTime<Utc>>>,
    ) -> ColumnarResult<Self> {
        let name = name.into();
        let mut ticks = Vec::new();
        for value in values {
            match value {
                None => ticks.push(None),
                Some(dt) => {
                    let t = unit.from_datetime(&dt).ok_or_else(|| {
                        ColumnarError::CorruptInput(format!(
                            "datetime {dt} does not fit column {name} at {unit:?} precision"
                        ))
                    })?;
                    ticks.push(Some(t));
                }
            }
        }
        Ok(Self::timestamps(name, unit, ticks))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        match &self.encoding {
            Encoding::Plain(data) => data.column_type(),
            Encoding::Dictionary(dict) => dict.keys().column_type(),
        }
    }

    pub fn len(&self) -> usize {
        match &self.encoding {
            Encoding::Plain(data) => data.len(),
            Encoding::Dictionary(dict) => dict.indices().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn encoding(&self) -> &Encoding {
        &self.encoding
    }

    pub fn is_dictionary(&self) -> bool {
        matches!(self.encoding, Encoding::Dictionary(_))
    }

    pub fn validity(&self) -> Option<&BitVec> {
        self.validity.as_ref()
    }

    pub fn null_count(&self) -> usize {
        self.validity.as_ref().map_or(0, BitVec::count_zeros)
    }

    pub fn has_nulls(&self) -> bool {
        self.null_count() > 0
    }

    /// O(1) validity check. Rows past the end report invalid.
    pub fn is_valid(&self, row: usize) -> bool {
        row < self.len() && self.validity.as_ref().map_or(true, |v| v.get(row))
    }

    /// Typed value-or-null at `row`.
    pub fn scalar_at(&self, row: usize) -> ColumnarResult<Scalar> {
        if row >= self.len() {
            return Err(ColumnarError::RowOutOfBounds {
                row,
                len: self.len(),
            });
        }
        Ok(self.visit(ScalarAt { row }))
    }

    /// Resolve element type and encoding once, then run `visitor` on the typed view.
    pub fn visit<'a, V: ColumnVisitor<'a>>(&'a self, visitor: V) -> V::Output {
        let validity = self.validity.as_ref();
        match &self.encoding {
            Encoding::Plain(data) => dispatch_data!(data, |ty, values| {
                visitor.visit(ty, PlainValues::new(values, validity))
            }),
            Encoding::Dictionary(dict) => {
                let indices = dict.indices();
                dispatch_data!(dict.keys(), |ty, keys| {
                    visitor.visit_dictionary(ty, DictionaryValues::new(keys, indices, validity))
                })
            }
        }
    }

    /// New column holding the rows at `rows`, in order. Dictionary columns keep their keys.
    pub fn gather(&self, rows: &[usize]) -> ColumnarResult<Column> {
        let len = self.len();
        if let Some(&row) = rows.iter().find(|&&row| row >= len) {
            return Err(ColumnarError::RowOutOfBounds { row, len });
        }

        let encoding = match &self.encoding {
            Encoding::Plain(data) => Encoding::Plain(data.gather(rows)),
            Encoding::Dictionary(dict) => Encoding::Dictionary(dict.gather(rows)),
        };
        Ok(Column {
            name: self.name.clone(),
            encoding,
            validity: normalize_validity(self.validity.as_ref().map(|v| v.gather(rows))),
        })
    }

    /// Dictionary-encode this column (keys sorted ascending). Already-encoded columns are
    /// returned as-is.
    pub fn dictionary_encode(&self) -> Column {
        match &self.encoding {
            Encoding::Dictionary(_) => self.clone(),
            Encoding::Plain(_) => Column {
                name: self.name.clone(),
                encoding: Encoding::Dictionary(self.visit(dictionary::Encode)),
                validity: self.validity.clone(),
            },
        }
    }

    /// Materialize a plain column with the same logical values.
    pub fn decode(&self) -> Column {
        match &self.encoding {
            Encoding::Plain(_) => self.clone(),
            Encoding::Dictionary(_) => Column {
                name: self.name.clone(),
                encoding: Encoding::Plain(self.visit(dictionary::Decode)),
                validity: self.validity.clone(),
            },
        }
    }
}

fn split_options<T: Primitive>(values: impl IntoIterator<Item = Option<T>>) -> (Vec<T>, BitVec) {
    let values = values.into_iter();
    let (lower, _) = values.size_hint();
    let mut out = Vec::with_capacity(lower);
    let mut validity = BitVec::with_capacity_bits(lower);
    for value in values {
        validity.push(value.is_some());
        out.push(value.unwrap_or_default());
    }
    (out, validity)
}

struct ScalarAt {
    row: usize,
}

impl<'a> ColumnVisitor<'a> for ScalarAt {
    type Output = Scalar;

    fn visit<T: Primitive, A: ValueAccess<T> + 'a>(
        self,
        column_type: ColumnType,
        values: A,
    ) -> Scalar {
        T::into_scalar(values.get(self.row), column_type)
    }
}
