#![forbid(unsafe_code)]

use crate::bitmap::BitVec;
use crate::types::Primitive;

/// Uniform "value at row" view over a column, independent of its encoding.
///
/// Implementations are small `Copy` handles borrowing the column buffers, so kernels can
/// pass them by value into per-chunk workers.
pub trait ValueAccess<T: Primitive>: Copy + Send + Sync {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_valid(&self, row: usize) -> bool;

    /// Raw value at `row`. Unspecified (but never a panic) for null rows.
    fn value(&self, row: usize) -> T;

    fn get(&self, row: usize) -> Option<T> {
        if self.is_valid(row) {
            Some(self.value(row))
        } else {
            None
        }
    }

    fn null_count(&self) -> usize;
}

/// A plain typed buffer plus optional validity.
#[derive(Clone, Copy, Debug)]
pub struct PlainValues<'a, T> {
    values: &'a [T],
    validity: Option<&'a BitVec>,
}

impl<'a, T: Primitive> PlainValues<'a, T> {
    pub fn new(values: &'a [T], validity: Option<&'a BitVec>) -> Self {
        Self { values, validity }
    }

    pub fn values(&self) -> &'a [T] {
        self.values
    }

    pub fn validity(&self) -> Option<&'a BitVec> {
        self.validity
    }
}

impl<'a, T: Primitive> ValueAccess<T> for PlainValues<'a, T> {
    #[inline]
    fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    fn is_valid(&self, row: usize) -> bool {
        self.validity.map_or(true, |v| v.get(row))
    }

    #[inline]
    fn value(&self, row: usize) -> T {
        self.values[row]
    }

    fn null_count(&self) -> usize {
        self.validity.map_or(0, BitVec::count_zeros)
    }
}

/// Dictionary-encoded values: `value(row) = keys[indices[row]]`.
///
/// Row validity comes from the index validity only. Nothing is expanded; each access is
/// two array lookups.
#[derive(Clone, Copy, Debug)]
pub struct DictionaryValues<'a, T> {
    keys: &'a [T],
    indices: &'a [u32],
    validity: Option<&'a BitVec>,
}

impl<'a, T: Primitive> DictionaryValues<'a, T> {
    pub fn new(keys: &'a [T], indices: &'a [u32], validity: Option<&'a BitVec>) -> Self {
        Self {
            keys,
            indices,
            validity,
        }
    }

    pub fn keys(&self) -> &'a [T] {
        self.keys
    }

    pub fn indices(&self) -> &'a [u32] {
        self.indices
    }

    pub fn validity(&self) -> Option<&'a BitVec> {
        self.validity
    }

    /// Key id referenced by `row`, or `None` for a null row.
    #[inline]
    pub fn key_id(&self, row: usize) -> Option<u32> {
        if self.is_valid(row) {
            Some(self.indices[row])
        } else {
            None
        }
    }
}

impl<'a, T: Primitive> ValueAccess<T> for DictionaryValues<'a, T> {
    #[inline]
    fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    fn is_valid(&self, row: usize) -> bool {
        self.validity.map_or(true, |v| v.get(row))
    }

    #[inline]
    fn value(&self, row: usize) -> T {
        // Null rows may carry any index; `Column::dictionary` bounds every valid one.
        debug_assert!(
            !self.is_valid(row) || (self.indices[row] as usize) < self.keys.len(),
            "dictionary index {} at valid row {row} exceeds {} keys",
            self.indices[row],
            self.keys.len()
        );
        self.keys
            .get(self.indices[row] as usize)
            .copied()
            .unwrap_or_default()
    }

    fn null_count(&self) -> usize {
        self.validity.map_or(0, BitVec::count_zeros)
    }
}
