use super::RowKeys;
use crate::options::NullEquality;

/// Equality strategy over row handles.
pub trait RowEq {
    fn rows_equal(&self, lhs: usize, rhs: usize) -> bool;
}

impl<E: RowEq + ?Sized> RowEq for &E {
    fn rows_equal(&self, lhs: usize, rhs: usize) -> bool {
        (**self).rows_equal(lhs, rhs)
    }
}

/// Compares two rows of a key set under a null-equality policy.
///
/// Key columns are checked left to right and the first mismatch wins. Non-null values are
/// compared by their normalized canonical bits, the same identity the row hasher uses, so
/// comparator-equal rows are hash-equal.
#[derive(Clone, Copy)]
pub struct RowComparator<'k, 'a> {
    keys: &'k RowKeys<'a>,
    nulls: NullEquality,
}

impl<'k, 'a> RowComparator<'k, 'a> {
    pub fn new(keys: &'k RowKeys<'a>, nulls: NullEquality) -> Self {
        Self { keys, nulls }
    }

    pub fn nulls(&self) -> NullEquality {
        self.nulls
    }
}

impl RowEq for RowComparator<'_, '_> {
    #[inline]
    fn rows_equal(&self, lhs: usize, rhs: usize) -> bool {
        match self.keys.columns() {
            [key] => key.rows_equal(lhs, rhs, self.nulls),
            keys => keys.iter().all(|key| key.rows_equal(lhs, rhs, self.nulls)),
        }
    }
}
