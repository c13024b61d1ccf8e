//! Row identity over a set of key columns: hashing and equality on row handles.

mod comparator;
mod hasher;

pub use comparator::{RowComparator, RowEq};
pub use hasher::{combine_hashes, hash_value, RowHashes, RowHasher, NULL_HASH, ROW_HASH_SEED};

use crate::error::{OpsError, OpsResult};
use crate::options::NullEquality;
use strata_columnar::{
    BitVec, ColumnType, ColumnVisitor, DictionaryValues, Primitive, Table, ValueAccess,
};

/// One key column normalized to canonical bits per row.
///
/// The element type and encoding are resolved once while the bits are built; hashing and
/// row equality then run over plain `u64` slices. Null rows hold `0` and are told apart
/// by `validity` only.
pub(crate) struct KeyBits<'a> {
    bits: Vec<u64>,
    validity: Option<&'a BitVec>,
}

impl KeyBits<'_> {
    #[inline]
    fn is_valid(&self, row: usize) -> bool {
        self.validity.map_or(true, |v| v.get(row))
    }

    /// Mix this column's value hashes into `hashes[i]` for rows `start + i`.
    pub(crate) fn hash_into(&self, start: usize, hashes: &mut [u64]) {
        let bits = &self.bits[start..start + hashes.len()];
        match self.validity {
            None => {
                for (h, &b) in hashes.iter_mut().zip(bits) {
                    *h = combine_hashes(*h, hash_value(b));
                }
            }
            Some(validity) => {
                for (offset, (h, &b)) in hashes.iter_mut().zip(bits).enumerate() {
                    let value_hash = if validity.get(start + offset) {
                        hash_value(b)
                    } else {
                        NULL_HASH
                    };
                    *h = combine_hashes(*h, value_hash);
                }
            }
        }
    }

    #[inline]
    pub(crate) fn rows_equal(&self, lhs: usize, rhs: usize, nulls: NullEquality) -> bool {
        match (self.is_valid(lhs), self.is_valid(rhs)) {
            (true, true) => self.bits[lhs] == self.bits[rhs],
            (false, false) => nulls == NullEquality::Equal,
            _ => false,
        }
    }
}

/// Canonical bits of every row, null rows as `0`.
struct Normalize;

impl<'a> ColumnVisitor<'a> for Normalize {
    type Output = Vec<u64>;

    fn visit<T: Primitive, A: ValueAccess<T> + 'a>(
        self,
        _column_type: ColumnType,
        values: A,
    ) -> Vec<u64> {
        if values.null_count() == 0 {
            return (0..values.len())
                .map(|row| values.value(row).canonical_bits())
                .collect();
        }
        (0..values.len())
            .map(|row| values.get(row).map_or(0, |v| v.canonical_bits()))
            .collect()
    }

    /// Canonical bits are computed once per key, then gathered through the indices.
    fn visit_dictionary<T: Primitive>(
        self,
        _column_type: ColumnType,
        values: DictionaryValues<'a, T>,
    ) -> Vec<u64> {
        let key_bits: Vec<u64> = values.keys().iter().map(|k| k.canonical_bits()).collect();
        (0..values.len())
            .map(|row| {
                values
                    .key_id(row)
                    .and_then(|id| key_bits.get(id as usize).copied())
                    .unwrap_or(0)
            })
            .collect()
    }
}

/// The key columns of a table, normalized for hashing and equality.
///
/// Construction validates the key positions and makes one typed pass per key column.
pub struct RowKeys<'a> {
    columns: Vec<KeyBits<'a>>,
    rows: usize,
}

impl<'a> RowKeys<'a> {
    pub fn new(table: &'a Table, key_columns: &[usize]) -> OpsResult<Self> {
        if key_columns.is_empty() {
            return Err(OpsError::EmptyKeySet);
        }

        let mut columns = Vec::with_capacity(key_columns.len());
        for &index in key_columns {
            let column = table.column(index).ok_or(OpsError::InvalidColumnIndex {
                index,
                columns: table.column_count(),
            })?;
            columns.push(KeyBits {
                bits: column.visit(Normalize),
                validity: column.validity(),
            });
        }

        Ok(Self {
            columns,
            rows: table.row_count(),
        })
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn key_count(&self) -> usize {
        self.columns.len()
    }

    pub(crate) fn columns(&self) -> &[KeyBits<'a>] {
        &self.columns
    }

    pub fn hashes(&self) -> RowHashes {
        RowHashes::compute(self)
    }

    pub fn comparator(&self, nulls: NullEquality) -> RowComparator<'_, 'a> {
        RowComparator::new(self, nulls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_columnar::Column;

    fn table() -> Table {
        Table::new(vec![
            Column::from_options("a", [Some(1i32), Some(1), None, None, Some(1)]),
            Column::from_values("b", [0.0f64, -0.0, 2.0, 2.0, f64::NAN]),
        ])
        .unwrap()
    }

    #[test]
    fn equal_rows_hash_identically() {
        let table = table();
        let keys = RowKeys::new(&table, &[0, 1]).unwrap();
        let hashes = keys.hashes();
        let eq = keys.comparator(NullEquality::Equal);

        assert!(eq.rows_equal(0, 1));
        assert_eq!(hashes.hash_row(0), hashes.hash_row(1));
        assert!(eq.rows_equal(2, 3));
        assert_eq!(hashes.hash_row(2), hashes.hash_row(3));
        assert!(!eq.rows_equal(0, 4));
    }

    #[test]
    fn unequal_nulls_never_match() {
        let table = table();
        let keys = RowKeys::new(&table, &[0, 1]).unwrap();
        let hashes = keys.hashes();
        let eq = keys.comparator(NullEquality::Unequal);

        assert_eq!(hashes.hash_row(2), hashes.hash_row(3));
        assert!(!eq.rows_equal(2, 3));
        assert!(eq.rows_equal(0, 1));
    }

    #[test]
    fn column_order_changes_the_hash() {
        let table = Table::new(vec![
            Column::from_values("a", [1i64, 2]),
            Column::from_values("b", [2i64, 1]),
        ])
        .unwrap();
        let ab = RowKeys::new(&table, &[0, 1]).unwrap().hashes();
        let ba = RowKeys::new(&table, &[1, 0]).unwrap().hashes();
        assert_eq!(ab.hash_row(0), ba.hash_row(1));
        assert_ne!(ab.hash_row(0), ab.hash_row(1));
    }

    #[test]
    fn dictionary_keys_hash_like_plain_values() {
        let plain = Column::from_options("a", [Some(7i8), None, Some(3), Some(7)]);
        let table = Table::new(vec![plain.clone(), plain.dictionary_encode()]).unwrap();
        let plain_hashes = RowKeys::new(&table, &[0]).unwrap().hashes();
        let dict_hashes = RowKeys::new(&table, &[1]).unwrap().hashes();
        assert_eq!(plain_hashes, dict_hashes);
    }

    #[test]
    fn dictionary_keys_compare_like_plain_values() {
        // Duplicate keys 4 and 4 at different ids must still compare equal.
        let dict = Column::dictionary(
            "d",
            strata_columnar::ColumnData::Int32(vec![4, 9, 4]),
            vec![0, 2, 1, 0, 5],
            Some([true, true, true, false, false].into_iter().collect()),
        )
        .unwrap();
        let table = Table::new(vec![dict]).unwrap();
        let keys = RowKeys::new(&table, &[0]).unwrap();
        let hashes = keys.hashes();
        let eq = keys.comparator(NullEquality::Equal);

        assert!(eq.rows_equal(0, 1));
        assert_eq!(hashes.hash_row(0), hashes.hash_row(1));
        assert!(!eq.rows_equal(0, 2));
        assert!(eq.rows_equal(3, 4));
        assert!(!keys.comparator(NullEquality::Unequal).rows_equal(3, 4));
    }

    #[test]
    fn key_positions_are_validated() {
        let table = table();
        assert!(matches!(RowKeys::new(&table, &[]), Err(OpsError::EmptyKeySet)));
        assert!(matches!(
            RowKeys::new(&table, &[0, 2]),
            Err(OpsError::InvalidColumnIndex {
                index: 2,
                columns: 2
            })
        ));
    }
}
