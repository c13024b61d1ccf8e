#![forbid(unsafe_code)]

use crate::access::ValueAccess;
use crate::column::{ColumnData, ColumnVisitor};
use crate::types::{ColumnType, Primitive};
use std::collections::HashMap;

/// Keys plus per-row key indices.
///
/// Keys never hold nulls; a null row is expressed through the owning column's validity.
#[derive(Clone, Debug, PartialEq)]
pub struct Dictionary {
    keys: ColumnData,
    indices: Vec<u32>,
}

impl Dictionary {
    pub(crate) fn new(keys: ColumnData, indices: Vec<u32>) -> Self {
        Self { keys, indices }
    }

    pub fn keys(&self) -> &ColumnData {
        &self.keys
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn gather(&self, rows: &[usize]) -> Dictionary {
        Dictionary {
            keys: self.keys.clone(),
            indices: rows.iter().map(|&row| self.indices[row]).collect(),
        }
    }
}

/// Builds a [`Dictionary`] from a plain column's valid values.
pub(crate) struct Encode;

impl<'a> ColumnVisitor<'a> for Encode {
    type Output = Dictionary;

    fn visit<T: Primitive, A: ValueAccess<T> + 'a>(
        self,
        column_type: ColumnType,
        values: A,
    ) -> Dictionary {
        // Intern by canonical bits so -0.0/+0.0 and NaN payloads share one key.
        let mut interned: HashMap<u64, u32> = HashMap::new();
        let mut keys: Vec<T> = Vec::new();
        let mut first_pass: Vec<u32> = Vec::with_capacity(values.len());

        for row in 0..values.len() {
            let Some(value) = values.get(row) else {
                first_pass.push(0);
                continue;
            };
            let next = keys.len() as u32;
            let id = *interned.entry(value.canonical_bits()).or_insert_with(|| {
                keys.push(value);
                next
            });
            first_pass.push(id);
        }

        // Sorted keys make MIN/MAX over the dictionary a lookup and keep output stable.
        let mut order: Vec<u32> = (0..keys.len() as u32).collect();
        order.sort_by(|&a, &b| keys[a as usize].total_cmp(&keys[b as usize]));
        let mut remap = vec![0u32; keys.len()];
        for (new_id, &old_id) in order.iter().enumerate() {
            remap[old_id as usize] = new_id as u32;
        }

        let sorted_keys: Vec<T> = order.iter().map(|&id| keys[id as usize]).collect();
        let indices = first_pass
            .into_iter()
            .enumerate()
            .map(|(row, id)| if values.is_valid(row) { remap[id as usize] } else { 0 })
            .collect();

        Dictionary::new(Primitive::into_data(sorted_keys, column_type), indices)
    }
}

/// Expands any column into a plain buffer (null rows hold the type's default value).
pub(crate) struct Decode;

impl<'a> ColumnVisitor<'a> for Decode {
    type Output = ColumnData;

    fn visit<T: Primitive, A: ValueAccess<T> + 'a>(
        self,
        column_type: ColumnType,
        values: A,
    ) -> ColumnData {
        let out: Vec<T> = (0..values.len())
            .map(|row| values.get(row).unwrap_or_default())
            .collect();
        T::into_data(out, column_type)
    }
}
