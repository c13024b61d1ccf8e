use super::RowKeys;

/// Starting state of every row hash.
pub const ROW_HASH_SEED: u64 = 0x243f_6a88_85a3_08d3;

/// Hash shared by every null, under both null-equality policies.
pub const NULL_HASH: u64 = 0x5851_f42d_4c95_7f2d;

#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Hash of one non-null value, given its canonical bits.
#[inline]
pub fn hash_value(canonical_bits: u64) -> u64 {
    splitmix64(canonical_bits)
}

/// Order-dependent mix of a running row hash with the next column's value hash.
#[inline]
pub fn combine_hashes(seed: u64, value: u64) -> u64 {
    seed ^ value
        .wrapping_add(0x9E3779B97F4A7C15)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2)
}

/// Hash strategy over row handles.
pub trait RowHasher {
    fn hash_row(&self, row: usize) -> u64;
}

impl<H: RowHasher + ?Sized> RowHasher for &H {
    fn hash_row(&self, row: usize) -> u64 {
        (**self).hash_row(row)
    }
}

/// Precomputed hashes for every row of a key set.
///
/// Hashes are built column-at-a-time: each key column runs one type-specialized loop over
/// all rows, so there is no per-row type dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowHashes {
    hashes: Vec<u64>,
}

/// Rows per task when hashing on the thread pool.
#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
const HASH_CHUNK_ROWS: usize = 16_384;

impl RowHashes {
    pub fn compute(keys: &RowKeys<'_>) -> Self {
        let mut hashes = vec![ROW_HASH_SEED; keys.row_count()];
        for key in keys.columns() {
            key.hash_into(0, &mut hashes);
        }
        Self { hashes }
    }

    /// Like [`RowHashes::compute`], splitting the rows across the crate thread pool when
    /// one is available.
    pub fn compute_parallel(keys: &RowKeys<'_>) -> Self {
        #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
        {
            use rayon::prelude::*;

            if let Some(pool) = crate::parallel::rayon_pool() {
                let mut hashes = vec![ROW_HASH_SEED; keys.row_count()];
                pool.install(|| {
                    hashes
                        .par_chunks_mut(HASH_CHUNK_ROWS)
                        .enumerate()
                        .for_each(|(chunk, out)| {
                            for key in keys.columns() {
                                key.hash_into(chunk * HASH_CHUNK_ROWS, out);
                            }
                        });
                });
                return Self { hashes };
            }
        }
        Self::compute(keys)
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.hashes
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

impl RowHasher for RowHashes {
    #[inline]
    fn hash_row(&self, row: usize) -> u64 {
        self.hashes[row]
    }
}
