//! Distinct rows: first-occurrence row indices of a table under a null-equality policy.

use crate::error::OpsResult;
use crate::hash_index::RowHashIndex;
use crate::options::{DistinctOptions, DuplicateKeep, NullEquality};
use crate::row::{RowComparator, RowHashes, RowKeys};
use strata_columnar::Table;

/// Row indices of `table` that are the lowest index of their class of equal key rows,
/// in ascending order.
pub fn distinct(
    table: &Table,
    key_columns: &[usize],
    nulls: NullEquality,
) -> OpsResult<Vec<usize>> {
    distinct_with_options(
        table,
        key_columns,
        &DistinctOptions::default().with_nulls(nulls),
    )
}

/// [`distinct`] with an explicit keep policy and parallelism threshold.
///
/// The result is always ascending and does not depend on whether the parallel path ran.
pub fn distinct_with_options(
    table: &Table,
    key_columns: &[usize],
    options: &DistinctOptions,
) -> OpsResult<Vec<usize>> {
    let keys = RowKeys::new(table, key_columns)?;
    let rows = keys.row_count();
    if rows == 0 {
        return Ok(Vec::new());
    }

    let parallel = rows >= options.parallel_threshold;
    let hashes = if parallel {
        RowHashes::compute_parallel(&keys)
    } else {
        keys.hashes()
    };
    let eq = keys.comparator(options.nulls);

    let retained = if parallel {
        resolve_partitioned(&hashes, eq, rows, options.keep)
    } else {
        let mut out = resolve(&hashes, eq, 0..rows, rows, options.keep);
        if options.keep == DuplicateKeep::Last {
            out.sort_unstable();
        }
        out
    };

    log::debug!(
        "distinct: rows={rows} keys={} nulls={:?} keep={:?} parallel={parallel} retained={}",
        keys.key_count(),
        options.nulls,
        options.keep,
        retained.len()
    );
    Ok(retained)
}

/// Number of distinct key rows (classes) in `table`.
pub fn distinct_count(
    table: &Table,
    key_columns: &[usize],
    nulls: NullEquality,
) -> OpsResult<usize> {
    let keys = RowKeys::new(table, key_columns)?;
    let hashes = keys.hashes();
    let eq = keys.comparator(nulls);
    let mut index = RowHashIndex::with_capacity(&hashes, eq, keys.row_count());
    for row in 0..keys.row_count() {
        index.insert(row);
    }
    Ok(index.group_count())
}

/// Gather the rows retained by [`distinct_with_options`] into a new table (all columns,
/// not just the keys).
pub fn distinct_table(
    table: &Table,
    key_columns: &[usize],
    options: &DistinctOptions,
) -> OpsResult<Table> {
    let rows = distinct_with_options(table, key_columns, options)?;
    Ok(table.gather(&rows)?)
}

/// Deduplicate `rows` (ascending) and return the retained rows for `keep`.
///
/// Ascending input makes the first inserted row of each group its lowest index. The
/// output is ascending for `First` and `None`; `Last` needs a sort by the caller.
fn resolve(
    hashes: &RowHashes,
    eq: RowComparator<'_, '_>,
    rows: impl Iterator<Item = usize>,
    capacity: usize,
    keep: DuplicateKeep,
) -> Vec<usize> {
    let mut index = RowHashIndex::with_capacity(hashes, eq, capacity);
    match keep {
        DuplicateKeep::First => rows.filter(|&row| index.insert(row).1).collect(),
        DuplicateKeep::Last => {
            let mut last = Vec::new();
            for row in rows {
                let (group, inserted) = index.insert(row);
                if inserted {
                    last.push(row);
                } else {
                    last[group] = row;
                }
            }
            last
        }
        DuplicateKeep::None => {
            let mut counts: Vec<u32> = Vec::new();
            for row in rows {
                let (group, inserted) = index.insert(row);
                if inserted {
                    counts.push(1);
                } else {
                    counts[group] = counts[group].saturating_add(1);
                }
            }
            index
                .into_representatives()
                .into_iter()
                .zip(counts)
                .filter_map(|(row, count)| (count == 1).then_some(row))
                .collect()
        }
    }
}

/// Two-phase parallel distinct: rows are partitioned by hash (equal rows always share a
/// partition), each partition is resolved in ascending row order on its own, and the
/// retained rows are merged and sorted.
#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
fn resolve_partitioned(
    hashes: &RowHashes,
    eq: RowComparator<'_, '_>,
    rows: usize,
    keep: DuplicateKeep,
) -> Vec<usize> {
    use crate::row::RowHasher;
    use rayon::prelude::*;

    let Some(pool) = crate::parallel::rayon_pool() else {
        let mut out = resolve(hashes, eq, 0..rows, rows, keep);
        out.sort_unstable();
        return out;
    };

    let partition_count = (pool.current_num_threads() * 4).max(1);
    let mut partitions: Vec<Vec<usize>> = vec![Vec::new(); partition_count];
    for row in 0..rows {
        // High bits: the hash index re-hashes the low ones.
        let part = ((hashes.hash_row(row) >> 32) % partition_count as u64) as usize;
        partitions[part].push(row);
    }

    let mut out: Vec<usize> = pool.install(|| {
        partitions
            .par_iter()
            .map(|part| resolve(hashes, eq, part.iter().copied(), part.len(), keep))
            .flatten_iter()
            .collect()
    });
    out.sort_unstable();
    out
}

#[cfg(not(all(feature = "parallel", not(target_arch = "wasm32"))))]
fn resolve_partitioned(
    hashes: &RowHashes,
    eq: RowComparator<'_, '_>,
    rows: usize,
    keep: DuplicateKeep,
) -> Vec<usize> {
    let mut out = resolve(hashes, eq, 0..rows, rows, keep);
    out.sort_unstable();
    out
}
