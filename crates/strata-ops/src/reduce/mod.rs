//! Column reductions, with a dictionary-aware path for MIN / MAX / ALL / ANY.

mod accumulator;
mod aggregation;

pub use aggregation::Aggregation;

use crate::error::{OpsError, OpsResult};
use crate::options::ReduceOptions;
use accumulator::{
    Accumulator, AllAcc, AnyAcc, ArithmeticOp, ExtremumAcc, FloatFoldAcc, IntFoldAcc, MeanAcc,
    Moment, MomentsAcc,
};
use std::ops::Range;
use strata_columnar::{
    BitVec, Column, ColumnType, ColumnVisitor, DictionaryValues, PlainValues, Primitive, Scalar,
    ValueAccess,
};

/// Reduce the valid values of `column` to one scalar.
///
/// Nulls are skipped. A column with no valid values (including an empty one) reduces to a
/// null scalar of the output type.
pub fn reduce(column: &Column, aggregation: Aggregation) -> OpsResult<Scalar> {
    reduce_with_options(column, aggregation, &ReduceOptions::default())
}

/// [`reduce`] with explicit options. Fewer than `options.min_count` valid values reduce
/// to a null scalar without scanning.
pub fn reduce_with_options(
    column: &Column,
    aggregation: Aggregation,
    options: &ReduceOptions,
) -> OpsResult<Scalar> {
    let column_type = column.column_type();
    let output = aggregation
        .output_type(column_type)
        .ok_or(OpsError::UnsupportedAggregation {
            aggregation,
            column_type,
        })?;

    log::debug!(
        "reduce: column={} type={column_type} aggregation={aggregation} rows={} nulls={} dictionary={}",
        column.name(),
        column.len(),
        column.null_count(),
        column.is_dictionary()
    );

    let valid = column.len() - column.null_count();
    if valid < options.min_count {
        log::debug!(
            "reduce: {valid} valid values below min_count={}",
            options.min_count
        );
        return Ok(Scalar::null(output));
    }

    column.visit(ReduceKernel {
        aggregation,
        output,
        options,
    })
}

struct ReduceKernel<'o> {
    aggregation: Aggregation,
    output: ColumnType,
    options: &'o ReduceOptions,
}

impl<'a> ColumnVisitor<'a> for ReduceKernel<'_> {
    type Output = OpsResult<Scalar>;

    fn visit<T: Primitive, A: ValueAccess<T> + 'a>(
        self,
        _column_type: ColumnType,
        values: A,
    ) -> Self::Output {
        Ok(self.run(values))
    }

    fn visit_dictionary<T: Primitive>(
        self,
        column_type: ColumnType,
        values: DictionaryValues<'a, T>,
    ) -> Self::Output {
        if !self.aggregation.is_idempotent() {
            return self.visit(column_type, values);
        }

        // Only the set of referenced keys matters, so reduce over those keys once each.
        let referenced = referenced_keys(&values)?;
        let keys = values.keys();
        log::debug!(
            "reduce: {} of {} dictionary keys referenced",
            referenced.count_ones(),
            keys.len()
        );
        let distinct: Vec<T> = referenced.iter_ones().map(|id| keys[id]).collect();
        Ok(self.run(PlainValues::new(&distinct, None)))
    }
}

impl ReduceKernel<'_> {
    fn run<T: Primitive, A: ValueAccess<T>>(&self, values: A) -> Scalar {
        let out = self.output;
        let opts = self.options;
        match self.aggregation {
            Aggregation::All => reduce_values::<T, _, _>(values, AllAcc::default(), out, opts),
            Aggregation::Any => reduce_values::<T, _, _>(values, AnyAcc::default(), out, opts),
            Aggregation::Min => {
                reduce_values::<T, _, _>(values, ExtremumAcc::<T>::min(), out, opts)
            }
            Aggregation::Max => {
                reduce_values::<T, _, _>(values, ExtremumAcc::<T>::max(), out, opts)
            }
            Aggregation::Sum => self.arithmetic(values, ArithmeticOp::Sum),
            Aggregation::Product => self.arithmetic(values, ArithmeticOp::Product),
            Aggregation::SumOfSquares => self.arithmetic(values, ArithmeticOp::SumOfSquares),
            Aggregation::Mean => reduce_values::<T, _, _>(values, MeanAcc::default(), out, opts),
            Aggregation::Variance { ddof } => self.moments(values, Moment::Variance { ddof }),
            Aggregation::Std { ddof } => self.moments(values, Moment::Std { ddof }),
            Aggregation::Skew => self.moments(values, Moment::Skew),
            Aggregation::Kurtosis => self.moments(values, Moment::Kurtosis),
        }
    }

    fn moments<T: Primitive, A: ValueAccess<T>>(&self, values: A, stat: Moment) -> Scalar {
        reduce_values::<T, _, _>(values, MomentsAcc::new(stat), self.output, self.options)
    }

    fn arithmetic<T: Primitive, A: ValueAccess<T>>(&self, values: A, op: ArithmeticOp) -> Scalar {
        if self.output == ColumnType::Int64 {
            reduce_values::<T, _, _>(values, IntFoldAcc::new(op), self.output, self.options)
        } else {
            reduce_values::<T, _, _>(values, FloatFoldAcc::new(op), self.output, self.options)
        }
    }
}

/// Mark the keys referenced by at least one valid row.
fn referenced_keys<T: Primitive>(values: &DictionaryValues<'_, T>) -> OpsResult<BitVec> {
    let key_count = values.keys().len();
    let mut words = vec![0u64; key_count.div_ceil(64)];
    let mut marked = 0usize;
    for row in 0..values.len() {
        let Some(id) = values.key_id(row) else {
            continue;
        };
        let id = id as usize;
        if id >= key_count {
            return Err(OpsError::CorruptInput(format!(
                "dictionary index {id} at row {row} exceeds {key_count} keys"
            )));
        }
        let word = &mut words[id / 64];
        let mask = 1u64 << (id % 64);
        if *word & mask == 0 {
            *word |= mask;
            marked += 1;
            if marked == key_count {
                break;
            }
        }
    }
    Ok(BitVec::from_words(words, key_count))
}

fn reduce_values<T, A, Acc>(
    values: A,
    init: Acc,
    output: ColumnType,
    options: &ReduceOptions,
) -> Scalar
where
    T: Primitive,
    A: ValueAccess<T>,
    Acc: Accumulator<T>,
{
    let acc = fold::<T, A, Acc>(values, init, options);
    Accumulator::<T>::finish(acc, output)
}

#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
fn fold<T, A, Acc>(values: A, init: Acc, options: &ReduceOptions) -> Acc
where
    T: Primitive,
    A: ValueAccess<T>,
    Acc: Accumulator<T>,
{
    use rayon::prelude::*;

    let len = values.len();
    if len < options.parallel_threshold {
        return fold_range::<T, A, Acc>(values, 0..len, init);
    }
    let Some(pool) = crate::parallel::rayon_pool() else {
        return fold_range::<T, A, Acc>(values, 0..len, init);
    };

    let ranges = crate::parallel::chunk_ranges(len, options.chunk_rows);
    log::debug!("reduce: folding {len} rows in {} chunks", ranges.len());
    let partials: Vec<Acc> = pool.install(|| {
        ranges
            .into_par_iter()
            .map(|range| fold_range::<T, A, Acc>(values, range, init.clone()))
            .collect()
    });

    // Merge in chunk order so the result does not depend on scheduling.
    let mut acc = init;
    for partial in partials {
        Accumulator::<T>::merge(&mut acc, partial);
    }
    acc
}

#[cfg(not(all(feature = "parallel", not(target_arch = "wasm32"))))]
fn fold<T, A, Acc>(values: A, init: Acc, _options: &ReduceOptions) -> Acc
where
    T: Primitive,
    A: ValueAccess<T>,
    Acc: Accumulator<T>,
{
    fold_range::<T, A, Acc>(values, 0..values.len(), init)
}

fn fold_range<T, A, Acc>(values: A, rows: Range<usize>, mut acc: Acc) -> Acc
where
    T: Primitive,
    A: ValueAccess<T>,
    Acc: Accumulator<T>,
{
    if values.null_count() == 0 {
        for row in rows {
            Accumulator::<T>::update(&mut acc, values.value(row));
        }
    } else {
        for row in rows {
            if let Some(v) = values.get(row) {
                Accumulator::<T>::update(&mut acc, v);
            }
        }
    }
    acc
}
