#![cfg(not(target_arch = "wasm32"))]

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use strata_columnar::{BitVec, Column, ColumnData, ColumnType, ColumnarError, Scalar, TimeUnit};
use strata_ops::{reduce, reduce_with_options, Aggregation, OpsError, ReduceOptions};

const IDEMPOTENT: [Aggregation; 4] = [
    Aggregation::All,
    Aggregation::Any,
    Aggregation::Min,
    Aggregation::Max,
];

fn assert_close(actual: Scalar, expected: f64) {
    let got = actual.as_f64().expect("non-null float result");
    assert!(
        (got - expected).abs() <= 1e-9 * expected.abs().max(1.0),
        "expected {expected}, got {got}"
    );
}

#[test]
fn small_documented_cases() {
    let ints = Column::from_values("v", [1i32, 2, 3, 4]);
    assert_close(reduce(&ints, Aggregation::Mean).unwrap(), 2.5);

    let zeros = Column::from_values("z", [0i64, 0, 0]);
    assert_eq!(reduce(&zeros, Aggregation::Any).unwrap(), Scalar::Bool8(Some(false)));

    let empty = Column::from_values::<i64>("e", []);
    assert_eq!(reduce(&empty, Aggregation::Mean).unwrap(), Scalar::Float64(None));
    assert_eq!(reduce(&empty, Aggregation::Any).unwrap(), Scalar::Bool8(None));
}

#[test]
fn dictionary_int32_matches_plain() {
    let keys = ColumnData::Int32(vec![-7, 0, 3, 12]);
    let indices = vec![2, 2, 0, 3, 1, 2, 0];
    let validity: BitVec = [true, true, true, false, true, true, false]
        .into_iter()
        .collect();
    let dict = Column::dictionary("d", keys, indices, Some(validity)).unwrap();
    let plain = dict.decode();

    for agg in IDEMPOTENT.into_iter().chain([Aggregation::Mean, Aggregation::Sum]) {
        assert_eq!(
            reduce(&dict, agg).unwrap(),
            reduce(&plain, agg).unwrap(),
            "{agg}"
        );
    }
    // Key 12 is only referenced by a null row.
    assert_eq!(reduce(&dict, Aggregation::Max).unwrap(), Scalar::Int32(Some(3)));
    // 0 is referenced, so ALL is false.
    assert_eq!(reduce(&dict, Aggregation::All).unwrap(), Scalar::Bool8(Some(false)));
}

#[test]
fn dictionary_float32_mean() {
    let dict = Column::from_options("f", [Some(1.5f32), Some(2.5), None, Some(1.5), Some(4.5)])
        .dictionary_encode();
    assert!(dict.is_dictionary());
    assert_close(reduce(&dict, Aggregation::Mean).unwrap(), 2.5);
    assert_eq!(reduce(&dict, Aggregation::Min).unwrap(), Scalar::Float32(Some(1.5)));
    assert_eq!(reduce(&dict, Aggregation::Any).unwrap(), Scalar::Bool8(Some(true)));
}

#[test]
fn all_null_and_empty_columns_reduce_to_null() {
    let all_null = Column::dictionary(
        "d",
        ColumnData::Int32(vec![1, 2]),
        vec![0, 1, 0],
        Some(BitVec::with_len_all_false(3)),
    )
    .unwrap();
    let empty = Column::from_values::<i32>("e", []);
    for column in [&all_null, &empty] {
        for agg in IDEMPOTENT.into_iter().chain([Aggregation::Mean]) {
            let out = reduce(column, agg).unwrap();
            assert!(out.is_null(), "{agg} on {} gave {out:?}", column.name());
        }
    }
    assert_eq!(reduce(&empty, Aggregation::Sum).unwrap(), Scalar::Int64(None));
}

#[test]
fn numerical_aggregations() {
    let col = Column::from_options("v", [Some(2.0f64), Some(4.0), None, Some(4.0), Some(4.0)]);
    assert_close(reduce(&col, Aggregation::Sum).unwrap(), 14.0);
    assert_close(reduce(&col, Aggregation::Product).unwrap(), 128.0);
    assert_close(reduce(&col, Aggregation::SumOfSquares).unwrap(), 52.0);
    assert_close(reduce(&col, Aggregation::Mean).unwrap(), 3.5);
    assert_close(reduce(&col, Aggregation::Variance { ddof: 0 }).unwrap(), 0.75);
    assert_close(reduce(&col, Aggregation::Variance { ddof: 1 }).unwrap(), 1.0);
    assert_close(reduce(&col, Aggregation::Std { ddof: 1 }).unwrap(), 1.0);
    assert_eq!(
        reduce(&col, Aggregation::Variance { ddof: 4 }).unwrap(),
        Scalar::Float64(None)
    );
}

#[test]
fn skew_and_kurtosis() {
    let col = Column::from_options(
        "v",
        [Some(1i64), None, Some(2), Some(3), Some(4), None, Some(10)],
    );
    assert_close(reduce(&col, Aggregation::Skew).unwrap(), 1.697_056_274_847_714_3);
    assert_close(reduce(&col, Aggregation::Kurtosis).unwrap(), 3.152);

    let dict = col.dictionary_encode();
    assert_close(reduce(&dict, Aggregation::Skew).unwrap(), 1.697_056_274_847_714_3);
    assert_close(reduce(&dict, Aggregation::Kurtosis).unwrap(), 3.152);

    let three = Column::from_values("t", [1.0f32, 2.0, 9.0]);
    assert!(reduce(&three, Aggregation::Skew).unwrap().is_valid());
    assert_eq!(reduce(&three, Aggregation::Kurtosis).unwrap(), Scalar::Float64(None));
    let two = Column::from_values("t", [1.0f32, 2.0]);
    assert_eq!(reduce(&two, Aggregation::Skew).unwrap(), Scalar::Float64(None));

    let constant = Column::from_values("c", [7i32; 5]);
    assert_eq!(reduce(&constant, Aggregation::Skew).unwrap(), Scalar::Float64(Some(0.0)));
    assert_eq!(
        reduce(&constant, Aggregation::Kurtosis).unwrap(),
        Scalar::Float64(Some(0.0))
    );
}

#[test]
fn min_count_applies_to_valid_values_only() {
    let col = Column::from_options("v", [Some(2.0f64), None, Some(4.0), None, Some(9.0)]);
    let dict = col.dictionary_encode();
    let at_least = |min_count| ReduceOptions::default().with_min_count(min_count);
    for column in [&col, &dict] {
        for agg in [Aggregation::Mean, Aggregation::Std { ddof: 1 }, Aggregation::Skew] {
            let met = reduce_with_options(column, agg, &at_least(3)).unwrap();
            assert!(met.is_valid(), "{agg} on {}", column.name());
            assert_eq!(
                met,
                reduce(column, agg).unwrap(),
                "{agg} on {}",
                column.name()
            );
            let short = reduce_with_options(column, agg, &at_least(4)).unwrap();
            assert_eq!(short, Scalar::Float64(None), "{agg} on {}", column.name());
        }
    }
}

#[test]
fn boolean_columns() {
    let col = Column::from_options("b", [Some(true), None, Some(false), Some(true)]);
    assert_eq!(reduce(&col, Aggregation::Any).unwrap(), Scalar::Bool8(Some(true)));
    assert_eq!(reduce(&col, Aggregation::All).unwrap(), Scalar::Bool8(Some(false)));
    assert_eq!(reduce(&col, Aggregation::Max).unwrap(), Scalar::Bool8(Some(true)));
    assert_close(reduce(&col, Aggregation::Mean).unwrap(), 2.0 / 3.0);
    assert_eq!(
        reduce(&col, Aggregation::Sum).unwrap_err(),
        OpsError::UnsupportedAggregation {
            aggregation: Aggregation::Sum,
            column_type: ColumnType::Bool8,
        }
    );
}

#[test]
fn timestamps_support_min_max_only() {
    let col = Column::timestamps(
        "t",
        TimeUnit::Milliseconds,
        [Some(1_700_000_000_000), None, Some(1_600_000_000_000)],
    )
    .dictionary_encode();
    let min = reduce(&col, Aggregation::Min).unwrap();
    assert_eq!(
        min,
        Scalar::Timestamp(TimeUnit::Milliseconds, Some(1_600_000_000_000))
    );
    assert_eq!(
        min.as_datetime().map(|d| d.timestamp()),
        Some(1_600_000_000)
    );
    for agg in [Aggregation::All, Aggregation::Sum, Aggregation::Std { ddof: 1 }] {
        assert!(matches!(
            reduce(&col, agg),
            Err(OpsError::UnsupportedAggregation { .. })
        ));
    }
}

#[test]
fn float_extremes_order_nan_last() {
    let col = Column::from_values("f", [1.0f64, f64::NAN, -3.0]);
    assert_eq!(reduce(&col, Aggregation::Min).unwrap(), Scalar::Float64(Some(-3.0)));
    let max = reduce(&col, Aggregation::Max).unwrap();
    assert!(max.as_f64().is_some_and(f64::is_nan));
}

#[test]
fn corrupt_dictionary_is_rejected_at_construction() {
    let err = Column::dictionary("d", ColumnData::Int8(vec![1]), vec![0, 5], None).unwrap_err();
    assert!(matches!(err, ColumnarError::CorruptInput(_)));
}

#[test]
fn chunked_reduction_is_deterministic() {
    let keys: Vec<f32> = (0..64).map(|k| k as f32 * 0.25 - 4.0).collect();
    let indices: Vec<u32> = (0..200_000u32).map(|i| i.wrapping_mul(2_654_435_761) % 64).collect();
    let validity: BitVec = (0..200_000).map(|i| i % 100 != 0).collect();
    let dict = Column::dictionary("d", ColumnData::Float32(keys), indices, Some(validity)).unwrap();
    let options = ReduceOptions {
        parallel_threshold: 1,
        chunk_rows: 4_096,
        ..ReduceOptions::default()
    };

    for agg in [
        Aggregation::Mean,
        Aggregation::Variance { ddof: 1 },
        Aggregation::Sum,
        Aggregation::Skew,
        Aggregation::Kurtosis,
    ] {
        let first = reduce_with_options(&dict, agg, &options).unwrap();
        let second = reduce_with_options(&dict, agg, &options).unwrap();
        assert_eq!(first, second, "{agg}");
        let sequential = reduce(&dict, agg).unwrap().as_f64().unwrap();
        let chunked = first.as_f64().unwrap();
        assert!((sequential - chunked).abs() < 1e-6, "{agg}: {sequential} vs {chunked}");
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 96, ..ProptestConfig::default() })]

    #[test]
    fn dictionary_reduction_equals_plain(
        values in prop::collection::vec(prop::option::weighted(0.8, -50i32..50), 0..200),
    ) {
        let plain = Column::from_options("v", values.iter().copied());
        let dict = plain.dictionary_encode();
        for agg in IDEMPOTENT.into_iter().chain([Aggregation::Sum, Aggregation::SumOfSquares]) {
            prop_assert_eq!(reduce(&dict, agg).unwrap(), reduce(&plain, agg).unwrap());
        }
        let valid: Vec<i32> = values.iter().flatten().copied().collect();
        let expected_min = valid.iter().min().copied();
        prop_assert_eq!(reduce(&dict, Aggregation::Min).unwrap(), Scalar::Int32(expected_min));

        let mean = reduce(&dict, Aggregation::Mean).unwrap();
        if valid.is_empty() {
            prop_assert!(mean.is_null());
        } else {
            let expected = valid.iter().map(|&v| f64::from(v)).sum::<f64>() / valid.len() as f64;
            prop_assert!((mean.as_f64().unwrap() - expected).abs() < 1e-9);
        }
    }
}
