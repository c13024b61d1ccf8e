use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use strata_columnar::{
    BitVec, Column, ColumnData, ColumnType, ColumnarError, Encoding, Scalar, Table, TimeUnit,
};

#[test]
fn dictionary_column_reads_through_keys() {
    let validity: BitVec = [true, false, true, true].into_iter().collect();
    let column = Column::dictionary(
        "city",
        ColumnData::Int64(vec![10, 20, 30]),
        vec![2, 7, 0, 2],
        Some(validity),
    )
    .unwrap();

    assert!(column.is_dictionary());
    assert_eq!(column.column_type(), ColumnType::Int64);
    assert_eq!(column.len(), 4);
    assert_eq!(column.null_count(), 1);
    assert_eq!(column.scalar_at(0).unwrap(), Scalar::Int64(Some(30)));
    // Null rows may carry any index.
    assert_eq!(column.scalar_at(1).unwrap(), Scalar::Int64(None));
    assert_eq!(column.scalar_at(2).unwrap(), Scalar::Int64(Some(10)));
    assert_eq!(
        column.scalar_at(4).unwrap_err(),
        ColumnarError::RowOutOfBounds { row: 4, len: 4 }
    );
    assert!(!column.is_valid(4));
}

#[test]
fn encode_then_decode_preserves_logical_values() {
    let plain = Column::from_options("v", [Some(3i8), None, Some(-1), Some(3), None]);
    let encoded = plain.dictionary_encode();

    let Encoding::Dictionary(dict) = encoded.encoding() else {
        panic!("expected dictionary encoding");
    };
    assert_eq!(dict.keys(), &ColumnData::Int8(vec![-1, 3]));
    assert_eq!(dict.key_count(), 2);

    for row in 0..plain.len() {
        assert_eq!(encoded.scalar_at(row).unwrap(), plain.scalar_at(row).unwrap());
    }
    assert_eq!(encoded.decode().validity(), plain.validity());
}

#[test]
fn shape_errors_name_the_column() {
    let err = Column::new(
        "x",
        ColumnData::Bool8(vec![true, false]),
        Some(BitVec::with_len_all_true(3)),
    )
    .unwrap_err();
    assert_eq!(
        err,
        ColumnarError::ShapeMismatch {
            column: "x".to_owned(),
            expected: 2,
            actual: 3,
        }
    );

    let err = Column::from_values_with_validity("y", [1i32, 2, 3], [true]).unwrap_err();
    assert!(matches!(err, ColumnarError::ShapeMismatch { ref column, .. } if column == "y"));
}

#[test]
fn out_of_range_dictionary_index_is_corrupt() {
    let err = Column::dictionary("d", ColumnData::Float32(vec![1.0, 2.0]), vec![0, 1, 2], None)
        .unwrap_err();
    assert!(matches!(err, ColumnarError::CorruptInput(_)));
}

#[test]
fn datetimes_round_trip_through_timestamp_columns() {
    let a = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();
    let b = Utc.with_ymd_and_hms(1969, 12, 31, 23, 59, 59).unwrap();
    let column = Column::from_datetimes("at", TimeUnit::Milliseconds, [Some(a), None, Some(b)])
        .unwrap();

    assert_eq!(column.column_type(), ColumnType::Timestamp(TimeUnit::Milliseconds));
    assert_eq!(column.column_type().to_string(), "timestamp[ms]");
    assert_eq!(column.scalar_at(0).unwrap().as_datetime(), Some(a));
    assert_eq!(column.scalar_at(2).unwrap().as_i64(), Some(-1_000));
    assert!(column.scalar_at(1).unwrap().is_null());
}

#[test]
fn table_gather_keeps_dictionary_encoding() {
    let table = Table::new(vec![
        Column::from_values("k", [1i32, 2, 3, 4]).dictionary_encode(),
        Column::from_options("v", [Some(1.0f64), None, Some(3.0), None]),
    ])
    .unwrap();

    let picked = table.gather(&[3, 0]).unwrap();
    assert_eq!(picked.row_count(), 2);
    assert!(picked.column(0).unwrap().is_dictionary());
    assert_eq!(picked.column(0).unwrap().scalar_at(0).unwrap(), Scalar::Int32(Some(4)));
    assert_eq!(picked.column(1).unwrap().null_count(), 1);

    assert_eq!(
        table.gather(&[9]).unwrap_err(),
        ColumnarError::RowOutOfBounds { row: 9, len: 4 }
    );
}
