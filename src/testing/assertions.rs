//! Assertion functions for comparing converted tables.

use arrow::array::{Array, UInt64Array};
use arrow::record_batch::RecordBatch;
use std::collections::HashSet;

/// Assert that two tables are equal in schema, order, and content.
///
/// # Panics
///
/// Panics if the tables differ.
pub fn assert_tables_equal(actual: &RecordBatch, expected: &RecordBatch) {
    assert_eq!(
        actual.schema().fields(),
        expected.schema().fields(),
        "Table schema mismatch"
    );
    assert_eq!(
        actual.num_rows(),
        expected.num_rows(),
        "Table row count mismatch:\n  Expected: {}\n  Actual: {}",
        expected.num_rows(),
        actual.num_rows()
    );
    for (i, (a, e)) in actual.columns().iter().zip(expected.columns()).enumerate() {
        assert_eq!(
            a.to_data(),
            e.to_data(),
            "Column {i} ({}) differs",
            expected.schema().field(i).name()
        );
    }
}

/// Extract a non-null `UInt64` column as a vector.
///
/// # Panics
///
/// Panics if the column is missing, has another type, or contains nulls.
#[must_use]
pub fn u64_column(table: &RecordBatch, name: &str) -> Vec<u64> {
    let column = table
        .column_by_name(name)
        .unwrap_or_else(|| panic!("no column named {name}"));
    let values = column
        .as_any()
        .downcast_ref::<UInt64Array>()
        .unwrap_or_else(|| panic!("column {name} is {}, not UInt64", column.data_type()));
    assert_eq!(values.null_count(), 0, "column {name} has nulls");
    values.values().to_vec()
}

/// Assert that `table` holds each id in `0..n` exactly once, in any order.
///
/// # Panics
///
/// Panics on a duplicate, a missing id, or an id out of range.
pub fn assert_ids_cover(table: &RecordBatch, column: &str, n: u64) {
    let ids = u64_column(table, column);
    assert_eq!(ids.len() as u64, n, "expected {n} rows, got {}", ids.len());
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        assert!(id < n, "id {id} out of range 0..{n}");
        assert!(seen.insert(id), "duplicate id {id}");
    }
}
