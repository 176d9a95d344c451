//! Pre-built datasets and typed ↔ Arrow conversion helpers.

use anyhow::{Context, Result};
use arrow::datatypes::FieldRef;
use arrow::record_batch::RecordBatch;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_arrow::schema::{SchemaLike, TracingOptions};
use serde_arrow::{from_record_batch, to_record_batch};

/// One row of the sample survey dataset.
///
/// Mirrors what a typical statistical dataset carries: an integer key, a
/// character variable, and a numeric variable with missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub id: u64,
    pub region: String,
    pub score: Option<f64>,
}

const REGIONS: [&str; 4] = ["north", "south", "east", "west"];

/// Generate `n` sample records with ids `0..n`.
///
/// Every seventh score is missing.
///
/// # Example
///
/// ```
/// use sasquatch::testing::sample_records;
///
/// let rows = sample_records(10);
/// assert_eq!(rows.len(), 10);
/// assert_eq!(rows[9].id, 9);
/// assert!(rows[7].score.is_none());
/// ```
#[must_use]
pub fn sample_records(n: usize) -> Vec<SampleRecord> {
    (0..n as u64)
        .map(|id| SampleRecord {
            id,
            region: REGIONS[(id % 4) as usize].to_string(),
            score: (id % 7 != 0).then(|| id as f64 * 0.5),
        })
        .collect()
}

/// [`sample_records`] as an Arrow table.
///
/// # Errors
///
/// Returns an error if the records cannot be converted.
pub fn sample_table(n: usize) -> Result<RecordBatch> {
    table_from_records(&sample_records(n))
}

/// Convert typed rows into a `RecordBatch`, inferring the schema from `T`.
///
/// Works for zero rows: the schema comes from the type, not the data.
///
/// # Errors
///
/// Returns an error if schema inference or conversion fails.
pub fn table_from_records<T: Serialize + Deserialize<'static>>(rows: &[T]) -> Result<RecordBatch> {
    let fields: Vec<FieldRef> = Vec::<FieldRef>::from_type::<T>(TracingOptions::default())
        .context("infer Arrow schema from type T")?;
    to_record_batch(&fields, &rows).context("convert rows to RecordBatch")
}

/// Convert a `RecordBatch` back into typed rows.
///
/// # Errors
///
/// Returns an error if the columns do not deserialize into `T`.
pub fn records_from_table<T: DeserializeOwned>(table: &RecordBatch) -> Result<Vec<T>> {
    from_record_batch(table).context("deserialize RecordBatch rows to T")
}
