//! Concatenation of table fragments.
//!
//! Two strategies produce the same table:
//!
//! - [`concat_eager`] hands every fragment to `concat_batches` at once.
//! - [`LazyConcat`] records a plan (schema, fragments, final row count) and
//!   only materializes on [`LazyConcat::collect`]. Collection runs column by
//!   column and drops each fragment column as soon as it has been copied, so
//!   the peak footprint is the fragments plus one output column instead of the
//!   fragments plus the whole output.

use arrow::array::{Array, ArrayRef};
use arrow::compute::{concat, concat_batches};
use arrow::datatypes::SchemaRef;
use arrow::error::ArrowError;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use serde::{Deserialize, Serialize};

/// How fragments are merged into the result table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    Lazy,
    Eager,
}

/// Concatenate all fragments in one step.
///
/// # Errors
///
/// Returns an error if a fragment does not match `schema`.
pub fn concat_eager(schema: &SchemaRef, fragments: &[RecordBatch]) -> Result<RecordBatch, ArrowError> {
    concat_batches(schema, fragments)
}

/// Deferred concatenation plan over a list of fragments.
#[derive(Debug)]
pub struct LazyConcat {
    schema: SchemaRef,
    fragments: Vec<RecordBatch>,
    num_rows: usize,
}

impl LazyConcat {
    /// Build a plan. No data is copied.
    #[must_use]
    pub fn new(schema: SchemaRef, fragments: Vec<RecordBatch>) -> Self {
        let num_rows = fragments.iter().map(RecordBatch::num_rows).sum();
        Self {
            schema,
            fragments,
            num_rows,
        }
    }

    #[must_use]
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Number of rows the collected table will have.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    #[must_use]
    pub fn num_fragments(&self) -> usize {
        self.fragments.len()
    }

    /// Materialize the plan into a single batch.
    ///
    /// # Errors
    ///
    /// Returns an error if a fragment's width or column types disagree with
    /// the plan schema.
    pub fn collect(self) -> Result<RecordBatch, ArrowError> {
        let width = self.schema.fields().len();
        if self.fragments.is_empty() {
            return Ok(RecordBatch::new_empty(self.schema));
        }

        // Transpose into per-column piles; the fragments themselves go away here.
        let mut piles: Vec<Vec<ArrayRef>> = vec![Vec::with_capacity(self.fragments.len()); width];
        for fragment in self.fragments {
            if fragment.num_columns() != width {
                return Err(ArrowError::SchemaError(format!(
                    "fragment has {} columns, expected {width}",
                    fragment.num_columns()
                )));
            }
            for (pile, column) in piles.iter_mut().zip(fragment.columns()) {
                pile.push(column.clone());
            }
        }

        let mut columns = Vec::with_capacity(width);
        for pile in piles {
            let refs: Vec<&dyn Array> = pile.iter().map(|a| a.as_ref()).collect();
            columns.push(concat(&refs)?);
        }

        let options = RecordBatchOptions::new().with_row_count(Some(self.num_rows));
        RecordBatch::try_new_with_options(self.schema, columns, &options)
    }
}
