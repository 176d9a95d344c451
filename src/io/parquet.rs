//! Parquet I/O.
//!
//! This module provides:
//! - [`ParquetDecoder`], a [`Decoder`] over `.parquet` files. Metadata comes
//!   from the footer alone; row ranges are served with the reader's
//!   `with_offset`/`with_limit`, so every worker opens the file independently
//!   and decodes only the pages it needs.
//! - [`write_parquet_table`] to persist a converted table.

use crate::decoder::{Decoder, SourceMetadata};
use anyhow::{Context, Result};
use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::fs::{create_dir_all, File};
use std::path::Path;

/// Suffix (without the dot) accepted by [`ParquetDecoder`].
pub const PARQUET_EXTENSION: &str = "parquet";

/// Reads row ranges of Parquet files as Arrow batches.
#[derive(Clone, Copy, Debug)]
pub struct ParquetDecoder {
    batch_size: usize,
}

impl Default for ParquetDecoder {
    fn default() -> Self {
        Self {
            batch_size: 64 * 1024,
        }
    }
}

impl ParquetDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows per internal reader batch. Does not affect chunk boundaries.
    #[must_use]
    pub fn with_batch_size(mut self, rows: usize) -> Self {
        self.batch_size = rows.max(1);
        self
    }

    fn builder(path: &Path) -> Result<ParquetRecordBatchReaderBuilder<File>> {
        let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
        ParquetRecordBatchReaderBuilder::try_new(f)
            .with_context(|| format!("open ParquetRecordBatchReader for {}", path.display()))
    }
}

impl Decoder for ParquetDecoder {
    fn extension(&self) -> &'static str {
        PARQUET_EXTENSION
    }

    fn read_metadata(&self, path: &Path) -> Result<SourceMetadata> {
        let b = Self::builder(path)?;
        let rows = b.metadata().file_metadata().num_rows();
        let total_rows = usize::try_from(rows)
            .with_context(|| format!("negative row count {rows} in {}", path.display()))?;
        Ok(SourceMetadata {
            total_rows,
            schema: b.schema().clone(),
        })
    }

    fn read_rows(&self, path: &Path, offset: usize, limit: usize) -> Result<RecordBatch> {
        let b = Self::builder(path)?;
        let schema = b.schema().clone();
        let reader = b
            .with_batch_size(self.batch_size)
            .with_offset(offset)
            .with_limit(limit)
            .build()
            .context("build ranged ParquetRecordBatchReader")?;

        let mut batches = Vec::new();
        for batch in reader {
            batches.push(batch.with_context(|| {
                format!("read rows {offset}..{} of {}", offset.saturating_add(limit), path.display())
            })?);
        }
        concat_batches(&schema, &batches).context("concatenate reader batches")
    }
}

/// Write a table to a Parquet file, creating parent directories as needed.
///
/// A zero-row table still produces a valid file carrying the schema.
///
/// # Returns
/// Number of rows written.
///
/// # Errors
/// Returns an error if the file/dirs cannot be created or writing fails.
pub fn write_parquet_table(path: impl AsRef<Path>, table: &RecordBatch) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let props = WriterProperties::builder().build();
    let mut writer =
        ArrowWriter::try_new(file, table.schema(), Some(props)).context("create ArrowWriter")?;
    writer.write(table).context("write table to parquet")?;
    writer.close().context("close ArrowWriter")?;
    Ok(table.num_rows())
}
