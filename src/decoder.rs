//! The file-format decoder seam.
//!
//! Decoding the binary layout of a dataset is not this crate's job. A
//! [`Decoder`] is the collaborator that knows the format: it reports metadata
//! without touching row data, and it decodes arbitrary row ranges into Arrow
//! batches. The orchestrator in [`convert`](crate::convert) only ever talks to
//! this trait, so any backend (a `ReadStat` binding, a native reader, the
//! [`ParquetDecoder`](crate::io::parquet::ParquetDecoder), or the
//! [`MockDecoder`](crate::testing::MockDecoder) used in tests) can drive a
//! parallel conversion.
//!
//! Implementations are shared across worker threads behind an `Arc`, so they
//! must be `Send + Sync` and must not rely on interior mutation that changes
//! what a read returns.

use anyhow::Result;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use std::path::Path;

/// File suffix (without the dot) of SAS datasets.
pub const SAS7BDAT_EXTENSION: &str = "sas7bdat";

/// Row count and column schema of a source file, read from its header only.
#[derive(Clone, Debug)]
pub struct SourceMetadata {
    pub total_rows: usize,
    pub schema: SchemaRef,
}

/// A format decoder able to read row ranges of a file independently.
pub trait Decoder: Send + Sync {
    /// File suffix (without the leading dot) this decoder accepts.
    fn extension(&self) -> &'static str {
        SAS7BDAT_EXTENSION
    }

    /// Read metadata only. Must not decode row data.
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be read or is malformed.
    fn read_metadata(&self, path: &Path) -> Result<SourceMetadata>;

    /// Decode at most `limit` rows starting at row `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the requested region cannot be decoded.
    fn read_rows(&self, path: &Path, offset: usize, limit: usize) -> Result<RecordBatch>;

    /// Decode the whole file in one pass.
    ///
    /// The default reads the full row range reported by the metadata, which
    /// keeps the schema intact even when the file holds no rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata or any row cannot be decoded.
    fn read_all(&self, path: &Path) -> Result<RecordBatch> {
        let meta = self.read_metadata(path)?;
        if meta.total_rows == 0 {
            return Ok(RecordBatch::new_empty(meta.schema));
        }
        self.read_rows(path, 0, meta.total_rows)
    }
}
