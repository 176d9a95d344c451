//! Temporary input files for tests.
//!
//! The [`MockDecoder`](super::MockDecoder) never reads file contents, but the
//! converter still checks that the input exists and carries the right suffix.
//! These helpers create such files and delete them on drop.

use crate::decoder::SAS7BDAT_EXTENSION;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A temporary file that is automatically deleted when dropped.
pub struct TempFilePath {
    #[allow(dead_code)]
    temp_file: NamedTempFile,
    path: PathBuf,
}

impl TempFilePath {
    /// Create a new temporary file with a specific extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created.
    pub fn with_extension(extension: &str) -> std::io::Result<Self> {
        let temp_file = tempfile::Builder::new()
            .suffix(&format!(".{extension}"))
            .tempfile()?;
        let path = temp_file.path().to_path_buf();
        Ok(Self { temp_file, path })
    }

    /// Get the path to the temporary file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Create an empty temporary `.sas7bdat` file.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created.
pub fn mock_sas_file() -> std::io::Result<TempFilePath> {
    TempFilePath::with_extension(SAS7BDAT_EXTENSION)
}

/// Write `table` to a temporary `.parquet` file.
///
/// `rows_per_group` caps the row-group size so ranged reads cross row-group
/// boundaries.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
#[cfg(feature = "io-parquet")]
pub fn mock_parquet_file(
    table: &arrow::record_batch::RecordBatch,
    rows_per_group: usize,
) -> anyhow::Result<TempFilePath> {
    use anyhow::Context;
    use parquet::arrow::arrow_writer::ArrowWriter;
    use parquet::file::properties::WriterProperties;

    let temp = TempFilePath::with_extension(crate::io::parquet::PARQUET_EXTENSION)?;
    let file = std::fs::File::create(temp.path())
        .with_context(|| format!("create {}", temp.path().display()))?;
    let props = WriterProperties::builder()
        .set_max_row_group_size(rows_per_group.max(1))
        .build();
    let mut writer = ArrowWriter::try_new(file, table.schema(), Some(props))?;
    writer.write(table)?;
    writer.close()?;
    Ok(temp)
}
