//! Row-range partitioning and the per-chunk reader.
//!
//! A file of `total_rows` rows is split into contiguous, end-exclusive row
//! ranges of `chunk_size` rows each; the last range is clipped to whatever is
//! left. Together the ranges cover `[0, total_rows)` with no gaps and no
//! overlaps, and they are numbered in row order so an ordered gather can put
//! the fragments back where they came from.

use crate::decoder::Decoder;
use crate::error::{ConvertError, Result};
use arrow::record_batch::RecordBatch;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// One unit of parallel work: `rows` rows of `path` starting at `offset`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkSpec {
    /// Position of this chunk in submission (row) order.
    pub index: usize,
    pub path: PathBuf,
    pub offset: usize,
    pub rows: usize,
}

impl ChunkSpec {
    /// Row range covered by this chunk, end-exclusive.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset.saturating_add(self.rows)
    }
}

/// Build the ordered chunk plan for a file of `total_rows` rows.
///
/// Returns no chunks when `total_rows == 0`.
///
/// # Errors
///
/// Returns [`ConvertError::InvalidConfiguration`] if `chunk_size == 0`.
pub fn plan_chunks(
    path: impl AsRef<Path>,
    total_rows: usize,
    chunk_size: usize,
) -> Result<Vec<ChunkSpec>> {
    if chunk_size == 0 {
        return Err(ConvertError::invalid("chunk size must be at least 1 row"));
    }
    let path = path.as_ref();
    Ok((0..total_rows)
        .step_by(chunk_size)
        .enumerate()
        .map(|(index, offset)| ChunkSpec {
            index,
            path: path.to_path_buf(),
            offset,
            rows: chunk_size.min(total_rows - offset),
        })
        .collect())
}

/// Decode a single chunk into a table fragment.
///
/// Pure with respect to shared state: only the decoder's file I/O happens
/// here, so any number of workers can call it at once.
///
/// # Errors
///
/// Returns [`ConvertError::Decode`] carrying the chunk's row range when the
/// decoder fails. Nothing is swallowed here; tolerating a failed chunk is the
/// caller's decision.
pub fn read_chunk(decoder: &dyn Decoder, spec: &ChunkSpec) -> Result<RecordBatch> {
    decoder
        .read_rows(&spec.path, spec.offset, spec.rows)
        .map_err(|source| ConvertError::Decode {
            path: spec.path.clone(),
            offset: spec.offset,
            rows: spec.rows,
            source,
        })
}
