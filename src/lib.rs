//! # sasquatch
//!
//! Parallel, chunked conversion of SAS7BDAT datasets into Arrow tables.
//!
//! Large statistical datasets decode slowly on one core. `sasquatch` splits a
//! file into fixed-size row ranges, decodes the ranges on a bounded worker
//! pool, and stitches the fragments back into one [`RecordBatch`].
//!
//! ## Key Features
//!
//! - **Row-range chunking** - disjoint chunks that exactly cover the file
//! - **Bounded worker pool** - sized per call, released when the call returns
//! - **Ordered or completion-order gather** - keep source row order, or stop
//!   waiting on stragglers
//! - **Lazy or eager merge** - a deferred column-wise concatenation plan, or a
//!   single `concat_batches`
//! - **Graceful degradation** - chunks that fail to decode are logged,
//!   reported, and dropped; the conversion itself keeps going
//! - **Pluggable decoding** - any [`Decoder`] drives the pipeline
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use sasquatch::{ConvertOptions, Converter};
//!
//! # fn main() -> anyhow::Result<()> {
//! let decoder = Arc::new(MyReadStatDecoder::default());
//! let opts = ConvertOptions::default()
//!     .with_chunk_size(50_000)
//!     .with_processes(4);
//!
//! let table = Converter::new(decoder).convert("survey.sas7bdat", &opts)?;
//! println!("{} rows", table.num_rows());
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Decoder
//!
//! The binary format is handled by a [`Decoder`]: it reports row count and
//! schema from the header, and decodes `(offset, limit)` row ranges. Decoders
//! are shared by all workers and must be `Send + Sync`.
//!
//! ### Chunks
//!
//! [`plan_chunks`] turns a row count and a chunk size into [`ChunkSpec`]s.
//! For 25 000 rows and a chunk size of 10 000 that is three chunks of 10 000,
//! 10 000, and 5 000 rows.
//!
//! ### Worker count
//!
//! [`validate_processes`] rejects more workers than logical cores and asks for
//! confirmation above 75% of them. The core count and the prompt are injected
//! into [`Converter`], so both can be replaced.
//!
//! ### Reports
//!
//! [`Converter::convert_with_report`] returns a [`ConversionReport`] alongside
//! the table, listing every discarded chunk and why it was dropped, plus any
//! chunk that came back short.
//!
//! ## Feature Flags
//!
//! - `io-parquet` - [`ParquetDecoder`](io::parquet::ParquetDecoder) and a
//!   Parquet sink for converted tables
//!
//! ## Logging
//!
//! All diagnostics go through `tracing`. The crate never installs a
//! subscriber.
//!
//! ## Module Overview
//!
//! - [`convert`] - the orchestrator
//! - [`chunk`] - chunk planning and the per-chunk reader
//! - [`validate`] - worker-count validation and confirmation
//! - [`merge`] - eager and lazy concatenation
//! - [`decoder`] - the decoder seam
//! - [`options`] - conversion settings
//! - [`io`] - file-format backends
//! - [`testing`] - mock decoder, fixtures, and assertions

pub mod chunk;
pub mod convert;
pub mod decoder;
pub mod error;
pub mod io;
pub mod merge;
pub mod options;
pub mod testing;
pub mod validate;

pub use arrow::record_batch::RecordBatch;
pub use chunk::{plan_chunks, read_chunk, ChunkSpec};
pub use convert::{convert_file, Conversion, ConversionReport, Converter, DiscardedChunk, ShortChunk};
pub use decoder::{Decoder, SourceMetadata, SAS7BDAT_EXTENSION};
pub use error::{ConvertError, Result};
pub use merge::{concat_eager, LazyConcat, MergeStrategy};
pub use options::{default_processes, ConvertOptions, DEFAULT_CHUNK_SIZE};
pub use validate::{validate_processes, Confirm, StdinConfirm};

#[cfg(feature = "io-parquet")]
pub use io::parquet::{write_parquet_table, ParquetDecoder};
