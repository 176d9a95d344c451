//! Parallel chunked conversion.
//!
//! [`Converter`] drives one conversion end to end:
//!
//! 1. validate the worker count ([`validate_processes`]) and the input path;
//! 2. probe metadata for the total row count and schema;
//! 3. short-circuit empty files with a single full read;
//! 4. plan row-range chunks ([`plan_chunks`]) and fan them out over a worker
//!    pool sized to `processes`;
//! 5. drop anything that is not a well-formed fragment;
//! 6. merge what is left, lazily or eagerly.
//!
//! The pool is built per call and dropped before the call returns, on every
//! exit path. Ordered mode gathers results by chunk index; unordered mode
//! drains a completion queue and merges fragments in the order workers finish.
//!
//! Chunk-level decode failures never fail a conversion. Each one is logged and
//! listed in the [`ConversionReport`]; if nothing survives, the result is an
//! empty table with the file's schema.

use crate::chunk::{plan_chunks, read_chunk, ChunkSpec};
use crate::decoder::{Decoder, SourceMetadata};
use crate::error::{ConvertError, Result};
use crate::merge::{concat_eager, LazyConcat, MergeStrategy};
use crate::options::ConvertOptions;
use crate::validate::{validate_processes, Confirm, StdinConfirm};
use anyhow::anyhow;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Query for the number of logical cores on the host.
pub type CpuCount = Arc<dyn Fn() -> usize + Send + Sync>;

/// A chunk that did not make it into the result table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscardedChunk {
    pub index: usize,
    pub offset: usize,
    pub rows: usize,
    pub reason: String,
}

/// A chunk that was merged but came back with fewer rows than it covers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShortChunk {
    pub index: usize,
    pub offset: usize,
    /// Rows the chunk covers.
    pub expected: usize,
    /// Rows the decoder actually returned.
    pub returned: usize,
}

/// What happened during a conversion.
#[derive(Clone, Debug)]
pub struct ConversionReport {
    /// Row count reported by the metadata probe.
    pub total_rows: usize,
    pub chunks_planned: usize,
    pub chunks_merged: usize,
    pub discarded: Vec<DiscardedChunk>,
    /// Merged chunks that were missing rows.
    pub short: Vec<ShortChunk>,
    pub rows_returned: usize,
    /// Whether the worker pool was used. `false` for empty files.
    pub parallel: bool,
    /// `None` when no merge was needed (empty file, or every chunk discarded).
    pub merge: Option<MergeStrategy>,
    pub elapsed: Duration,
}

impl ConversionReport {
    /// `true` when fewer rows came back than the file holds.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.rows_returned < self.total_rows
    }
}

/// Result table plus the report describing how it was built.
#[derive(Clone, Debug)]
pub struct Conversion {
    pub table: RecordBatch,
    pub report: ConversionReport,
}

/// Orchestrates parallel conversions through a [`Decoder`].
///
/// The host core count and the confirmation channel are collaborators; the
/// defaults are `num_cpus::get` and [`StdinConfirm`].
#[derive(Clone)]
pub struct Converter {
    decoder: Arc<dyn Decoder>,
    cpu_count: CpuCount,
    confirm: Arc<dyn Confirm>,
}

impl Converter {
    #[must_use]
    pub fn new(decoder: Arc<dyn Decoder>) -> Self {
        Self {
            decoder,
            cpu_count: Arc::new(num_cpus::get),
            confirm: Arc::new(StdinConfirm),
        }
    }

    /// Replace the host core-count query.
    #[must_use]
    pub fn with_cpu_count<F>(mut self, cpu_count: F) -> Self
    where
        F: Fn() -> usize + Send + Sync + 'static,
    {
        self.cpu_count = Arc::new(cpu_count);
        self
    }

    /// Replace the confirmation channel used for high worker counts.
    #[must_use]
    pub fn with_confirm<C: Confirm + 'static>(mut self, confirm: C) -> Self {
        self.confirm = Arc::new(confirm);
        self
    }

    #[must_use]
    pub fn decoder(&self) -> &Arc<dyn Decoder> {
        &self.decoder
    }

    /// Convert `path` into a single table.
    ///
    /// # Errors
    ///
    /// See [`Converter::convert_with_report`].
    pub fn convert(&self, path: impl AsRef<Path>, opts: &ConvertOptions) -> Result<RecordBatch> {
        self.convert_with_report(path, opts).map(|c| c.table)
    }

    /// Convert `path` and return the table together with a [`ConversionReport`].
    ///
    /// # Errors
    ///
    /// - [`ConvertError::InvalidConfiguration`] for a bad worker count or a
    ///   zero chunk size.
    /// - [`ConvertError::UserAborted`] if the high worker count was declined.
    /// - [`ConvertError::FileNotFound`] / [`ConvertError::UnsupportedFileType`]
    ///   for a bad input path.
    /// - [`ConvertError::Metadata`] if the metadata probe fails, and
    ///   [`ConvertError::FullRead`] if the full read of an empty file fails.
    /// - [`ConvertError::WorkerPool`] / [`ConvertError::Arrow`] if the pool
    ///   cannot be built or the merge fails.
    pub fn convert_with_report(
        &self,
        path: impl AsRef<Path>,
        opts: &ConvertOptions,
    ) -> Result<Conversion> {
        let path = path.as_ref();
        let started = Instant::now();

        validate_processes(opts.processes, (self.cpu_count)(), self.confirm.as_ref())?;
        if opts.chunk_size == 0 {
            return Err(ConvertError::invalid("chunk size must be at least 1 row"));
        }
        self.check_input(path)?;

        let meta = self
            .decoder
            .read_metadata(path)
            .map_err(|source| ConvertError::Metadata {
                path: path.to_path_buf(),
                source,
            })?;

        if meta.total_rows == 0 {
            return self.read_empty(path, started);
        }

        let specs = plan_chunks(path, meta.total_rows, opts.chunk_size)?;
        let chunks_planned = specs.len();
        info!(
            path = %path.display(),
            total_rows = meta.total_rows,
            chunks = chunks_planned,
            processes = opts.processes,
            preserve_order = opts.preserve_order,
            "starting parallel conversion"
        );

        let outcomes = {
            let pool = build_pool(opts.processes)?;
            if opts.preserve_order {
                gather_ordered(&pool, self.decoder.as_ref(), specs)
            } else {
                drain_unordered(&pool, &self.decoder, specs)
            }
        };

        let Sifted {
            fragments,
            discarded,
            short,
        } = sift(&meta, outcomes);
        let chunks_merged = fragments.len();

        let (table, merge) = if fragments.is_empty() {
            warn!(
                path = %path.display(),
                "unable to read any of the data; returning an empty table"
            );
            (RecordBatch::new_empty(Arc::clone(&meta.schema)), None)
        } else if opts.use_lazy_merge {
            let plan = LazyConcat::new(Arc::clone(&meta.schema), fragments);
            (plan.collect()?, Some(MergeStrategy::Lazy))
        } else {
            (concat_eager(&meta.schema, &fragments)?, Some(MergeStrategy::Eager))
        };

        let report = ConversionReport {
            total_rows: meta.total_rows,
            chunks_planned,
            chunks_merged,
            discarded,
            short,
            rows_returned: table.num_rows(),
            parallel: true,
            merge,
            elapsed: started.elapsed(),
        };
        info!(
            path = %path.display(),
            rows = report.rows_returned,
            discarded = report.discarded.len(),
            short = report.short.len(),
            elapsed_ms = report.elapsed.as_millis(),
            "conversion finished"
        );
        Ok(Conversion { table, report })
    }

    fn check_input(&self, path: &Path) -> Result<()> {
        if !path.is_file() {
            return Err(ConvertError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let expected = self.decoder.extension();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(&format!(".{expected}")));
        if !matches {
            return Err(ConvertError::UnsupportedFileType {
                path: path.to_path_buf(),
                expected,
            });
        }
        Ok(())
    }

    /// Full read of a file with no rows, so the schema survives.
    fn read_empty(&self, path: &Path, started: Instant) -> Result<Conversion> {
        let table = self
            .decoder
            .read_all(path)
            .map_err(|source| ConvertError::FullRead {
                path: path.to_path_buf(),
                source,
            })?;
        warn!(path = %path.display(), "dataset is empty; returning an empty table");
        let report = ConversionReport {
            total_rows: 0,
            chunks_planned: 0,
            chunks_merged: 0,
            discarded: Vec::new(),
            short: Vec::new(),
            rows_returned: table.num_rows(),
            parallel: false,
            merge: None,
            elapsed: started.elapsed(),
        };
        Ok(Conversion { table, report })
    }
}

/// Convert with default options, the host core count, and console
/// confirmation.
///
/// # Errors
///
/// See [`Converter::convert_with_report`].
pub fn convert_file(decoder: Arc<dyn Decoder>, path: impl AsRef<Path>) -> Result<RecordBatch> {
    Converter::new(decoder).convert(path, &ConvertOptions::default())
}

type Outcome = (ChunkSpec, Result<RecordBatch>);

fn build_pool(processes: usize) -> Result<ThreadPool> {
    Ok(ThreadPoolBuilder::new()
        .num_threads(processes)
        .thread_name(|i| format!("sas-chunk-{i}"))
        .build()?)
}

/// Scatter/gather keyed by chunk index: results come back in plan order.
fn gather_ordered(pool: &ThreadPool, decoder: &dyn Decoder, specs: Vec<ChunkSpec>) -> Vec<Outcome> {
    let results: Vec<Result<RecordBatch>> =
        pool.install(|| specs.par_iter().map(|spec| run_chunk(decoder, spec)).collect());
    specs.into_iter().zip(results).collect()
}

/// Completion-queue drain: results come back in the order workers finish.
fn drain_unordered(
    pool: &ThreadPool,
    decoder: &Arc<dyn Decoder>,
    specs: Vec<ChunkSpec>,
) -> Vec<Outcome> {
    let (tx, rx) = mpsc::channel::<Outcome>();
    for spec in specs {
        let tx = tx.clone();
        let decoder = Arc::clone(decoder);
        pool.spawn(move || {
            let result = run_chunk(decoder.as_ref(), &spec);
            let _ = tx.send((spec, result));
        });
    }
    drop(tx);
    rx.into_iter().collect()
}

/// Read one chunk, turning a panicking decoder into an ordinary decode error.
fn run_chunk(decoder: &dyn Decoder, spec: &ChunkSpec) -> Result<RecordBatch> {
    debug!(chunk = spec.index, offset = spec.offset, rows = spec.rows, "reading chunk");
    panic::catch_unwind(AssertUnwindSafe(|| read_chunk(decoder, spec))).unwrap_or_else(|payload| {
        Err(ConvertError::Decode {
            path: spec.path.clone(),
            offset: spec.offset,
            rows: spec.rows,
            source: anyhow!("worker panicked: {}", panic_message(payload.as_ref())),
        })
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic payload"
    }
}

#[derive(Default)]
struct Sifted {
    fragments: Vec<RecordBatch>,
    discarded: Vec<DiscardedChunk>,
    short: Vec<ShortChunk>,
}

/// Keep well-formed fragments, record everything else.
///
/// A fragment with fewer rows than its chunk is still merged, but it is logged
/// and listed so the loss is visible in the report.
fn sift(meta: &SourceMetadata, outcomes: Vec<Outcome>) -> Sifted {
    let mut sifted = Sifted {
        fragments: Vec::with_capacity(outcomes.len()),
        ..Sifted::default()
    };
    for (spec, result) in outcomes {
        let checked = result
            .map_err(|e| format!("{:#}", anyhow::Error::from(e)))
            .and_then(|batch| check_fragment(&meta.schema, &spec, batch));
        match checked {
            Ok(batch) => {
                if batch.num_rows() < spec.rows {
                    warn!(
                        chunk = spec.index,
                        offset = spec.offset,
                        expected = spec.rows,
                        returned = batch.num_rows(),
                        "chunk returned fewer rows than it covers"
                    );
                    sifted.short.push(ShortChunk {
                        index: spec.index,
                        offset: spec.offset,
                        expected: spec.rows,
                        returned: batch.num_rows(),
                    });
                }
                sifted.fragments.push(batch);
            }
            Err(reason) => {
                warn!(
                    chunk = spec.index,
                    offset = spec.offset,
                    rows = spec.rows,
                    %reason,
                    "discarding chunk"
                );
                sifted.discarded.push(DiscardedChunk {
                    index: spec.index,
                    offset: spec.offset,
                    rows: spec.rows,
                    reason,
                });
            }
        }
    }
    sifted
}

fn check_fragment(
    schema: &SchemaRef,
    spec: &ChunkSpec,
    batch: RecordBatch,
) -> std::result::Result<RecordBatch, String> {
    if batch.schema().fields() != schema.fields() {
        return Err(format!(
            "fragment schema {:?} does not match source schema {:?}",
            batch.schema().fields(),
            schema.fields()
        ));
    }
    if batch.num_rows() > spec.rows {
        return Err(format!(
            "fragment has {} rows, chunk covers only {}",
            batch.num_rows(),
            spec.rows
        ));
    }
    Ok(batch)
}
