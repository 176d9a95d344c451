//! In-memory decoder and scripted confirmation for tests.

use crate::decoder::{Decoder, SourceMetadata, SAS7BDAT_EXTENSION};
use crate::validate::Confirm;
use anyhow::{bail, Result};
use arrow::array::{ArrayRef, Int32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Serves row ranges of an in-memory table, ignoring file contents.
///
/// Behavior at individual chunk offsets can be scripted before the decoder is
/// shared:
///
/// ```
/// use sasquatch::testing::{sample_table, MockDecoder};
/// use std::time::Duration;
///
/// # fn main() -> anyhow::Result<()> {
/// let decoder = MockDecoder::new(sample_table(300)?)
///     .fail_at(100)
///     .delay_at(0, Duration::from_millis(20));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MockDecoder {
    table: RecordBatch,
    extension: &'static str,
    fail_all: bool,
    fail_metadata: bool,
    fail_full_read: bool,
    fail: HashSet<usize>,
    panic: HashSet<usize>,
    wrong_schema: HashSet<usize>,
    delays: HashMap<usize, Duration>,
    short: HashMap<usize, usize>,
    metadata_reads: AtomicUsize,
    row_reads: AtomicUsize,
    full_reads: AtomicUsize,
    threads: Mutex<HashSet<String>>,
}

impl MockDecoder {
    #[must_use]
    pub fn new(table: RecordBatch) -> Self {
        Self {
            table,
            extension: SAS7BDAT_EXTENSION,
            fail_all: false,
            fail_metadata: false,
            fail_full_read: false,
            fail: HashSet::new(),
            panic: HashSet::new(),
            wrong_schema: HashSet::new(),
            delays: HashMap::new(),
            short: HashMap::new(),
            metadata_reads: AtomicUsize::new(0),
            row_reads: AtomicUsize::new(0),
            full_reads: AtomicUsize::new(0),
            threads: Mutex::new(HashSet::new()),
        }
    }

    /// Accept a different file suffix.
    #[must_use]
    pub fn with_extension(mut self, extension: &'static str) -> Self {
        self.extension = extension;
        self
    }

    /// Return a decode error for the chunk starting at `offset`.
    #[must_use]
    pub fn fail_at(mut self, offset: usize) -> Self {
        self.fail.insert(offset);
        self
    }

    /// Return a decode error for every row read.
    #[must_use]
    pub fn fail_all(mut self) -> Self {
        self.fail_all = true;
        self
    }

    /// Fail the metadata probe.
    #[must_use]
    pub fn fail_metadata(mut self) -> Self {
        self.fail_metadata = true;
        self
    }

    /// Fail full (non-chunked) reads.
    #[must_use]
    pub fn fail_full_read(mut self) -> Self {
        self.fail_full_read = true;
        self
    }

    /// Panic inside the worker for the chunk starting at `offset`.
    #[must_use]
    pub fn panic_at(mut self, offset: usize) -> Self {
        self.panic.insert(offset);
        self
    }

    /// Return a fragment with an unrelated schema for the chunk at `offset`.
    #[must_use]
    pub fn wrong_schema_at(mut self, offset: usize) -> Self {
        self.wrong_schema.insert(offset);
        self
    }

    /// Return only the first `rows` rows of the chunk at `offset`.
    #[must_use]
    pub fn short_at(mut self, offset: usize, rows: usize) -> Self {
        self.short.insert(offset, rows);
        self
    }

    /// Sleep before answering the chunk at `offset`.
    #[must_use]
    pub fn delay_at(mut self, offset: usize, delay: Duration) -> Self {
        self.delays.insert(offset, delay);
        self
    }

    #[must_use]
    pub fn table(&self) -> &RecordBatch {
        &self.table
    }

    /// Number of metadata probes received.
    #[must_use]
    pub fn metadata_reads(&self) -> usize {
        self.metadata_reads.load(Ordering::SeqCst)
    }

    /// Number of ranged row reads received.
    #[must_use]
    pub fn row_reads(&self) -> usize {
        self.row_reads.load(Ordering::SeqCst)
    }

    /// Number of full (non-chunked) reads received.
    #[must_use]
    pub fn full_reads(&self) -> usize {
        self.full_reads.load(Ordering::SeqCst)
    }

    /// Names of the threads that served ranged reads.
    #[must_use]
    pub fn worker_threads(&self) -> HashSet<String> {
        self.threads
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }

    fn record_thread(&self) {
        let name = thread::current().name().unwrap_or("<unnamed>").to_string();
        if let Ok(mut t) = self.threads.lock() {
            t.insert(name);
        }
    }
}

impl Decoder for MockDecoder {
    fn extension(&self) -> &'static str {
        self.extension
    }

    fn read_metadata(&self, _path: &Path) -> Result<SourceMetadata> {
        self.metadata_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_metadata {
            bail!("injected header corruption");
        }
        Ok(SourceMetadata {
            total_rows: self.table.num_rows(),
            schema: self.table.schema(),
        })
    }

    fn read_rows(&self, _path: &Path, offset: usize, limit: usize) -> Result<RecordBatch> {
        self.row_reads.fetch_add(1, Ordering::SeqCst);
        self.record_thread();

        if let Some(delay) = self.delays.get(&offset) {
            thread::sleep(*delay);
        }
        if self.panic.contains(&offset) {
            panic!("injected panic at row {offset}");
        }
        if self.fail_all || self.fail.contains(&offset) {
            bail!("injected decode failure at row {offset}");
        }
        if self.wrong_schema.contains(&offset) {
            let schema = Arc::new(Schema::new(vec![Field::new("bogus", DataType::Int32, false)]));
            let column: ArrayRef = Arc::new(Int32Array::from(vec![0; limit]));
            return Ok(RecordBatch::try_new(schema, vec![column])?);
        }

        let total = self.table.num_rows();
        if offset > total {
            bail!("row offset {offset} is past the end of the table ({total} rows)");
        }
        let mut len = limit.min(total - offset);
        if let Some(&rows) = self.short.get(&offset) {
            len = len.min(rows);
        }
        Ok(self.table.slice(offset, len))
    }

    fn read_all(&self, _path: &Path) -> Result<RecordBatch> {
        self.full_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_full_read {
            bail!("injected failure reading the whole file");
        }
        Ok(self.table.clone())
    }
}

/// Answers every confirmation with a fixed response and keeps the questions.
///
/// Clones share the question log, so a clone handed to a
/// [`Converter`](crate::Converter) can still be inspected afterwards.
#[derive(Clone, Debug)]
pub struct ScriptedConfirm {
    answer: bool,
    asked: Arc<Mutex<Vec<String>>>,
}

impl ScriptedConfirm {
    #[must_use]
    pub fn yes() -> Self {
        Self {
            answer: true,
            asked: Arc::default(),
        }
    }

    #[must_use]
    pub fn no() -> Self {
        Self {
            answer: false,
            asked: Arc::default(),
        }
    }

    /// Questions asked so far.
    #[must_use]
    pub fn questions(&self) -> Vec<String> {
        self.asked.lock().map(|q| q.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn times_asked(&self) -> usize {
        self.questions().len()
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&self, question: &str) -> bool {
        if let Ok(mut q) = self.asked.lock() {
            q.push(question.to_string());
        }
        self.answer
    }
}
