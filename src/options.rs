//! Conversion settings.
//!
//! [`ConvertOptions`] is plain data: construct it with [`Default`], adjust it
//! with the builder-style setters, or deserialize it from JSON. Missing JSON
//! fields fall back to the defaults below.
//!
//! | field            | default              |
//! |------------------|----------------------|
//! | `chunk_size`     | `10_000` rows        |
//! | `processes`      | `max(1, cores / 4)`  |
//! | `use_lazy_merge` | `true`               |
//! | `preserve_order` | `true`               |

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Rows per unit of work unless configured otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// One quarter of the host's logical cores, never less than one.
///
/// On a one-core host this is the whole machine. That request is still below
/// the confirmation threshold (see
/// [`warning_threshold`](crate::validate::warning_threshold)), so default
/// conversions never block on stdin.
#[must_use]
pub fn default_processes() -> usize {
    (num_cpus::get() / 4).max(1)
}

const fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

const fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// Rows decoded by one worker per unit of work.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Size of the worker pool.
    #[serde(default = "default_processes")]
    pub processes: usize,
    /// Merge through a deferred plan instead of one eager concatenation.
    #[serde(default = "default_true")]
    pub use_lazy_merge: bool,
    /// Keep source row order. When `false`, fragments are merged in the order
    /// workers finish them.
    #[serde(default = "default_true")]
    pub preserve_order: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            processes: default_processes(),
            use_lazy_merge: true,
            preserve_order: true,
        }
    }
}

impl ConvertOptions {
    #[must_use]
    pub fn with_chunk_size(mut self, rows: usize) -> Self {
        self.chunk_size = rows;
        self
    }

    #[must_use]
    pub fn with_processes(mut self, processes: usize) -> Self {
        self.processes = processes;
        self
    }

    #[must_use]
    pub fn with_lazy_merge(mut self, lazy: bool) -> Self {
        self.use_lazy_merge = lazy;
        self
    }

    #[must_use]
    pub fn with_preserve_order(mut self, preserve: bool) -> Self {
        self.preserve_order = preserve;
        self
    }

    /// Load options from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or does not parse.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
        serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse conversion options from {}", path.display()))
    }
}
