//! Testing utilities for conversions.
//!
//! This module lets end-users (and this crate's own tests) exercise the whole
//! parallel path without real SAS files:
//!
//! - **Mock decoder**: [`MockDecoder`] serves row ranges out of an in-memory
//!   table and can be told to fail, panic, stall, or return a malformed
//!   fragment at chosen offsets. It counts every call it receives.
//! - **Scripted confirmation**: [`ScriptedConfirm`] answers the
//!   high-worker-count prompt and remembers what it was asked.
//! - **Fixtures**: [`sample_records`] / [`sample_table`] build typed datasets
//!   and convert them to Arrow through `serde_arrow`.
//! - **Assertions**: compare tables in order or as id sets.
//! - **Mock I/O**: temporary files with the right suffix.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use sasquatch::testing::*;
//! use sasquatch::{ConvertOptions, Converter};
//!
//! # fn main() -> anyhow::Result<()> {
//! let table = sample_table(2_500)?;
//! let decoder = Arc::new(MockDecoder::new(table.clone()));
//! let file = mock_sas_file()?;
//!
//! let out = Converter::new(decoder)
//!     .with_cpu_count(|| 8)
//!     .with_confirm(ScriptedConfirm::yes())
//!     .convert(file.path(), &ConvertOptions::default().with_chunk_size(1_000).with_processes(2))?;
//!
//! assert_tables_equal(&out, &table);
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod fixtures;
pub mod mock_decoder;
pub mod mock_io;

pub use assertions::*;
pub use fixtures::*;
pub use mock_decoder::*;
pub use mock_io::*;
