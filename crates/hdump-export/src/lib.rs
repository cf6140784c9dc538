//! # hdump-export
//!
//! Writes every top-level 1D histogram of a ROOT file to
//! `<output_dir>/<name>.txt`, one line per regular bin:
//!
//! ```text
//! <low_edge> <content> <width>            (basic)
//! <low_edge> <content> <width> <error>    (with errors)
//! ```
//!
//! Entries that are not 1D histograms, or whose output file cannot be
//! written, are skipped and reported in the returned [`ExportSummary`].
//! Only a failure to open or enumerate the input aborts the run.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod exporter;
pub mod format;
pub mod source;
pub mod summary;

pub use error::ExportError;
pub use exporter::{Exporter, export_all, export_basic, export_with_errors, export_with_options};
pub use format::{ExportOptions, OutputMode, Precision, format_line, write_histogram};
pub use source::HistogramSource;
pub use summary::{ExportSummary, SkipKind, SkippedEntry, WrittenEntry};
