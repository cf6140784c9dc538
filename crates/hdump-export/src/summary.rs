//! Per-run report.

use std::path::PathBuf;

use serde::Serialize;

use crate::format::OutputMode;

/// Why an entry produced no output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipKind {
    /// Not a 1D histogram.
    EntryType,
    /// Histogram payload could not be decoded.
    EntryRead,
    /// Output file could not be created.
    OutputOpen,
    /// Output file was left incomplete.
    Write,
}

/// A histogram that was written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WrittenEntry {
    /// Entry name.
    pub name: String,
    /// File written.
    pub path: PathBuf,
    /// Number of lines (regular bins).
    pub bins: usize,
}

/// An entry that was skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedEntry {
    /// Entry name.
    pub name: String,
    /// Category.
    pub kind: SkipKind,
    /// Human-readable cause.
    pub reason: String,
}

/// Outcome of one export run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSummary {
    /// Output directory.
    pub output_dir: PathBuf,
    /// Column layout used.
    pub mode: OutputMode,
    /// Files written, in enumeration order.
    pub written: Vec<WrittenEntry>,
    /// Entries without output, in enumeration order.
    pub skipped: Vec<SkippedEntry>,
}

impl ExportSummary {
    pub(crate) fn new(output_dir: PathBuf, mode: OutputMode) -> Self {
        Self { output_dir, mode, written: Vec::new(), skipped: Vec::new() }
    }

    /// Whether every enumerated entry was written.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}
