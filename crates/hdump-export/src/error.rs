//! Exporter error taxonomy.

use std::path::PathBuf;

use hdump_root::RootError;
use thiserror::Error;

use crate::summary::SkipKind;

/// Errors raised while exporting.
///
/// `InputOpen` and `Enumerate` abort the run; the per-entry variants are
/// reported and the run moves on to the next entry.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The input could not be opened as a ROOT file.
    #[error("cannot open input {}: {source}", path.display())]
    InputOpen {
        /// Input path.
        path: PathBuf,
        /// Underlying reader error.
        #[source]
        source: RootError,
    },

    /// The container opened but its entries could not be listed.
    #[error("cannot enumerate entries: {0}")]
    Enumerate(#[source] RootError),

    /// The entry is not a one-dimensional histogram.
    #[error("entry '{name}' is a {class}, not a 1D histogram")]
    EntryType {
        /// Entry name.
        name: String,
        /// Stored class.
        class: String,
    },

    /// The entry is a histogram class but could not be decoded.
    #[error("cannot read entry '{name}': {source}")]
    EntryRead {
        /// Entry name.
        name: String,
        /// Underlying reader error.
        #[source]
        source: RootError,
    },

    /// The output file could not be created.
    #[error("cannot open output {}: {source}", path.display())]
    OutputOpen {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing bin lines failed part-way; the file may be incomplete.
    #[error("cannot write {}: {source}", path.display())]
    Write {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    /// Whether this error aborts the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExportError::InputOpen { .. } | ExportError::Enumerate(_))
    }

    /// Summary category for per-entry errors, `None` for fatal ones.
    pub fn skip_kind(&self) -> Option<SkipKind> {
        match self {
            ExportError::InputOpen { .. } | ExportError::Enumerate(_) => None,
            ExportError::EntryType { .. } => Some(SkipKind::EntryType),
            ExportError::EntryRead { .. } => Some(SkipKind::EntryRead),
            ExportError::OutputOpen { .. } => Some(SkipKind::OutputOpen),
            ExportError::Write { .. } => Some(SkipKind::Write),
        }
    }
}
