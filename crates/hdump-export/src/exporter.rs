//! The export loop.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use hdump_root::{RootError, RootFile};

use crate::error::ExportError;
use crate::format::{ExportOptions, OutputMode, write_histogram};
use crate::source::HistogramSource;
use crate::summary::{ExportSummary, SkipKind, SkippedEntry, WrittenEntry};

/// Writes each histogram of a source to `<output_dir>/<name>.txt`.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    options: ExportOptions,
}

impl Exporter {
    /// Exporter with the given options.
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    /// Export every entry of `source` into `output_dir`.
    ///
    /// `output_dir` must already exist. Per-entry failures are logged and
    /// recorded in the summary; enumeration failure, or any other error that
    /// carries no [`SkipKind`], is returned.
    pub fn export<S: HistogramSource>(
        &self,
        source: &S,
        output_dir: &Path,
    ) -> Result<ExportSummary, ExportError> {
        let entries = source.entries().map_err(ExportError::Enumerate)?;
        tracing::debug!(entries = entries.len(), dir = %output_dir.display(), "exporting");

        let mut summary = ExportSummary::new(output_dir.to_path_buf(), self.options.mode);
        for entry in &entries {
            let name = source.entry_name(entry);
            match self.export_entry(source, entry, output_dir) {
                Ok(written) => {
                    tracing::info!(name, bins = written.bins, path = %written.path.display(), "wrote histogram");
                    summary.written.push(written);
                }
                Err(e) => {
                    let Some(kind) = e.skip_kind() else {
                        return Err(e);
                    };
                    tracing::warn!(name, "skipping entry: {}", e);
                    summary.skipped.push(SkippedEntry {
                        name: name.to_string(),
                        kind,
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(summary)
    }

    fn export_entry<S: HistogramSource>(
        &self,
        source: &S,
        entry: &S::Entry,
        output_dir: &Path,
    ) -> Result<WrittenEntry, ExportError> {
        let name = source.entry_name(entry);
        let h = source.histogram(entry).map_err(|e| match e {
            RootError::UnsupportedClass(class) => {
                ExportError::EntryType { name: name.to_string(), class }
            }
            source => ExportError::EntryRead { name: name.to_string(), source },
        })?;

        let path = output_path(output_dir, name)?;
        let file = File::create(&path)
            .map_err(|source| ExportError::OutputOpen { path: path.clone(), source })?;

        // The handle is released when `out` drops, on success and on error.
        let mut out = BufWriter::new(file);
        let bins = write_histogram(&h, &mut out, &self.options)
            .and_then(|n| out.flush().map(|()| n))
            .map_err(|source| ExportError::Write { path: path.clone(), source })?;

        Ok(WrittenEntry { name: name.to_string(), path, bins })
    }
}

/// `<output_dir>/<name>.txt`, refusing names that would escape `output_dir`.
fn output_path(output_dir: &Path, name: &str) -> Result<PathBuf, ExportError> {
    let file_name = format!("{}.txt", name);
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return Err(ExportError::OutputOpen {
            path: output_dir.join(&file_name),
            source: io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("entry name {:?} is not a plain file name", name),
            ),
        });
    }
    Ok(output_dir.join(file_name))
}

/// Export every histogram in the ROOT file at `input_path` into `output_dir`.
///
/// Fails with [`ExportError::InputOpen`] before writing anything if the input
/// cannot be opened or its entries cannot be listed.
pub fn export_all(
    input_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    include_errors: bool,
) -> Result<ExportSummary, ExportError> {
    let options = ExportOptions::new(OutputMode::from_include_errors(include_errors));
    export_with_options(input_path.as_ref(), output_dir.as_ref(), options)
}

/// [`export_all`] with explicit options.
pub fn export_with_options(
    input_path: &Path,
    output_dir: &Path,
    options: ExportOptions,
) -> Result<ExportSummary, ExportError> {
    let file = RootFile::open(input_path)
        .map_err(|source| ExportError::InputOpen { path: input_path.to_path_buf(), source })?;

    Exporter::new(options).export(&file, output_dir).map_err(|e| match e {
        ExportError::Enumerate(source) => {
            ExportError::InputOpen { path: input_path.to_path_buf(), source }
        }
        e => e,
    })
}

/// Three-column export: `low_edge content width`.
pub fn export_basic(
    input_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
) -> Result<ExportSummary, ExportError> {
    export_all(input_path, output_dir, false)
}

/// Four-column export: `low_edge content width error`.
pub fn export_with_errors(
    input_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
) -> Result<ExportSummary, ExportError> {
    export_all(input_path, output_dir, true)
}
