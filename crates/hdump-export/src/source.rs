//! Containers the exporter can read from.

use hdump_root::{Histogram, Key, Result, RootFile};

/// A container of named entries, some of which are 1D histograms.
///
/// The exporter holds the source by reference for the whole run and reads
/// bin data straight from the enumerated entry.
pub trait HistogramSource {
    /// Handle yielded by enumeration.
    type Entry;

    /// Top-level entries, in the order the container reports them.
    fn entries(&self) -> Result<Vec<Self::Entry>>;

    /// Name of an enumerated entry.
    fn entry_name<'e>(&self, entry: &'e Self::Entry) -> &'e str;

    /// Decode the entry as a 1D histogram.
    ///
    /// Fails with `RootError::UnsupportedClass` when the entry holds
    /// something else.
    fn histogram(&self, entry: &Self::Entry) -> Result<Histogram>;
}

impl HistogramSource for RootFile {
    type Entry = Key;

    /// One key per name; older cycles are shadowed by the newest one.
    fn entries(&self) -> Result<Vec<Key>> {
        self.latest_keys()
    }

    fn entry_name<'e>(&self, entry: &'e Key) -> &'e str {
        &entry.name
    }

    fn histogram(&self, entry: &Key) -> Result<Histogram> {
        self.read_histogram(entry)
    }
}
