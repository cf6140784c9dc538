//! Byte storage behind an open `RootFile`.

use std::ops::Deref;

/// Backing storage for a ROOT file.
///
/// Files opened from disk are memory-mapped; `Owned` backs files built
/// in memory (`RootFile::from_bytes`).
pub enum DataSource {
    /// Bytes owned in a `Vec<u8>`.
    Owned(Vec<u8>),
    /// Read-only memory map of the file on disk.
    Mmap(memmap2::Mmap),
}

impl DataSource {
    /// Map `file` read-only.
    pub fn map(file: &std::fs::File) -> std::io::Result<Self> {
        // SAFETY: the mapping is read-only and the exporter never writes to
        // its input; concurrent external truncation is out of scope.
        let mmap = unsafe { memmap2::Mmap::map(file)? };
        Ok(DataSource::Mmap(mmap))
    }
}

impl Deref for DataSource {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        match self {
            DataSource::Owned(v) => v,
            DataSource::Mmap(m) => m,
        }
    }
}

impl AsRef<[u8]> for DataSource {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self
    }
}
