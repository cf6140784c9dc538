//! TFile header parsing and top-level ROOT file interface.

use std::fs;
use std::path::{Path, PathBuf};

use crate::datasource::DataSource;
use crate::decompress::decompress;
use crate::directory::Directory;
use crate::error::{Result, RootError};
use crate::histogram::Histogram;
use crate::key::{Key, KeyInfo};
use crate::objects;
use crate::rbuffer::RBuffer;

const ROOT_MAGIC: &[u8; 4] = b"root";

/// Parsed ROOT file header.
#[derive(Debug, Clone, Copy)]
struct FileHeader {
    /// Whether the file uses large (64-bit) seek pointers (version >= 1000000).
    is_large: bool,
    /// Offset where top-level directory keys are stored.
    seek_keys: u64,
}

/// A ROOT file opened read-only.
pub struct RootFile {
    /// Raw file bytes (owned or memory-mapped).
    data: DataSource,
    /// Parsed header.
    header: FileHeader,
    /// Path for diagnostics.
    path: PathBuf,
}

impl std::fmt::Debug for RootFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootFile")
            .field("path", &self.path)
            .field("len", &self.data.len())
            .field("is_large", &self.header.is_large)
            .finish()
    }
}

impl RootFile {
    /// Open and parse a ROOT file from disk using memory mapping.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = fs::File::open(&path)?;
        let data = DataSource::map(&file)?;
        Self::from_datasource(data, path)
    }

    /// Parse a ROOT file from a byte vector.
    pub fn from_bytes(data: Vec<u8>, path: PathBuf) -> Result<Self> {
        Self::from_datasource(DataSource::Owned(data), path)
    }

    fn from_datasource(data: DataSource, path: PathBuf) -> Result<Self> {
        if data.len() < 64 || &data[0..4] != ROOT_MAGIC {
            return Err(RootError::BadMagic);
        }

        let header = Self::parse_header(&data)?;
        tracing::debug!(
            path = %path.display(),
            bytes = data.len(),
            large = header.is_large,
            "opened ROOT file"
        );
        Ok(Self { data, header, path })
    }

    /// Parse the file-level header and the embedded TDirectory.
    ///
    /// ROOT file header layout (small file, version < 1000000):
    /// ```text
    /// offset  size  field
    ///    0      4   magic "root"
    ///    4      4   fVersion
    ///    8      4   fBEGIN
    ///   12      4   fEND
    ///   16      4   fSeekFree
    ///   20      4   fNbytesFree
    ///   24      4   nfree
    ///   28      4   fNbytesName
    ///   32      1   fUnits
    ///   33      4   fCompress
    ///   37      4   fSeekInfo
    ///   41      4   fNbytesInfo
    ///   45     18   fUUID
    /// ```
    /// Large files widen fEND, fSeekFree and fSeekInfo to 8 bytes.
    /// The TDirectory streamer is located at `fBEGIN + fNbytesName`.
    fn parse_header(data: &[u8]) -> Result<FileHeader> {
        let mut r = RBuffer::new(data);
        r.skip(4)?; // magic

        let version = r.read_u32()?;
        let is_large = version >= 1_000_000;

        let begin = r.read_u32()? as usize;
        // fEND, fSeekFree
        r.skip(if is_large { 16 } else { 8 })?;
        // fNbytesFree, nfree
        r.skip(8)?;
        let nbytes_name = r.read_u32()? as usize;

        let seek_keys = Self::parse_top_directory(data, begin + nbytes_name)?;
        Ok(FileHeader { is_large, seek_keys })
    }

    /// Read `fSeekKeys` from the TDirectory streamer at `dir_offset`.
    fn parse_top_directory(data: &[u8], dir_offset: usize) -> Result<u64> {
        if dir_offset >= data.len() {
            return Err(RootError::Deserialization("TDirectory offset past end of file".into()));
        }

        let mut r = RBuffer::new(data);
        r.set_pos(dir_offset);

        let dir_version = r.read_u16()?;
        // fDatimeC, fDatimeM, fNbytesKeys, fNbytesName
        r.skip(16)?;

        if dir_version > 1000 {
            // fSeekDir, fSeekParent
            r.skip(16)?;
            r.read_u64()
        } else {
            r.skip(8)?;
            Ok(r.read_u32()? as u64)
        }
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether file uses 64-bit seek pointers.
    pub fn is_large(&self) -> bool {
        self.header.is_large
    }

    /// All top-level keys in on-disk order, every cycle included.
    pub fn keys(&self) -> Result<Vec<Key>> {
        Ok(self.read_top_directory()?.into_keys())
    }

    /// Top-level keys, keeping only the highest cycle of each name.
    pub fn latest_keys(&self) -> Result<Vec<Key>> {
        let dir = self.read_top_directory()?;
        Ok(dir.latest_cycles().into_iter().cloned().collect())
    }

    /// List all keys in the top-level directory.
    pub fn list_keys(&self) -> Result<Vec<KeyInfo>> {
        let dir = self.read_top_directory()?;
        Ok(dir.keys().iter().map(KeyInfo::from).collect())
    }

    /// Decode the histogram stored under an enumerated key.
    ///
    /// Non-histogram classes fail with [`RootError::UnsupportedClass`]
    /// without touching the payload.
    pub fn read_histogram(&self, key: &Key) -> Result<Histogram> {
        if !objects::is_histogram_class(&key.class_name) {
            return Err(RootError::UnsupportedClass(key.class_name.clone()));
        }
        let payload = self.read_key_payload(key)?;
        let mut h = objects::read_histogram(&payload, &key.class_name)?;
        if h.name.is_empty() {
            h.name = key.name.clone();
        }
        Ok(h)
    }

    /// Get a top-level histogram by name (highest cycle).
    pub fn get_histogram(&self, name: &str) -> Result<Histogram> {
        let dir = self.read_top_directory()?;
        let key = dir.find_key(name).ok_or_else(|| RootError::KeyNotFound(name.to_string()))?;
        self.read_histogram(key)
    }

    fn read_top_directory(&self) -> Result<Directory> {
        Directory::read_key_list(&self.data, self.header.seek_keys as usize, self.header.is_large)
    }

    /// Read and decompress the payload of a TKey.
    fn read_key_payload(&self, key: &Key) -> Result<Vec<u8>> {
        let key_slice = self.read_file_range(key.seek_key, key.n_bytes as u64)?;

        let obj_start = key.key_len as usize;
        if obj_start > key_slice.len() {
            return Err(RootError::Deserialization(format!(
                "key '{}': key_len {} exceeds n_bytes {}",
                key.name, key.key_len, key.n_bytes
            )));
        }
        let stored = &key_slice[obj_start..];

        if key.is_compressed() {
            decompress(stored, key.obj_len as usize)
        } else {
            Ok(stored.to_vec())
        }
    }

    fn read_file_range(&self, seek: u64, n_bytes: u64) -> Result<&[u8]> {
        let start: usize = seek
            .try_into()
            .map_err(|_| RootError::Deserialization(format!("seek offset too large: {}", seek)))?;
        let len: usize = n_bytes.try_into().map_err(|_| {
            RootError::Deserialization(format!("range length too large: {}", n_bytes))
        })?;
        let end = start.checked_add(len).ok_or_else(|| {
            RootError::Deserialization(format!(
                "range overflow for seek={} n_bytes={}",
                seek, n_bytes
            ))
        })?;
        if end > self.data.len() {
            return Err(RootError::BufferUnderflow {
                offset: start,
                need: len,
                have: self.data.len().saturating_sub(start),
            });
        }
        Ok(&self.data[start..end])
    }
}
