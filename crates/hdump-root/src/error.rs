//! Error types for ROOT file reading.

use thiserror::Error;

/// Errors produced while opening or decoding a ROOT file.
#[derive(Error, Debug)]
pub enum RootError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file does not start with the `root` magic.
    #[error("not a ROOT file (bad magic)")]
    BadMagic,

    /// A read ran past the end of the buffer.
    #[error("buffer underflow at offset {offset}: need {need} bytes, have {have}")]
    BufferUnderflow {
        /// Read position.
        offset: usize,
        /// Bytes requested.
        need: usize,
        /// Bytes available.
        have: usize,
    },

    /// A compression block could not be decoded.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// Malformed streamer data.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// No key with the given name.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// The object class is not a supported 1D histogram.
    #[error("unsupported class: {0}")]
    UnsupportedClass(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, RootError>;
