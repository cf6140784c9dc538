//! # hdump-root
//!
//! Native ROOT file reader for one-dimensional histograms.
//!
//! Enumerates the top-level keys of a `.root` file and decodes the TH1
//! family (`TH1C`, `TH1S`, `TH1I`, `TH1F`, `TH1D`) without requiring an
//! external ROOT installation. Supports zlib, LZ4, ZSTD, and XZ compression.
//!
//! ## Example
//!
//! ```no_run
//! use hdump_root::RootFile;
//!
//! let f = RootFile::open("data.root").unwrap();
//! for key in f.keys().unwrap() {
//!     let h = f.read_histogram(&key).unwrap();
//!     for bin in h.bins() {
//!         println!("{} {} {}", bin.low_edge, bin.content, bin.width);
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod datasource;
pub mod decompress;
pub mod directory;
pub mod error;
pub mod file;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixture;
pub mod histogram;
pub mod key;
pub mod objects;
pub mod rbuffer;

pub use error::{Result, RootError};
pub use file::RootFile;
pub use histogram::{Bin, BinErrorOption, Histogram};
pub use key::{Key, KeyInfo};
