//! ROOT object deserialization dispatch.

mod th1;

use crate::error::{Result, RootError};
use crate::histogram::Histogram;

/// Classes [`read_histogram`] can decode.
pub const SUPPORTED_CLASSES: &[&str] = &["TH1C", "TH1S", "TH1I", "TH1F", "TH1D"];

/// Whether `class_name` names a supported 1D histogram class.
pub fn is_histogram_class(class_name: &str) -> bool {
    SUPPORTED_CLASSES.contains(&class_name)
}

/// Read a histogram from a decompressed object payload, given its class name.
pub fn read_histogram(payload: &[u8], class_name: &str) -> Result<Histogram> {
    let storage = match class_name {
        "TH1C" => th1::Storage::I8,
        "TH1S" => th1::Storage::I16,
        "TH1I" => th1::Storage::I32,
        "TH1F" => th1::Storage::F32,
        "TH1D" => th1::Storage::F64,
        _ => return Err(RootError::UnsupportedClass(class_name.to_string())),
    };
    th1::read_th1(payload, class_name, storage)
}
