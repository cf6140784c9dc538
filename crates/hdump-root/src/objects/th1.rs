//! TH1C/TH1S/TH1I/TH1F/TH1D deserialization.
//!
//! Serialization layout (all embedded objects carry byte-count headers):
//! ```text
//! TH1x
//!   ├─ TH1 (base)
//!   │    ├─ TNamed (name, title)
//!   │    ├─ TAttLine, TAttFill, TAttMarker   (skipped)
//!   │    ├─ fNcells (i32)
//!   │    ├─ fXaxis (TAxis), fYaxis, fZaxis
//!   │    ├─ fBarOffset, fBarWidth (i16), fEntries, fTsumw, fTsumw2, fTsumwx, fTsumwx2
//!   │    ├─ fMaximum, fMinimum (v ≥ 2), fNormFactor (v ≥ 3)
//!   │    ├─ fContour (TArrayD), fSumw2 (TArrayD)
//!   │    ├─ fOption (TString), fFunctions (TList)
//!   │    └─ fBufferSize (v ≥ 4), fBinStatErrOpt (v ≥ 7), fStatOverflows (v ≥ 8)
//!   └─ TArrayC/S/I/F/D: fNcells bin contents, under/overflow included
//! ```

use crate::error::{Result, RootError};
use crate::histogram::{BinErrorOption, Histogram};
use crate::rbuffer::RBuffer;

/// Element type of the trailing TArray.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Storage {
    I8,
    I16,
    I32,
    F32,
    F64,
}

/// Read a TH1-family object from decompressed bytes.
pub(crate) fn read_th1(data: &[u8], class_name: &str, storage: Storage) -> Result<Histogram> {
    let mut r = RBuffer::new(data);

    let (ver, _end) = r.read_version()?;
    if ver < 1 {
        return Err(RootError::Deserialization(format!(
            "unsupported {} version: {}",
            class_name, ver
        )));
    }

    let base = read_th1_base(&mut r)?;

    let arr_n = r.read_u32()? as usize;
    if arr_n != base.n_cells {
        return Err(RootError::Deserialization(format!(
            "{} array size {} != fNcells {}",
            class_name, arr_n, base.n_cells
        )));
    }
    let raw = match storage {
        Storage::I8 => r.read_array_i8(arr_n)?,
        Storage::I16 => r.read_array_i16(arr_n)?,
        Storage::I32 => r.read_array_i32(arr_n)?,
        Storage::F32 => r.read_array_f32(arr_n)?,
        Storage::F64 => r.read_array_f64(arr_n)?,
    };

    build_histogram(base, class_name, &raw)
}

/// Axis info extracted from TAxis.
struct AxisInfo {
    n_bins: i32,
    x_min: f64,
    x_max: f64,
    /// Variable-width bin edges (empty for uniform binning).
    bin_edges: Vec<f64>,
}

/// Fields of the TH1 base class the exporter needs.
struct Th1Base {
    name: String,
    title: String,
    n_cells: usize,
    axis: AxisInfo,
    entries: f64,
    sumw2: Option<Vec<f64>>,
    error_option: BinErrorOption,
}

fn read_th1_base(r: &mut RBuffer) -> Result<Th1Base> {
    let (th1_ver, th1_end) = r.read_version()?;

    let (name, title) = r.read_tnamed()?;

    // TAttLine, TAttFill, TAttMarker
    for _ in 0..3 {
        skip_streamer_object(r)?;
    }

    let n_cells = r.read_i32()?;
    if n_cells < 3 {
        return Err(RootError::Deserialization(format!("fNcells too small: {}", n_cells)));
    }

    let axis = read_taxis(r)?;
    // fYaxis, fZaxis
    skip_streamer_object(r)?;
    skip_streamer_object(r)?;

    let _bar_offset = r.read_i16()?;
    let _bar_width = r.read_i16()?;
    let entries = r.read_f64()?;
    // fTsumw, fTsumw2, fTsumwx, fTsumwx2
    r.skip(4 * 8)?;
    if th1_ver >= 2 {
        // fMaximum, fMinimum
        r.skip(2 * 8)?;
    }
    if th1_ver >= 3 {
        // fNormFactor
        r.skip(8)?;
    }

    // fContour
    let contour_n = r.read_u32()? as usize;
    r.skip(contour_n.saturating_mul(8))?;

    let sumw2_n = r.read_u32()? as usize;
    let sumw2 = if sumw2_n > 0 { Some(r.read_array_f64(sumw2_n)?) } else { None };

    // fOption, fFunctions
    let _option = r.read_string()?;
    skip_streamer_object(r)?;

    if th1_ver >= 4 {
        // fBuffer: presence byte, then fBufferSize doubles
        let buffer_size = r.read_i32()?;
        r.skip(1)?;
        r.skip((buffer_size.max(0) as usize).saturating_mul(8))?;
    }

    let error_option = if th1_ver >= 7 {
        let raw = r.read_i32()?;
        BinErrorOption::from_raw(raw).ok_or_else(|| {
            RootError::Deserialization(format!("{}: unknown fBinStatErrOpt {}", name, raw))
        })?
    } else {
        BinErrorOption::Normal
    };
    if error_option != BinErrorOption::Normal {
        tracing::warn!(
            histogram = %name,
            option = ?error_option,
            "asymmetric Poisson bin errors requested; reporting symmetric errors"
        );
    }

    // fStatOverflows and anything newer
    match th1_end {
        Some(end) if r.pos() <= end => r.skip_to(end)?,
        Some(end) => {
            return Err(RootError::Deserialization(format!(
                "{}: TH1 fields overrun byte count ({} > {})",
                name,
                r.pos(),
                end
            )));
        }
        None => {
            return Err(RootError::Deserialization(
                "TH1 streamed without byte count".to_string(),
            ));
        }
    }

    Ok(Th1Base { name, title, n_cells: n_cells as usize, axis, entries, sumw2, error_option })
}

fn read_taxis(r: &mut RBuffer) -> Result<AxisInfo> {
    let (_ver, axis_end) = r.read_version()?;

    let (_name, _title) = r.read_tnamed()?;
    // TAttAxis
    skip_streamer_object(r)?;

    let n_bins = r.read_i32()?;
    let x_min = r.read_f64()?;
    let x_max = r.read_f64()?;

    // fXbins: variable bin edges
    let xbins_n = r.read_u32()? as usize;
    let bin_edges = if xbins_n > 0 { r.read_array_f64(xbins_n)? } else { Vec::new() };

    // fFirst, fLast, fBits2, fTimeDisplay, fTimeFormat, fLabels, fModLabs
    if let Some(end) = axis_end {
        r.skip_to(end)?;
    }

    Ok(AxisInfo { n_bins, x_min, x_max, bin_edges })
}

/// Skip an embedded object using its byte-count header.
fn skip_streamer_object(r: &mut RBuffer) -> Result<()> {
    let start = r.pos();
    let (ver, end) = r.read_version()?;
    match end {
        Some(end) => r.skip_to(end),
        None => Err(RootError::Deserialization(format!(
            "object at offset {} (version {}) has no byte count",
            start, ver
        ))),
    }
}

/// Split the raw cell array (with under/overflow) into a `Histogram`.
fn build_histogram(base: Th1Base, class_name: &str, raw: &[f64]) -> Result<Histogram> {
    let Th1Base { name, title, n_cells, axis, entries, sumw2, error_option } = base;

    if axis.n_bins < 1 {
        return Err(RootError::Deserialization(format!(
            "{}: axis has {} bins",
            name, axis.n_bins
        )));
    }
    let n_bins = axis.n_bins as usize;
    if n_cells != n_bins + 2 {
        return Err(RootError::Deserialization(format!(
            "{}: fNcells {} != n_bins {} + 2",
            name, n_cells, n_bins
        )));
    }

    // [underflow, bin1, ..., binN, overflow]
    let bin_content = raw[1..=n_bins].to_vec();

    let sumw2 = match sumw2 {
        Some(sw2) if sw2.len() == n_cells => Some(sw2[1..=n_bins].to_vec()),
        Some(sw2) => {
            return Err(RootError::Deserialization(format!(
                "{}: fSumw2 length {} != fNcells {}",
                name,
                sw2.len(),
                n_cells
            )));
        }
        None => None,
    };

    let (bin_edges, uniform_width) = if axis.bin_edges.is_empty() {
        let width = (axis.x_max - axis.x_min) / n_bins as f64;
        let edges = (0..=n_bins).map(|i| axis.x_min + i as f64 * width).collect();
        (edges, Some(width))
    } else if axis.bin_edges.len() == n_bins + 1 {
        (axis.bin_edges, None)
    } else {
        return Err(RootError::Deserialization(format!(
            "{}: {} variable edges for {} bins",
            name,
            axis.bin_edges.len(),
            n_bins
        )));
    };

    Ok(Histogram {
        name,
        title,
        class_name: class_name.to_string(),
        n_bins,
        x_min: axis.x_min,
        x_max: axis.x_max,
        bin_edges,
        uniform_width,
        bin_content,
        sumw2,
        underflow: raw[0],
        overflow: raw[n_bins + 1],
        entries,
        error_option,
    })
}
