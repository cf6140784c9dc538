//! Minimal ROOT file writer for tests.
//!
//! Produces files the reader in this crate understands: a file header, the
//! top-level directory record, one key per object (optionally
//! zlib-compressed) and the key list. Enabled under `cfg(test)` and by the
//! `fixtures` feature.

use std::io::Write;
use std::path::Path;

use flate2::Compression;
use flate2::write::ZlibEncoder;

use crate::rbuffer::BYTE_COUNT_MASK;

const BEGIN: usize = 100;
const DIR_RECORD_LEN: usize = 64;
const FILE_NAME: &str = "fixture.root";

/// A histogram to be streamed as a TH1 object.
#[derive(Debug, Clone)]
pub struct FixtureHistogram {
    /// Object name.
    pub name: String,
    /// Object title.
    pub title: String,
    /// One of `TH1C`, `TH1S`, `TH1I`, `TH1F`, `TH1D`.
    pub class_name: String,
    /// Axis lower edge.
    pub x_min: f64,
    /// Axis upper edge.
    pub x_max: f64,
    /// Explicit edges for variable binning (empty for uniform).
    pub edges: Vec<f64>,
    /// Regular bin contents.
    pub contents: Vec<f64>,
    /// Regular-bin sums of squared weights.
    pub sumw2: Option<Vec<f64>>,
    /// Underflow content.
    pub underflow: f64,
    /// Overflow content.
    pub overflow: f64,
    /// Unprocessed fill buffer (`fBuffer`).
    pub fill_buffer: Vec<f64>,
    /// Raw `fBinStatErrOpt`.
    pub error_option: i32,
}

impl FixtureHistogram {
    /// Uniformly binned TH1D over `[x_min, x_max)`.
    pub fn uniform(name: &str, x_min: f64, x_max: f64, contents: &[f64]) -> Self {
        Self {
            name: name.to_string(),
            title: name.to_string(),
            class_name: "TH1D".to_string(),
            x_min,
            x_max,
            edges: Vec::new(),
            contents: contents.to_vec(),
            sumw2: None,
            underflow: 0.0,
            overflow: 0.0,
            fill_buffer: Vec::new(),
            error_option: 0,
        }
    }

    /// Variable-width TH1D with explicit `edges` (`contents.len() + 1` values).
    pub fn variable(name: &str, edges: &[f64], contents: &[f64]) -> Self {
        let mut h = Self::uniform(name, edges[0], edges[edges.len() - 1], contents);
        h.edges = edges.to_vec();
        h
    }

    /// Store as a different TH1 class.
    pub fn with_class(mut self, class_name: &str) -> Self {
        self.class_name = class_name.to_string();
        self
    }

    /// Store per-bin sums of squared weights.
    pub fn with_sumw2(mut self, sumw2: &[f64]) -> Self {
        self.sumw2 = Some(sumw2.to_vec());
        self
    }

    /// Set under/overflow contents.
    pub fn with_flows(mut self, underflow: f64, overflow: f64) -> Self {
        self.underflow = underflow;
        self.overflow = overflow;
        self
    }

    /// Keep a pending fill buffer in the streamed object.
    pub fn with_fill_buffer(mut self, buffer: &[f64]) -> Self {
        self.fill_buffer = buffer.to_vec();
        self
    }

    /// Set the streamed `fBinStatErrOpt` value.
    pub fn with_error_option(mut self, raw: i32) -> Self {
        self.error_option = raw;
        self
    }

    /// Stream this histogram as a TH1 object payload.
    pub fn payload(&self) -> Vec<u8> {
        let n = self.contents.len();
        let mut cells = Vec::with_capacity(n + 2);
        cells.push(self.underflow);
        cells.extend_from_slice(&self.contents);
        cells.push(self.overflow);

        let mut w = Writer::default();
        w.versioned(3, |w| {
            w.versioned(8, |w| {
                w.tnamed(&self.name, &self.title);
                // TAttLine, TAttFill, TAttMarker
                w.versioned(2, |w| {
                    w.u16(602);
                    w.u16(1);
                    w.u16(1);
                });
                w.versioned(2, |w| {
                    w.u16(0);
                    w.u16(1001);
                });
                w.versioned(2, |w| {
                    w.u16(1);
                    w.u16(1);
                    w.f32(1.0);
                });
                w.i32((n + 2) as i32);
                w.taxis("xaxis", n as i32, self.x_min, self.x_max, &self.edges);
                w.taxis("yaxis", 1, 0.0, 1.0, &[]);
                w.taxis("zaxis", 1, 0.0, 1.0, &[]);
                w.i16(0);
                w.i16(1000);
                w.f64(cells.iter().sum());
                // fTsumw, fTsumw2, fTsumwx, fTsumwx2
                w.f64(self.contents.iter().sum());
                for _ in 0..3 {
                    w.f64(0.0);
                }
                // fMaximum, fMinimum, fNormFactor
                w.f64(-1111.0);
                w.f64(-1111.0);
                w.f64(0.0);
                // fContour
                w.u32(0);
                match &self.sumw2 {
                    Some(sw2) => {
                        w.u32((n + 2) as u32);
                        w.f64(0.0);
                        for &v in sw2 {
                            w.f64(v);
                        }
                        w.f64(0.0);
                    }
                    None => w.u32(0),
                }
                // fOption
                w.string("");
                // fFunctions: empty TList
                w.versioned(5, |w| {
                    w.tobject();
                    w.string("");
                    w.i32(0);
                });
                // fBufferSize, fBuffer (presence byte + values)
                w.i32(self.fill_buffer.len() as i32);
                w.bytes(&[u8::from(!self.fill_buffer.is_empty())]);
                for &v in &self.fill_buffer {
                    w.f64(v);
                }
                // fBinStatErrOpt, fStatOverflows
                w.i32(self.error_option);
                w.i32(2);
            });
            w.u32(cells.len() as u32);
            for &v in &cells {
                match self.class_name.as_str() {
                    "TH1C" => w.bytes(&[(v as i8) as u8]),
                    "TH1S" => w.i16(v as i16),
                    "TH1I" => w.i32(v as i32),
                    "TH1F" => w.f32(v as f32),
                    _ => w.f64(v),
                }
            }
        });
        w.buf
    }
}

struct Entry {
    name: String,
    class_name: String,
    cycle: u16,
    payload: Vec<u8>,
}

/// Assembles a complete ROOT file in memory.
#[derive(Default)]
pub struct RootFileBuilder {
    entries: Vec<Entry>,
    compress: bool,
    large: bool,
}

impl RootFileBuilder {
    /// Empty file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Zlib-compress object payloads (when compression actually shrinks them).
    pub fn compressed(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Use the 64-bit seek layout.
    pub fn large(mut self, large: bool) -> Self {
        self.large = large;
        self
    }

    /// Add a histogram with cycle 1.
    pub fn histogram(self, h: &FixtureHistogram) -> Self {
        self.histogram_cycle(h, 1)
    }

    /// Add a histogram under an explicit cycle number.
    pub fn histogram_cycle(self, h: &FixtureHistogram, cycle: u16) -> Self {
        let payload = h.payload();
        self.object(&h.name, &h.class_name, cycle, payload)
    }

    /// Add an arbitrary object.
    pub fn object(mut self, name: &str, class_name: &str, cycle: u16, payload: Vec<u8>) -> Self {
        self.entries.push(Entry {
            name: name.to_string(),
            class_name: class_name.to_string(),
            cycle,
            payload,
        });
        self
    }

    /// Write the file to `path`.
    pub fn write_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        std::fs::write(path, self.build())
    }

    /// Serialize the whole file.
    pub fn build(&self) -> Vec<u8> {
        let large = self.large;
        let mut w = Writer::default();

        // File header, patched at the end.
        w.bytes(b"root");
        w.u32(if large { 1_062_206 } else { 62_206 });
        w.u32(BEGIN as u32);
        w.seek(large, 0); // fEND
        w.seek(large, 0); // fSeekFree
        w.u32(0); // fNbytesFree
        w.u32(0); // nfree
        let nbytes_name_at = w.buf.len();
        w.u32(0); // fNbytesName
        w.u8(if large { 8 } else { 4 });
        w.u32(if self.compress { 101 } else { 0 });
        w.seek(large, 0); // fSeekInfo
        w.u32(0); // fNbytesInfo
        w.bytes(&[0u8; 18]); // fUUID
        w.buf.resize(BEGIN, 0);

        // Name record: TKey + name + title, then the TDirectory streamer.
        let name_key_len = key_len(large, "TFile", FILE_NAME, "");
        let nbytes_name = name_key_len + string_len(FILE_NAME) + string_len("");
        let record_len = nbytes_name + DIR_RECORD_LEN;
        w.key_header(
            large,
            &KeyHeader {
                n_bytes: record_len as u32,
                obj_len: (record_len - name_key_len) as u32,
                key_len: name_key_len as u16,
                cycle: 1,
                seek_key: BEGIN as u64,
                seek_pdir: 0,
                class_name: "TFile",
                name: FILE_NAME,
                title: "",
            },
        );
        w.string(FILE_NAME);
        w.string("");
        w.patch_u32(nbytes_name_at, nbytes_name as u32);

        let dir_at = w.buf.len();
        w.u16(if large { 1005 } else { 5 });
        w.u32(0); // fDatimeC
        w.u32(0); // fDatimeM
        w.u32(0); // fNbytesKeys
        w.u32(nbytes_name as u32);
        w.seek(large, BEGIN as u64); // fSeekDir
        w.seek(large, 0); // fSeekParent
        let seek_keys_at = w.buf.len();
        w.seek(large, 0); // fSeekKeys
        w.buf.resize(dir_at + DIR_RECORD_LEN, 0);

        // Object records.
        let mut headers = Vec::with_capacity(self.entries.len());
        for e in &self.entries {
            let stored = if self.compress { zlib_block(&e.payload) } else { None };
            let data = stored.as_deref().unwrap_or(&e.payload);
            let klen = key_len(large, &e.class_name, &e.name, &e.name);
            let header = OwnedKeyHeader {
                n_bytes: (klen + data.len()) as u32,
                obj_len: e.payload.len() as u32,
                key_len: klen as u16,
                cycle: e.cycle,
                seek_key: w.buf.len() as u64,
                class_name: e.class_name.clone(),
                name: e.name.clone(),
            };
            w.key_header(large, &header.borrowed(BEGIN as u64));
            w.bytes(data);
            headers.push(header);
        }

        // Key list.
        let seek_keys = w.buf.len();
        let list_key_len = key_len(large, "TFile", FILE_NAME, "");
        let list_body: usize =
            4 + headers.iter().map(|h| h.key_len as usize).sum::<usize>();
        w.key_header(
            large,
            &KeyHeader {
                n_bytes: (list_key_len + list_body) as u32,
                obj_len: list_body as u32,
                key_len: list_key_len as u16,
                cycle: 1,
                seek_key: seek_keys as u64,
                seek_pdir: BEGIN as u64,
                class_name: "TFile",
                name: FILE_NAME,
                title: "",
            },
        );
        w.u32(headers.len() as u32);
        for h in &headers {
            w.key_header(large, &h.borrowed(BEGIN as u64));
        }
        let nbytes_keys = w.buf.len() - seek_keys;

        let end = w.buf.len() as u64;
        w.patch_seek(large, 12, end);
        w.patch_u32(dir_at + 10, nbytes_keys as u32);
        w.patch_seek(large, seek_keys_at, seek_keys as u64);
        w.buf
    }
}

struct KeyHeader<'a> {
    n_bytes: u32,
    obj_len: u32,
    key_len: u16,
    cycle: u16,
    seek_key: u64,
    seek_pdir: u64,
    class_name: &'a str,
    name: &'a str,
    title: &'a str,
}

struct OwnedKeyHeader {
    n_bytes: u32,
    obj_len: u32,
    key_len: u16,
    cycle: u16,
    seek_key: u64,
    class_name: String,
    name: String,
}

impl OwnedKeyHeader {
    fn borrowed(&self, seek_pdir: u64) -> KeyHeader<'_> {
        KeyHeader {
            n_bytes: self.n_bytes,
            obj_len: self.obj_len,
            key_len: self.key_len,
            cycle: self.cycle,
            seek_key: self.seek_key,
            seek_pdir,
            class_name: &self.class_name,
            name: &self.name,
            title: &self.name,
        }
    }
}

fn string_len(s: &str) -> usize {
    if s.len() < 255 { 1 + s.len() } else { 5 + s.len() }
}

fn key_len(large: bool, class_name: &str, name: &str, title: &str) -> usize {
    let seeks = if large { 16 } else { 8 };
    18 + seeks + string_len(class_name) + string_len(name) + string_len(title)
}

/// One ZL block, or `None` when compression would not shrink the payload.
fn zlib_block(payload: &[u8]) -> Option<Vec<u8>> {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(payload).ok()?;
    let compressed = enc.finish().ok()?;
    if compressed.len() + 9 >= payload.len() {
        return None;
    }
    let mut block = Vec::with_capacity(compressed.len() + 9);
    block.extend_from_slice(b"ZL");
    block.push(8);
    block.extend_from_slice(&(compressed.len() as u32).to_le_bytes()[..3]);
    block.extend_from_slice(&(payload.len() as u32).to_le_bytes()[..3]);
    block.extend_from_slice(&compressed);
    Some(block)
}

#[derive(Default)]
struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn bytes(&mut self, b: &[u8]) {
        self.buf.extend_from_slice(b);
    }
    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }
    fn u16(&mut self, v: u16) {
        self.bytes(&v.to_be_bytes());
    }
    fn i16(&mut self, v: i16) {
        self.bytes(&v.to_be_bytes());
    }
    fn u32(&mut self, v: u32) {
        self.bytes(&v.to_be_bytes());
    }
    fn i32(&mut self, v: i32) {
        self.bytes(&v.to_be_bytes());
    }
    fn f32(&mut self, v: f32) {
        self.bytes(&v.to_be_bytes());
    }
    fn f64(&mut self, v: f64) {
        self.bytes(&v.to_be_bytes());
    }
    fn seek(&mut self, large: bool, v: u64) {
        if large { self.bytes(&v.to_be_bytes()) } else { self.u32(v as u32) }
    }
    fn string(&mut self, s: &str) {
        if s.len() < 255 {
            self.u8(s.len() as u8);
        } else {
            self.u8(255);
            self.u32(s.len() as u32);
        }
        self.bytes(s.as_bytes());
    }
    fn patch_u32(&mut self, at: usize, v: u32) {
        self.buf[at..at + 4].copy_from_slice(&v.to_be_bytes());
    }
    fn patch_seek(&mut self, large: bool, at: usize, v: u64) {
        if large {
            self.buf[at..at + 8].copy_from_slice(&v.to_be_bytes());
        } else {
            self.patch_u32(at, v as u32);
        }
    }

    /// Byte-count header + version, then `body`, then patch the count.
    fn versioned(&mut self, version: u16, body: impl FnOnce(&mut Self)) {
        let at = self.buf.len();
        self.u32(0);
        self.u16(version);
        body(self);
        let count = (self.buf.len() - at - 4) as u32;
        self.patch_u32(at, count | BYTE_COUNT_MASK);
    }

    fn tobject(&mut self) {
        self.u16(1);
        self.u32(0);
        self.u32(0x0300_0000);
    }

    fn tnamed(&mut self, name: &str, title: &str) {
        self.versioned(1, |w| {
            w.tobject();
            w.string(name);
            w.string(title);
        });
    }

    fn taxis(&mut self, name: &str, n_bins: i32, x_min: f64, x_max: f64, edges: &[f64]) {
        self.versioned(10, |w| {
            w.tnamed(name, "");
            // TAttAxis
            w.versioned(4, |w| {
                w.i32(510);
                for _ in 0..3 {
                    w.i16(1);
                }
                for _ in 0..5 {
                    w.f32(0.035);
                }
                w.i16(1);
                w.i16(42);
            });
            w.i32(n_bins);
            w.f64(x_min);
            w.f64(x_max);
            w.u32(edges.len() as u32);
            for &e in edges {
                w.f64(e);
            }
            // fFirst, fLast, fBits2, fTimeDisplay, fTimeFormat, fLabels, fModLabs
            w.i32(0);
            w.i32(0);
            w.u16(0);
            w.u8(0);
            w.string("");
            w.u32(0);
            w.u32(0);
        });
    }

    fn key_header(&mut self, large: bool, k: &KeyHeader<'_>) {
        self.u32(k.n_bytes);
        self.u16(if large { 1004 } else { 4 });
        self.u32(k.obj_len);
        self.u32(0); // datime
        self.u16(k.key_len);
        self.u16(k.cycle);
        self.seek(large, k.seek_key);
        self.seek(large, k.seek_pdir);
        self.string(k.class_name);
        self.string(k.name);
        self.string(k.title);
    }
}
