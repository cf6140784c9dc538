//! Public histogram type returned by `RootFile::read_histogram`.
//!
//! Bin accessors use ROOT's numbering: bin 0 is the underflow, bins
//! `1..=n_bins` are the regular bins and `n_bins + 1` is the overflow.

/// A 1D histogram extracted from a ROOT file.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Histogram name.
    pub name: String,
    /// Histogram title.
    pub title: String,
    /// Stored class (`TH1D`, `TH1F`, ...).
    pub class_name: String,
    /// Number of bins (excluding under/overflow).
    pub n_bins: usize,
    /// Lower edge of first bin.
    pub x_min: f64,
    /// Upper edge of last bin.
    pub x_max: f64,
    /// Bin edges (length = n_bins + 1).
    pub bin_edges: Vec<f64>,
    /// Constant bin width of a uniform axis, `None` for variable binning.
    pub uniform_width: Option<f64>,
    /// Bin contents (length = n_bins, excluding under/overflow).
    pub bin_content: Vec<f64>,
    /// Sum of weights squared per bin (length = n_bins), if stored.
    pub sumw2: Option<Vec<f64>>,
    /// Underflow bin content.
    pub underflow: f64,
    /// Overflow bin content.
    pub overflow: f64,
    /// Number of entries recorded at fill time.
    pub entries: f64,
    /// Stored `fBinStatErrOpt`.
    pub error_option: BinErrorOption,
}

/// How ROOT was asked to compute bin errors (`TH1::EBinErrorOpt`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinErrorOption {
    /// Symmetric errors from `sumw2` or `sqrt(content)`.
    #[default]
    Normal,
    /// Asymmetric Poisson interval.
    Poisson,
    /// Asymmetric Poisson interval, zero-content bins included.
    Poisson2,
}

impl BinErrorOption {
    /// Decode the streamed enum value; unknown values yield `None`.
    pub fn from_raw(v: i32) -> Option<Self> {
        match v {
            0 => Some(Self::Normal),
            1 => Some(Self::Poisson),
            2 => Some(Self::Poisson2),
            _ => None,
        }
    }
}

/// One regular bin of a histogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    /// 1-based bin index.
    pub index: usize,
    /// Lower edge.
    pub low_edge: f64,
    /// Accumulated content.
    pub content: f64,
    /// Width (`upper - lower`).
    pub width: f64,
    /// Statistical error, see [`Histogram::error`].
    pub error: f64,
}

impl Histogram {
    /// Lower edge of bin `i` (1-based).
    ///
    /// # Panics
    /// If `i` is not a regular bin.
    pub fn low_edge(&self, i: usize) -> f64 {
        self.bin_edges[self.slot(i)]
    }

    /// Width of bin `i` (1-based).
    ///
    /// Uniform axes report the same `(x_max - x_min) / n_bins` for every
    /// bin; variable axes use the difference of adjacent edges.
    pub fn width(&self, i: usize) -> f64 {
        let s = self.slot(i);
        match self.uniform_width {
            Some(w) => w,
            None => self.bin_edges[s + 1] - self.bin_edges[s],
        }
    }

    /// Content of bin `i` (1-based).
    pub fn content(&self, i: usize) -> f64 {
        self.bin_content[self.slot(i)]
    }

    /// Statistical error of bin `i` (1-based).
    ///
    /// `sqrt(sumw2)` when per-bin sums of squared weights are stored,
    /// otherwise the Poisson estimate `sqrt(|content|)`. The symmetric
    /// estimate is returned whatever [`Histogram::error_option`] says.
    pub fn error(&self, i: usize) -> f64 {
        let s = self.slot(i);
        match &self.sumw2 {
            Some(sw2) => sw2[s].sqrt(),
            None => self.bin_content[s].abs().sqrt(),
        }
    }

    /// Regular bins in increasing index order.
    pub fn bins(&self) -> impl ExactSizeIterator<Item = Bin> + '_ {
        (1..self.n_bins + 1).map(|i| Bin {
            index: i,
            low_edge: self.low_edge(i),
            content: self.content(i),
            width: self.width(i),
            error: self.error(i),
        })
    }

    fn slot(&self, i: usize) -> usize {
        assert!(i >= 1 && i <= self.n_bins, "bin {} outside 1..={}", i, self.n_bins);
        i - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn two_bin(sumw2: Option<Vec<f64>>) -> Histogram {
        Histogram {
            name: "h".into(),
            title: String::new(),
            class_name: "TH1D".into(),
            n_bins: 2,
            x_min: 0.0,
            x_max: 2.0,
            bin_edges: vec![0.0, 1.0, 2.0],
            uniform_width: Some(1.0),
            bin_content: vec![5.0, 3.0],
            sumw2,
            underflow: 7.0,
            overflow: 9.0,
            entries: 8.0,
            error_option: BinErrorOption::Normal,
        }
    }

    #[test]
    fn accessors_are_one_based() {
        let h = two_bin(None);
        assert_eq!(h.low_edge(1), 0.0);
        assert_eq!(h.low_edge(2), 1.0);
        assert_eq!(h.content(1), 5.0);
        assert_eq!(h.width(2), 1.0);
    }

    #[test]
    fn bins_skip_flows() {
        let h = two_bin(None);
        let contents: Vec<f64> = h.bins().map(|b| b.content).collect();
        assert_eq!(contents, vec![5.0, 3.0]);
        assert_eq!(h.bins().len(), 2);
        assert_eq!(h.bins().map(|b| b.index).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn error_defaults_to_poisson() {
        let h = two_bin(None);
        assert_abs_diff_eq!(h.error(1), 5.0f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(h.error(2), 3.0f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn error_uses_sumw2_when_stored() {
        let h = two_bin(Some(vec![4.0, 0.25]));
        assert_eq!(h.error(1), 2.0);
        assert_eq!(h.error(2), 0.5);
    }

    #[test]
    fn variable_widths() {
        let mut h = two_bin(None);
        h.bin_edges = vec![0.0, 0.5, 2.0];
        h.uniform_width = None;
        assert_eq!(h.width(1), 0.5);
        assert_eq!(h.width(2), 1.5);
        assert_eq!(h.low_edge(2), 0.5);
    }

    #[test]
    fn uniform_width_is_constant() {
        let n = 10;
        let w = (1.0 - (-1.0)) / n as f64;
        let h = Histogram {
            n_bins: n,
            x_min: -1.0,
            x_max: 1.0,
            bin_edges: (0..=n).map(|i| -1.0 + i as f64 * w).collect(),
            uniform_width: Some(w),
            bin_content: vec![1.0; n],
            sumw2: None,
            ..two_bin(None)
        };
        let widths: Vec<f64> = h.bins().map(|b| b.width).collect();
        assert!(widths.iter().all(|&x| x == 0.2));
        // Edge differences drift in the last bits; the width must not.
        assert_ne!(h.bin_edges[3] - h.bin_edges[2], 0.2);
    }

    #[test]
    fn error_option_decodes() {
        assert_eq!(BinErrorOption::from_raw(0), Some(BinErrorOption::Normal));
        assert_eq!(BinErrorOption::from_raw(1), Some(BinErrorOption::Poisson));
        assert_eq!(BinErrorOption::from_raw(2), Some(BinErrorOption::Poisson2));
        assert_eq!(BinErrorOption::from_raw(7), None);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn overflow_index_panics() {
        two_bin(None).content(3);
    }
}
