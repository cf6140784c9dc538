//! Text rendering of histogram bins.

use std::io::{self, Write};

use hdump_root::{Bin, Histogram};
use serde::Serialize;

/// Which columns each line carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// `low_edge content width`
    #[default]
    Basic,
    /// `low_edge content width error`
    WithErrors,
}

impl OutputMode {
    /// Mode selected by the `include_errors` flag.
    pub fn from_include_errors(include_errors: bool) -> Self {
        if include_errors { OutputMode::WithErrors } else { OutputMode::Basic }
    }

    /// Number of fields per line.
    pub fn columns(self) -> usize {
        match self {
            OutputMode::Basic => 3,
            OutputMode::WithErrors => 4,
        }
    }
}

/// Float rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    /// Shortest representation that parses back to the same `f64`.
    #[default]
    Shortest,
    /// Fixed number of digits after the decimal point.
    Fixed(usize),
}

impl Precision {
    fn render(self, out: &mut String, v: f64) {
        use std::fmt::Write as _;
        // Writing into a String cannot fail.
        let _ = match self {
            Precision::Shortest => write!(out, "{}", v),
            Precision::Fixed(digits) => write!(out, "{:.*}", digits, v),
        };
    }
}

/// Options shared by every file of one export run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportOptions {
    /// Column layout.
    pub mode: OutputMode,
    /// Float rendering.
    pub precision: Precision,
}

impl ExportOptions {
    /// Options for `mode` with shortest float rendering.
    pub fn new(mode: OutputMode) -> Self {
        Self { mode, precision: Precision::Shortest }
    }

    /// Override the float rendering.
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }
}

/// Render one bin as a line (without the trailing newline).
pub fn format_line(bin: &Bin, options: &ExportOptions) -> String {
    let mut line = String::with_capacity(64);
    let fields = [bin.low_edge, bin.content, bin.width, bin.error];
    for (i, &v) in fields[..options.mode.columns()].iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        options.precision.render(&mut line, v);
    }
    line
}

/// Write one line per regular bin of `h`. Returns the number of lines.
pub fn write_histogram<W: Write>(h: &Histogram, out: &mut W, options: &ExportOptions) -> io::Result<usize> {
    let mut lines = 0;
    for bin in h.bins() {
        let mut line = format_line(&bin, options);
        line.push('\n');
        out.write_all(line.as_bytes())?;
        lines += 1;
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdump_root::BinErrorOption;

    fn hist(sumw2: Option<Vec<f64>>) -> Histogram {
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
            underflow: 100.0,
            overflow: 200.0,
            entries: 308.0,
            error_option: BinErrorOption::Normal,
        }
    }

    fn render(h: &Histogram, options: ExportOptions) -> String {
        let mut buf = Vec::new();
        write_histogram(h, &mut buf, &options).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn basic_lines() {
        let text = render(&hist(None), ExportOptions::new(OutputMode::Basic));
        assert_eq!(text, "0 5 1\n1 3 1\n");
    }

    #[test]
    fn error_lines_use_sumw2() {
        let h = hist(Some(vec![2.236 * 2.236, 1.732 * 1.732]));
        let text = render(&h, ExportOptions::new(OutputMode::WithErrors));
        let lines: Vec<Vec<f64>> = text
            .lines()
            .map(|l| l.split(' ').map(|f| f.parse().unwrap()).collect())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(&lines[0][..3], &[0.0, 5.0, 1.0]);
        assert!((lines[0][3] - 2.236).abs() < 1e-12);
        assert!((lines[1][3] - 1.732).abs() < 1e-12);
    }

    #[test]
    fn exact_error_text() {
        let bin = Bin { index: 1, low_edge: 0.0, content: 5.0, width: 1.0, error: 2.236 };
        assert_eq!(format_line(&bin, &ExportOptions::new(OutputMode::WithErrors)), "0 5 1 2.236");
    }

    #[test]
    fn flows_never_written() {
        let text = render(&hist(None), ExportOptions::default());
        assert!(!text.contains("100"));
        assert!(!text.contains("200"));
    }

    #[test]
    fn column_counts() {
        for mode in [OutputMode::Basic, OutputMode::WithErrors] {
            let text = render(&hist(None), ExportOptions::new(mode));
            for line in text.lines() {
                assert_eq!(line.split_whitespace().count(), mode.columns());
            }
        }
    }

    #[test]
    fn fixed_precision() {
        let bin = Bin { index: 1, low_edge: 0.25, content: 1.0 / 3.0, width: 0.5, error: 0.0 };
        let opts = ExportOptions::new(OutputMode::Basic).with_precision(Precision::Fixed(3));
        assert_eq!(format_line(&bin, &opts), "0.250 0.333 0.500");
    }

    #[test]
    fn shortest_round_trips() {
        let v = 0.1 + 0.2;
        let bin = Bin { index: 1, low_edge: v, content: 1e-300, width: 12345.678, error: 0.0 };
        let line = format_line(&bin, &ExportOptions::default());
        let parsed: Vec<f64> = line.split(' ').map(|f| f.parse().unwrap()).collect();
        assert_eq!(parsed, vec![v, 1e-300, 12345.678]);
    }

    #[test]
    fn mode_from_flag() {
        assert_eq!(OutputMode::from_include_errors(false), OutputMode::Basic);
        assert_eq!(OutputMode::from_include_errors(true), OutputMode::WithErrors);
    }
}
