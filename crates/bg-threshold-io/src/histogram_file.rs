//! Plain-text histogram files.
//!
//! ```text
//! numRows numCols minVal maxVal
//! intensity frequency
//! intensity frequency
//! ...
//! ```
//!
//! Blank lines are skipped and columns past the second are ignored.

use crate::HistIoError;
use bg_threshold_core::{Histogram, ImageHeader, OutOfRangePolicy};
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

/// Parsed histogram file before it is loaded into a [`Histogram`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistogramInput {
    pub header: ImageHeader,
    pub entries: Vec<(i64, u32)>,
}

impl HistogramInput {
    /// Load the entries into a fresh histogram sized by the header.
    pub fn to_histogram(&self, policy: OutOfRangePolicy) -> Result<Histogram, HistIoError> {
        let mut hist = Histogram::new(self.header)?;
        let max_height = hist.set_histogram(&self.entries, policy)?;
        debug!(
            "loaded {} entries, max_val={}, max_height={max_height}",
            self.entries.len(),
            self.header.max_val
        );
        Ok(hist)
    }
}

fn malformed(line: usize, reason: impl Into<String>) -> HistIoError {
    HistIoError::MalformedHistogramInput {
        line,
        reason: reason.into(),
    }
}

fn field<T: FromStr>(tok: &str, name: &str, line: usize) -> Result<T, HistIoError> {
    tok.parse()
        .map_err(|_| malformed(line, format!("invalid {name} `{tok}`")))
}

fn parse_header(text: &str, line: usize) -> Result<ImageHeader, HistIoError> {
    let toks: Vec<&str> = text.split_whitespace().collect();
    if toks.len() < 4 {
        return Err(malformed(
            line,
            format!(
                "expected header `numRows numCols minVal maxVal`, got {} field(s)",
                toks.len()
            ),
        ));
    }
    let num_rows: u32 = field(toks[0], "numRows", line)?;
    let num_cols: u32 = field(toks[1], "numCols", line)?;
    let min_val: u32 = field(toks[2], "minVal", line)?;
    let max_val: u32 = field(toks[3], "maxVal", line)?;
    ImageHeader::new(num_rows, num_cols, min_val, max_val)
        .map_err(|e| malformed(line, e.to_string()))
}

/// Parse a histogram file from any buffered reader.
pub fn parse_histogram<R: BufRead>(reader: R) -> Result<HistogramInput, HistIoError> {
    let mut header = None;
    let mut entries: Vec<(i64, u32)> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if header.is_none() {
            header = Some(parse_header(text, line_no)?);
            continue;
        }
        let mut toks = text.split_whitespace();
        let (Some(i), Some(f)) = (toks.next(), toks.next()) else {
            return Err(malformed(line_no, "expected `intensity frequency`"));
        };
        let intensity: i64 = field(i, "intensity", line_no)?;
        let frequency: u32 = field(f, "frequency", line_no)?;
        entries.push((intensity, frequency));
    }

    let header = header.ok_or_else(|| malformed(1, "missing header line"))?;
    Ok(HistogramInput { header, entries })
}

/// Parse a histogram held in memory.
pub fn parse_histogram_str(text: &str) -> Result<HistogramInput, HistIoError> {
    parse_histogram(text.as_bytes())
}

/// Read and parse a histogram file.
pub fn load_histogram(path: impl AsRef<Path>) -> Result<HistogramInput, HistIoError> {
    let file = File::open(path)?;
    parse_histogram(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_header_and_entries() {
        let input = parse_histogram_str("10 10 0 9\n1 2\n\n  3 9 extra\n9 5\n").unwrap();
        assert_eq!(ImageHeader::new(10, 10, 0, 9).unwrap(), input.header);
        assert_eq!(vec![(1, 2), (3, 9), (9, 5)], input.entries);
    }

    #[test]
    fn keeps_out_of_range_entries_for_the_policy() {
        let input = parse_histogram_str("1 1 0 3\n-2 4\n7 1\n").unwrap();
        assert_eq!(vec![(-2, 4), (7, 1)], input.entries);
        let hist = input.to_histogram(OutOfRangePolicy::Clamp).unwrap();
        assert_eq!(&[4, 0, 0, 1], hist.counts());
    }

    #[test]
    fn reports_line_of_bad_field() {
        let err = parse_histogram_str("4 4 0 9\n1 2\n3 x\n").unwrap_err();
        match err {
            HistIoError::MalformedHistogramInput { line, reason } => {
                assert_eq!(3, line);
                assert!(reason.contains("frequency"), "{reason}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn rejects_negative_frequency() {
        assert!(matches!(
            parse_histogram_str("4 4 0 9\n1 -2\n"),
            Err(HistIoError::MalformedHistogramInput { line: 2, .. })
        ));
    }

    #[test]
    fn rejects_short_header_and_empty_input() {
        assert!(matches!(
            parse_histogram_str("4 4 0\n"),
            Err(HistIoError::MalformedHistogramInput { line: 1, .. })
        ));
        assert!(matches!(
            parse_histogram_str("\n\n"),
            Err(HistIoError::MalformedHistogramInput { .. })
        ));
    }

    #[test]
    fn rejects_inverted_header() {
        assert!(matches!(
            parse_histogram_str("4 4 9 3\n"),
            Err(HistIoError::MalformedHistogramInput { line: 1, .. })
        ));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "2 2 0 3").unwrap();
        writeln!(file, "2 8").unwrap();
        let input = load_histogram(file.path()).unwrap();
        assert_eq!(vec![(2, 8)], input.entries);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_histogram(dir.path().join("nope.txt")),
            Err(HistIoError::Io(_))
        ));
    }
}
