//! Boundary layer for `bg-threshold-core`.
//!
//! - histogram text files (`numRows numCols minVal maxVal` header, then
//!   `intensity frequency` lines),
//! - text reports and ASCII graphs of histograms and fitted curves,
//! - JSON run configuration and JSON reports.

mod config;
mod histogram_file;
mod report;
mod text;

pub use config::ThresholdConfig;
pub use histogram_file::{load_histogram, parse_histogram, parse_histogram_str, HistogramInput};
pub use report::ThresholdReport;
pub use text::{
    write_gauss_report, write_histogram_graph, write_histogram_report, write_histogram_table,
    write_overlay_graph, GAP_MARK, PEAK_MARK,
};

use bg_threshold_core::ThresholdError;

#[derive(thiserror::Error, Debug)]
pub enum HistIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("malformed histogram input at line {line}: {reason}")]
    MalformedHistogramInput { line: usize, reason: String },
    #[error(transparent)]
    Threshold(#[from] ThresholdError),
}
