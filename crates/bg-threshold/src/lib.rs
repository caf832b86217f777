//! Facade crate for the `bg-threshold-*` workspace.
//!
//! This crate provides:
//! - re-exports of the numeric core (`bg-threshold-core`) and the boundary
//!   layer (`bg-threshold-io`),
//! - [`run::run`], the file-to-file pipeline used by the `bg-threshold` CLI
//!   (feature `cli`).
//!
//! ## Quickstart
//!
//! ```
//! use bg_threshold::core::select_threshold;
//! use bg_threshold::io::{parse_histogram_str, ThresholdConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let input = parse_histogram_str("10 10 0 9\n1 2\n2 5\n3 9\n4 4\n5 1\n6 1\n7 4\n8 9\n9 5\n")?;
//! let cfg = ThresholdConfig::default();
//! let hist = input.to_histogram(cfg.out_of_range)?;
//! let result = select_threshold(&hist, &cfg.search)?;
//! println!("threshold: {}", result.threshold);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `bg_threshold::core`: histogram store, Gaussian fitter, divide-point search, overlays, trace sinks.
//! - `bg_threshold::io`: histogram file parser, text reports, JSON config and report.
//! - `bg_threshold::logging`: stderr logger tagged with the input file.
//! - `bg_threshold::run`: end-to-end run writing all reports.

pub use bg_threshold_core as core;
pub use bg_threshold_io as io;

pub use bg_threshold_core::{
    Histogram, ImageHeader, SearchParams, ThresholdError, ThresholdResult, ThresholdSelector,
};

pub mod logging;
pub mod run;
