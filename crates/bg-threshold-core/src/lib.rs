//! Bimodal-Gaussian (BG) threshold selection for intensity histograms.
//!
//! Given a histogram, the search tries every divide point `d` in
//! `[offset, max_val - offset)`, fits one unnormalized Gaussian to `[0, d]`
//! and one to `[d, max_val]`, and keeps the split whose two curves deviate
//! least (sum of absolute differences) from the histogram.
//!
//! This crate is purely numeric: no file parsing and no report formatting.
//! Loaders hand in `(intensity, frequency)` pairs; reporting layers read the
//! histogram, best-fit curve and overlays through accessors.
//!
//! ## Quickstart
//!
//! ```
//! use bg_threshold_core::{Histogram, ImageHeader, SearchParams, ThresholdSelector};
//!
//! let header = ImageHeader::new(10, 10, 0, 9).unwrap();
//! let hist = Histogram::from_counts(header, vec![0, 2, 5, 9, 4, 1, 1, 4, 9, 5]).unwrap();
//! let mut selector = ThresholdSelector::new(hist, SearchParams::default()).unwrap();
//! let threshold = selector.select_threshold().unwrap();
//! assert!(selector.candidates().contains(&threshold));
//! ```

mod curve;
mod error;
mod gaussian;
mod histogram;
mod overlay;
mod search;
mod trace;

pub use curve::{copy_curve, Curve};
pub use error::ThresholdError;
pub use gaussian::{
    compute_mean, compute_variance, fit_segment, gaussian_height, segment_peak, segment_stats,
    SegmentFit, SegmentStats,
};
pub use histogram::{Histogram, ImageHeader, OutOfRangePolicy};
pub use overlay::{build_overlays, OverlayGrid, Overlays};
pub use search::{
    select_threshold, EmptySegmentPolicy, SearchParams, ThresholdResult, ThresholdSelector,
};
pub use trace::{LogSink, NullSink, TraceEvent, TraceSink, VecSink, WriterSink};
