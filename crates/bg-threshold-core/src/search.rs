use crate::gaussian::fit_segment;
use crate::overlay::{build_overlays, Overlays};
use crate::trace::{LogSink, TraceEvent, TraceSink};
use crate::{Curve, Histogram, ThresholdError};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::ops::Range;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// How the search treats a side of a candidate split that holds no pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptySegmentPolicy {
    /// Score the side as a flat zero curve (error = histogram mass over `[left, right]`).
    #[default]
    ZeroCurve,
    /// Do not score the candidate at all.
    SkipCandidate,
}

/// Parameters for the divide-point search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// `offset = (max_val - min_val) / offset_divisor`; candidates are `[offset, max_val - offset)`.
    pub offset_divisor: u32,
    pub empty_segment: EmptySegmentPolicy,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            offset_divisor: 10,
            empty_segment: EmptySegmentPolicy::ZeroCurve,
        }
    }
}

impl SearchParams {
    pub fn validate(&self) -> Result<(), ThresholdError> {
        if self.offset_divisor == 0 {
            return Err(ThresholdError::InvalidParams(
                "offset_divisor must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Snapshot of a finished search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdResult {
    pub threshold: usize,
    /// Total fit error of the winning split; `None` when no candidate was scored.
    pub total_error: Option<f64>,
    pub offset: usize,
    pub candidates_evaluated: usize,
    pub best_fit: Curve,
}

/// Bimodal-Gaussian threshold selector.
///
/// Owns the histogram plus two curve buffers allocated once: the working
/// curve rebuilt for every candidate and the best-fit snapshot.
#[derive(Clone, Debug)]
pub struct ThresholdSelector {
    histogram: Histogram,
    params: SearchParams,
    work: Curve,
    best_fit: Curve,
    best_threshold: usize,
    best_error: Option<f64>,
    candidates_evaluated: usize,
}

impl ThresholdSelector {
    pub fn new(histogram: Histogram, params: SearchParams) -> Result<Self, ThresholdError> {
        params.validate()?;
        let len = histogram.len();
        let mut selector = Self {
            histogram,
            params,
            work: Curve::new(len),
            best_fit: Curve::new(len),
            best_threshold: 0,
            best_error: None,
            candidates_evaluated: 0,
        };
        selector.best_threshold = selector.offset();
        Ok(selector)
    }

    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    pub fn best_fit(&self) -> &Curve {
        &self.best_fit
    }

    pub fn best_threshold(&self) -> usize {
        self.best_threshold
    }

    pub fn best_error(&self) -> Option<f64> {
        self.best_error
    }

    /// Distance kept from both histogram ends.
    pub fn offset(&self) -> usize {
        let h = self.histogram.header();
        ((h.max_val - h.min_val) / self.params.offset_divisor) as usize
    }

    /// Divide points scanned by [`select_threshold`](Self::select_threshold).
    pub fn candidates(&self) -> Range<usize> {
        let offset = self.offset();
        offset..self.histogram.max_val().saturating_sub(offset)
    }

    /// Total fit error for divide point `d`, leaving its curves in the working buffer.
    ///
    /// Returns `Ok(None)` when the candidate is skipped under
    /// [`EmptySegmentPolicy::SkipCandidate`].
    pub fn evaluate_candidate(&mut self, d: usize) -> Result<Option<f64>, ThresholdError> {
        self.evaluate_traced(d, &mut LogSink)
    }

    fn evaluate_traced(
        &mut self,
        d: usize,
        sink: &mut dyn TraceSink,
    ) -> Result<Option<f64>, ThresholdError> {
        let max_val = self.histogram.max_val();
        if d > max_val {
            return Err(ThresholdError::SegmentOutOfBounds {
                left: d,
                right: max_val,
                max_val,
            });
        }
        self.work.clear();
        let Some(left) = self.fit_side(0, d, sink)? else {
            sink.record(&TraceEvent::CandidateSkipped { divide: d });
            return Ok(None);
        };
        let Some(right) = self.fit_side(d, max_val, sink)? else {
            sink.record(&TraceEvent::CandidateSkipped { divide: d });
            return Ok(None);
        };
        Ok(Some(left + right))
    }

    /// Fit `[left, right]` into the working curve and return its error.
    fn fit_side(
        &mut self,
        left: usize,
        right: usize,
        sink: &mut dyn TraceSink,
    ) -> Result<Option<f64>, ThresholdError> {
        let hist = self.histogram.counts();
        match fit_segment(hist, left, right, &mut self.work) {
            Ok(fit) => {
                sink.record(&TraceEvent::SegmentFitted {
                    left,
                    right,
                    mean: fit.stats.mean,
                    variance: fit.stats.variance,
                    peak: fit.stats.peak,
                    error: fit.error,
                });
                Ok(Some(fit.error))
            }
            Err(ThresholdError::EmptySegment { left: l, right: r }) => {
                sink.record(&TraceEvent::EmptySegment { left: l, right: r });
                match self.params.empty_segment {
                    EmptySegmentPolicy::SkipCandidate => Ok(None),
                    EmptySegmentPolicy::ZeroCurve => {
                        let mass: u64 = hist[left..=right].iter().map(|&h| u64::from(h)).sum();
                        self.work.zero_range(left, right);
                        Ok(Some(mass as f64))
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Scan every candidate and return the best divide point.
    pub fn select_threshold(&mut self) -> Result<usize, ThresholdError> {
        self.select_threshold_traced(&mut LogSink)
    }

    /// [`select_threshold`](Self::select_threshold) reporting each step to `sink`.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, sink), fields(max_val = self.histogram.max_val()))
    )]
    pub fn select_threshold_traced(
        &mut self,
        sink: &mut dyn TraceSink,
    ) -> Result<usize, ThresholdError> {
        let offset = self.offset();
        let candidates = self.candidates();
        self.best_fit.clear();
        self.best_threshold = offset;
        self.best_error = None;
        self.candidates_evaluated = 0;

        sink.record(&TraceEvent::SearchStarted {
            offset,
            first: candidates.start,
            end: candidates.end,
        });

        if candidates.is_empty() {
            warn!(
                "no divide candidates (max_val={}, offset={offset}); using offset",
                self.histogram.max_val()
            );
            sink.record(&TraceEvent::Selected {
                threshold: offset,
                total: None,
            });
            return Ok(offset);
        }
        if self.histogram.total() == 0 {
            return Err(ThresholdError::EmptySegment {
                left: 0,
                right: self.histogram.len(),
            });
        }

        let mut min_total = f64::MAX;
        for d in candidates {
            let Some(total) = self.evaluate_traced(d, sink)? else {
                continue;
            };
            self.candidates_evaluated += 1;
            sink.record(&TraceEvent::CandidateEvaluated { divide: d, total });
            if total < min_total {
                min_total = total;
                self.best_fit.copy_from(&self.work)?;
                self.best_threshold = d;
                self.best_error = Some(total);
                sink.record(&TraceEvent::NewBest { divide: d, total });
            }
        }

        debug!(
            "threshold={} total_error={:?} candidates={}",
            self.best_threshold, self.best_error, self.candidates_evaluated
        );
        sink.record(&TraceEvent::Selected {
            threshold: self.best_threshold,
            total: self.best_error,
        });
        Ok(self.best_threshold)
    }

    /// Result of the last search.
    pub fn result(&self) -> ThresholdResult {
        ThresholdResult {
            threshold: self.best_threshold,
            total_error: self.best_error,
            offset: self.offset(),
            candidates_evaluated: self.candidates_evaluated,
            best_fit: self.best_fit.clone(),
        }
    }

    /// Peak and gap overlays of the current best fit.
    pub fn overlays(&self) -> Result<Overlays, ThresholdError> {
        build_overlays(self.histogram.counts(), self.best_fit.values())
    }
}

/// Build a selector for `histogram`, run the search and return its result.
pub fn select_threshold(
    histogram: &Histogram,
    params: &SearchParams,
) -> Result<ThresholdResult, ThresholdError> {
    let mut selector = ThresholdSelector::new(histogram.clone(), params.clone())?;
    selector.select_threshold()?;
    Ok(selector.result())
}
