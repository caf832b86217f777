//! Single-Gaussian fit of a histogram segment.
//!
//! Statistics (mean, variance, peak) are taken over the right-exclusive range
//! `[left, right)`, while the curve is written over the inclusive range
//! `[left, right]`. Threshold quality depends on this convention, so both
//! sides of the divide point see index `right`/`left` differently.

use crate::{Curve, ThresholdError};
use serde::{Deserialize, Serialize};

/// Moments of one histogram segment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentStats {
    pub mean: f64,
    pub variance: f64,
    /// Largest frequency in the segment; used as the Gaussian amplitude.
    pub peak: u32,
}

/// Outcome of [`fit_segment`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentFit {
    pub left: usize,
    pub right: usize,
    pub stats: SegmentStats,
    /// Sum of `|gauss[i] - hist[i]|` over `[left, right]`.
    pub error: f64,
}

fn check_stats_range(hist: &[u32], left: usize, right: usize) -> Result<(), ThresholdError> {
    if left > right || right > hist.len() {
        return Err(ThresholdError::SegmentOutOfBounds {
            left,
            right,
            max_val: hist.len().saturating_sub(1),
        });
    }
    Ok(())
}

fn segment_mass(hist: &[u32], left: usize, right: usize) -> u64 {
    hist[left..right].iter().map(|&h| u64::from(h)).sum()
}

/// Frequency-weighted mean intensity over `[left, right)`.
pub fn compute_mean(hist: &[u32], left: usize, right: usize) -> Result<f64, ThresholdError> {
    check_stats_range(hist, left, right)?;
    let mass = segment_mass(hist, left, right);
    if mass == 0 {
        return Err(ThresholdError::EmptySegment { left, right });
    }
    let weighted: f64 = hist[left..right]
        .iter()
        .enumerate()
        .map(|(k, &h)| f64::from(h) * (left + k) as f64)
        .sum();
    Ok(weighted / mass as f64)
}

/// Frequency-weighted variance over `[left, right)` around `mean`.
pub fn compute_variance(
    hist: &[u32],
    left: usize,
    right: usize,
    mean: f64,
) -> Result<f64, ThresholdError> {
    check_stats_range(hist, left, right)?;
    let mass = segment_mass(hist, left, right);
    if mass == 0 {
        return Err(ThresholdError::EmptySegment { left, right });
    }
    let acc: f64 = hist[left..right]
        .iter()
        .enumerate()
        .map(|(k, &h)| {
            let d = (left + k) as f64 - mean;
            f64::from(h) * d * d
        })
        .sum();
    Ok(acc / mass as f64)
}

/// Largest frequency over `[left, right)`; 0 for an empty range.
pub fn segment_peak(hist: &[u32], left: usize, right: usize) -> u32 {
    let right = right.min(hist.len());
    if left >= right {
        return 0;
    }
    hist[left..right].iter().copied().max().unwrap_or(0)
}

/// Mean, variance and peak of `[left, right)`.
pub fn segment_stats(
    hist: &[u32],
    left: usize,
    right: usize,
) -> Result<SegmentStats, ThresholdError> {
    let mean = compute_mean(hist, left, right)?;
    let variance = compute_variance(hist, left, right, mean)?;
    Ok(SegmentStats {
        mean,
        variance,
        peak: segment_peak(hist, left, right),
    })
}

/// Integer height of the unnormalized Gaussian at intensity `i`.
///
/// Zero variance collapses the curve to a spike of height `peak` at the
/// rounded mean.
#[inline]
pub fn gaussian_height(i: usize, stats: &SegmentStats) -> u32 {
    let x = i as f64;
    if stats.variance <= 0.0 {
        return if stats.mean.round() == x { stats.peak } else { 0 };
    }
    let d = x - stats.mean;
    let g = f64::from(stats.peak) * (-(d * d) / (2.0 * stats.variance)).exp();
    // truncation toward zero; g is finite and within [0, peak]
    g as u32
}

/// Fit one Gaussian to the segment and write it into `out[left..=right]`.
///
/// Entries of `out` outside `[left, right]` are left untouched. Fails with
/// [`ThresholdError::EmptySegment`] when `[left, right)` holds no mass.
pub fn fit_segment(
    hist: &[u32],
    left: usize,
    right: usize,
    out: &mut Curve,
) -> Result<SegmentFit, ThresholdError> {
    if out.len() != hist.len() {
        return Err(ThresholdError::ArrayLengthMismatch {
            expected: hist.len(),
            got: out.len(),
        });
    }
    if left > right || right >= hist.len() {
        return Err(ThresholdError::SegmentOutOfBounds {
            left,
            right,
            max_val: hist.len().saturating_sub(1),
        });
    }

    let stats = segment_stats(hist, left, right)?;
    let mut error = 0.0f64;
    for (i, &h) in hist.iter().enumerate().take(right + 1).skip(left) {
        let g = gaussian_height(i, &stats);
        out.set(i, g);
        error += (i64::from(g) - i64::from(h)).abs() as f64;
    }

    Ok(SegmentFit {
        left,
        right,
        stats,
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TWO_HUMPS: [u32; 10] = [0, 2, 5, 9, 4, 1, 1, 4, 9, 5];

    #[test]
    fn mean_excludes_right_end() {
        let hist = [0, 1, 0, 100];
        assert_relative_eq!(1.0, compute_mean(&hist, 0, 3).unwrap());
        assert_relative_eq!(
            (1.0 + 300.0) / 101.0,
            compute_mean(&hist, 0, 4).unwrap()
        );
    }

    #[test]
    fn mean_stays_inside_segment() {
        for left in 0..TWO_HUMPS.len() {
            for right in left + 1..=TWO_HUMPS.len() {
                if let Ok(mean) = compute_mean(&TWO_HUMPS, left, right) {
                    assert!(mean >= left as f64 && mean <= right as f64);
                }
            }
        }
    }

    #[test]
    fn variance_matches_hand_computation() {
        let hist = [0, 2, 0, 2];
        let mean = compute_mean(&hist, 0, 4).unwrap();
        assert_relative_eq!(2.0, mean);
        assert_relative_eq!(1.0, compute_variance(&hist, 0, 4, mean).unwrap());
    }

    #[test]
    fn all_zero_segment_is_reported() {
        let hist = [0u32; 6];
        let mut out = Curve::new(6);
        assert_eq!(
            Err(ThresholdError::EmptySegment { left: 0, right: 5 }),
            fit_segment(&hist, 0, 5, &mut out)
        );
        assert_eq!(
            Err(ThresholdError::EmptySegment { left: 2, right: 4 }),
            compute_mean(&hist, 2, 4)
        );
    }

    #[test]
    fn peak_uses_segment_not_histogram() {
        assert_eq!(5, segment_peak(&TWO_HUMPS, 0, 3));
        assert_eq!(9, segment_peak(&TWO_HUMPS, 0, 4));
        assert_eq!(0, segment_peak(&TWO_HUMPS, 4, 4));
    }

    #[test]
    fn fit_writes_only_inclusive_range() {
        let mut out = Curve::from_values(vec![77; TWO_HUMPS.len()]);
        let fit = fit_segment(&TWO_HUMPS, 1, 5, &mut out).unwrap();
        assert_eq!(77, out.values()[0]);
        assert!(out.values()[6..].iter().all(|&v| v == 77));
        assert_eq!(9, fit.stats.peak);
        assert_eq!(&[1, 6, 8, 3, 0], &out.values()[1..=5]);
        assert_relative_eq!(5.0, fit.error);
    }

    #[test]
    fn fit_error_is_absolute_deviation() {
        let mut out = Curve::new(TWO_HUMPS.len());
        let fit = fit_segment(&TWO_HUMPS, 0, 6, &mut out).unwrap();
        let expected: f64 = (0..=6)
            .map(|i| (i64::from(out.values()[i]) - i64::from(TWO_HUMPS[i])).abs() as f64)
            .sum();
        assert_relative_eq!(expected, fit.error);
    }

    #[test]
    fn zero_variance_gives_spike() {
        let hist = [0, 0, 6, 0, 0];
        let mut out = Curve::new(5);
        let fit = fit_segment(&hist, 0, 4, &mut out).unwrap();
        assert_relative_eq!(0.0, fit.stats.variance);
        assert_eq!(&[0, 0, 6, 0, 0], out.values());
        assert_relative_eq!(0.0, fit.error);
    }

    #[test]
    fn rejects_bad_bounds_and_lengths() {
        let mut out = Curve::new(TWO_HUMPS.len());
        assert!(matches!(
            fit_segment(&TWO_HUMPS, 3, 10, &mut out),
            Err(ThresholdError::SegmentOutOfBounds { .. })
        ));
        assert!(matches!(
            fit_segment(&TWO_HUMPS, 4, 2, &mut out),
            Err(ThresholdError::SegmentOutOfBounds { .. })
        ));
        let mut short = Curve::new(3);
        assert_eq!(
            Err(ThresholdError::ArrayLengthMismatch {
                expected: 10,
                got: 3
            }),
            fit_segment(&TWO_HUMPS, 0, 2, &mut short)
        );
    }
}
