//! Peak and gap overlays for visualising a fit against its histogram.
//!
//! Both overlays are grids indexed by `(intensity, level)`. Every column marks
//! one contiguous run of levels, so a grid keeps a single span per intensity
//! and its memory follows the number of bins, never the bucket heights. They
//! are derived views only; nothing in the threshold search reads them.

use crate::ThresholdError;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// `width` intensities by `height` levels, marking levels `start..end` of
/// each intensity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayGrid {
    height: usize,
    // half-open (start, end) per intensity; start == end marks nothing
    spans: Vec<(usize, usize)>,
}

impl OverlayGrid {
    /// Grid of `width` intensities with no marks.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            height,
            spans: vec![(0, 0); width],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.spans.len()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    fn set_span(&mut self, intensity: usize, levels: Range<usize>) {
        let end = levels.end.min(self.height);
        self.spans[intensity] = (levels.start.min(end), end);
    }

    /// Marked levels of one intensity; `None` outside the grid.
    pub fn span(&self, intensity: usize) -> Option<Range<usize>> {
        self.spans.get(intensity).map(|&(start, end)| start..end)
    }

    /// `false` for coordinates outside the grid.
    #[inline]
    pub fn is_marked(&self, intensity: usize, level: usize) -> bool {
        self.span(intensity)
            .is_some_and(|levels| levels.contains(&level))
    }

    pub fn marked_count(&self) -> usize {
        self.spans.iter().map(|&(start, end)| end - start).sum()
    }

    /// All marked `(intensity, level)` pairs in intensity-major order.
    pub fn marks(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.spans
            .iter()
            .enumerate()
            .flat_map(|(i, &(start, end))| (start..end).map(move |level| (i, level)))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlays {
    /// `(i, h)` for `h in [0, best_fit[i])`.
    pub peak: OverlayGrid,
    /// `(i, h)` for `h` between `hist[i]` and `best_fit[i]`, both ends included.
    pub gap: OverlayGrid,
}

/// Build peak and gap overlays from a histogram and its best-fit curve.
pub fn build_overlays(hist: &[u32], best_fit: &[u32]) -> Result<Overlays, ThresholdError> {
    if hist.len() != best_fit.len() {
        return Err(ThresholdError::ArrayLengthMismatch {
            expected: hist.len(),
            got: best_fit.len(),
        });
    }

    let top = hist
        .iter()
        .chain(best_fit.iter())
        .copied()
        .max()
        .unwrap_or(0) as usize;
    let width = hist.len();
    let height = top + 1;

    let mut peak = OverlayGrid::new(width, height);
    let mut gap = OverlayGrid::new(width, height);
    for (i, (&h, &g)) in hist.iter().zip(best_fit).enumerate() {
        peak.set_span(i, 0..g as usize);
        let (lo, hi) = (h.min(g) as usize, h.max(g) as usize);
        gap.set_span(i, lo..hi + 1);
    }

    Ok(Overlays { peak, gap })
}
