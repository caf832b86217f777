//! Intensity histogram store.
//!
//! A [`Histogram`] is a dense `u32` frequency array indexed by intensity
//! `0..=max_val`, plus the [`ImageHeader`] it was loaded under. It is filled
//! once from `(intensity, frequency)` pairs handed over by a loader.

use crate::ThresholdError;
use log::debug;
use serde::{Deserialize, Serialize};

/// Header of the image the histogram was computed from.
///
/// `num_rows`/`num_cols` only travel through to reports; `min_val`/`max_val`
/// bound the valid intensity range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageHeader {
    pub num_rows: u32,
    pub num_cols: u32,
    pub min_val: u32,
    pub max_val: u32,
}

impl ImageHeader {
    /// Build a header, rejecting `min_val > max_val`.
    pub fn new(
        num_rows: u32,
        num_cols: u32,
        min_val: u32,
        max_val: u32,
    ) -> Result<Self, ThresholdError> {
        let header = Self {
            num_rows,
            num_cols,
            min_val,
            max_val,
        };
        header.validate()?;
        Ok(header)
    }

    pub fn validate(&self) -> Result<(), ThresholdError> {
        if self.min_val > self.max_val {
            return Err(ThresholdError::InvalidHeader {
                min_val: self.min_val,
                max_val: self.max_val,
            });
        }
        Ok(())
    }

    /// Number of histogram bins (`max_val + 1`).
    #[inline]
    pub fn bins(&self) -> usize {
        self.max_val as usize + 1
    }
}

/// What to do with entries whose intensity falls outside `[0, max_val]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutOfRangePolicy {
    /// Skip the entry.
    #[default]
    Drop,
    /// Move the entry to the nearest valid intensity.
    Clamp,
    /// Fail the whole load with [`ThresholdError::IntensityOutOfRange`].
    Reject,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Histogram {
    header: ImageHeader,
    counts: Vec<u32>,
    max_height: u32,
}

impl Histogram {
    /// Zero-filled histogram sized for `header`.
    pub fn new(header: ImageHeader) -> Result<Self, ThresholdError> {
        header.validate()?;
        Ok(Self {
            header,
            counts: vec![0; header.bins()],
            max_height: 0,
        })
    }

    /// Build from a dense frequency array of length `max_val + 1`.
    pub fn from_counts(header: ImageHeader, counts: Vec<u32>) -> Result<Self, ThresholdError> {
        header.validate()?;
        if counts.len() != header.bins() {
            return Err(ThresholdError::ArrayLengthMismatch {
                expected: header.bins(),
                got: counts.len(),
            });
        }
        let max_height = counts.iter().copied().max().unwrap_or(0);
        Ok(Self {
            header,
            counts,
            max_height,
        })
    }

    /// Load `(intensity, frequency)` entries and return the max frequency.
    ///
    /// The array is reset first; later entries for the same intensity
    /// overwrite earlier ones. With [`OutOfRangePolicy::Reject`] the store is
    /// left untouched on error.
    pub fn set_histogram(
        &mut self,
        entries: &[(i64, u32)],
        policy: OutOfRangePolicy,
    ) -> Result<u32, ThresholdError> {
        let max_val = self.header.max_val;
        if policy == OutOfRangePolicy::Reject {
            if let Some(&(intensity, _)) = entries
                .iter()
                .find(|(i, _)| *i < 0 || *i > i64::from(max_val))
            {
                return Err(ThresholdError::IntensityOutOfRange { intensity, max_val });
            }
        }

        self.counts.fill(0);
        let mut dropped = 0usize;
        for &(intensity, frequency) in entries {
            let idx = if (0..=i64::from(max_val)).contains(&intensity) {
                intensity as usize
            } else {
                match policy {
                    OutOfRangePolicy::Clamp => intensity.clamp(0, i64::from(max_val)) as usize,
                    _ => {
                        dropped += 1;
                        continue;
                    }
                }
            };
            self.counts[idx] = frequency;
        }
        if dropped > 0 {
            debug!("dropped {dropped} entries outside [0, {max_val}]");
        }

        self.max_height = self.counts.iter().copied().max().unwrap_or(0);
        Ok(self.max_height)
    }

    #[inline]
    pub fn header(&self) -> &ImageHeader {
        &self.header
    }

    #[inline]
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Largest frequency over the whole histogram.
    #[inline]
    pub fn max_height(&self) -> u32 {
        self.max_height
    }

    #[inline]
    pub fn max_val(&self) -> usize {
        self.header.max_val as usize
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total pixel count.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }
}
