use crate::ThresholdError;
use serde::{Deserialize, Serialize};

/// Fitted-curve buffer: one integer height per intensity.
///
/// The buffer is sized once and reused; call [`Curve::clear`] before every
/// new fit so values from a previous attempt cannot leak into the next one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Curve {
    values: Vec<u32>,
}

impl Curve {
    pub fn new(len: usize) -> Self {
        Self {
            values: vec![0; len],
        }
    }

    pub fn from_values(values: Vec<u32>) -> Self {
        Self { values }
    }

    /// Reset every height to zero, keeping the length.
    pub fn clear(&mut self) {
        self.values.fill(0);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    #[inline]
    pub fn get(&self, i: usize) -> Option<u32> {
        self.values.get(i).copied()
    }

    #[inline]
    pub(crate) fn set(&mut self, i: usize, v: u32) {
        self.values[i] = v;
    }

    /// Zero `values[left..=right]`, clipped to the curve length.
    pub(crate) fn zero_range(&mut self, left: usize, right: usize) {
        let end = (right + 1).min(self.values.len());
        if left < end {
            self.values[left..end].fill(0);
        }
    }

    /// Highest value in the curve (0 for an empty curve).
    pub fn peak(&self) -> u32 {
        self.values.iter().copied().max().unwrap_or(0)
    }

    /// Element-wise copy of `src` into `self`.
    pub fn copy_from(&mut self, src: &Curve) -> Result<(), ThresholdError> {
        copy_curve(&src.values, &mut self.values)
    }
}

/// Copy `src` into `dst`; both must have the same length.
pub fn copy_curve(src: &[u32], dst: &mut [u32]) -> Result<(), ThresholdError> {
    if src.len() != dst.len() {
        return Err(ThresholdError::ArrayLengthMismatch {
            expected: dst.len(),
            got: src.len(),
        });
    }
    dst.copy_from_slice(src);
    Ok(())
}
