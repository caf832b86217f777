/// Errors returned by the numeric core.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ThresholdError {
    #[error("segment [{left}, {right}) has zero total frequency")]
    EmptySegment { left: usize, right: usize },

    #[error("curve length mismatch (expected {expected}, got {got})")]
    ArrayLengthMismatch { expected: usize, got: usize },

    #[error("intensity {intensity} outside [0, {max_val}]")]
    IntensityOutOfRange { intensity: i64, max_val: u32 },

    #[error("invalid image header (min_val={min_val}, max_val={max_val})")]
    InvalidHeader { min_val: u32, max_val: u32 },

    #[error("segment [{left}, {right}] outside histogram bounds (max_val={max_val})")]
    SegmentOutOfBounds {
        left: usize,
        right: usize,
        max_val: usize,
    },

    #[error("invalid search parameters: {0}")]
    InvalidParams(String),
}
