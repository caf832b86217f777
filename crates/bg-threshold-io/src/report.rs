use crate::HistIoError;
use bg_threshold_core::{Histogram, ImageHeader, ThresholdResult};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Machine-readable summary of one threshold run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdReport {
    pub input_path: String,
    pub header: ImageHeader,
    pub threshold: usize,
    #[serde(default)]
    pub total_error: Option<f64>,
    pub offset: usize,
    pub candidates_evaluated: usize,
    pub max_height: u32,
    pub histogram: Vec<u32>,
    pub best_fit: Vec<u32>,
}

impl ThresholdReport {
    pub fn new(input_path: &Path, hist: &Histogram, result: &ThresholdResult) -> Self {
        Self {
            input_path: input_path.to_string_lossy().into_owned(),
            header: *hist.header(),
            threshold: result.threshold,
            total_error: result.total_error,
            offset: result.offset,
            candidates_evaluated: result.candidates_evaluated,
            max_height: hist.max_height(),
            histogram: hist.counts().to_vec(),
            best_fit: result.best_fit.values().to_vec(),
        }
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, HistIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), HistIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
