//! JSON configuration for a threshold run.

use crate::HistIoError;
use bg_threshold_core::{OutOfRangePolicy, SearchParams};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default)]
    pub out_of_range: OutOfRangePolicy,
    #[serde(default)]
    pub search: SearchParams,
}

impl ThresholdConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, HistIoError> {
        let raw = fs::read_to_string(path)?;
        let cfg: Self = serde_json::from_str(&raw)?;
        cfg.search.validate()?;
        Ok(cfg)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), HistIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bg_threshold_core::EmptySegmentPolicy;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: ThresholdConfig =
            serde_json::from_str(r#"{"search": {"offset_divisor": 4}}"#).unwrap();
        assert_eq!(OutOfRangePolicy::Drop, cfg.out_of_range);
        assert_eq!(4, cfg.search.offset_divisor);
        assert_eq!(EmptySegmentPolicy::ZeroCurve, cfg.search.empty_segment);
    }

    #[test]
    fn json_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        let cfg = ThresholdConfig {
            out_of_range: OutOfRangePolicy::Reject,
            search: SearchParams {
                offset_divisor: 5,
                empty_segment: EmptySegmentPolicy::SkipCandidate,
            },
        };
        cfg.write_json(&path).unwrap();
        assert_eq!(cfg, ThresholdConfig::load_json(&path).unwrap());
    }

    #[test]
    fn zero_divisor_is_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(&path, r#"{"search": {"offset_divisor": 0}}"#).unwrap();
        assert!(matches!(
            ThresholdConfig::load_json(&path),
            Err(HistIoError::Threshold(_))
        ));
    }
}
