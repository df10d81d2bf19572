//! Rule thresholds as configuration.
//!
//! None of the numeric limits live in rule code; they arrive here, either
//! from defaults or from a JSON config file, and are validated once at
//! startup. An invalid threshold is fatal before any device is touched.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}")]
    Parse {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid threshold {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

/// All grading thresholds. Field names double as the JSON config keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// HDD: pending sector count above this fails.
    pub pending_sectors: u64,
    /// HDD: reallocated sector count above this fails.
    pub reallocated_sectors: u64,
    /// SSD: percentage-used above this fails.
    pub percent_used: u64,
    /// SSD: available spare at or below this fails.
    pub available_spare: u64,
    /// NVMe: media error count above this fails.
    pub media_errors: u64,
    /// NVMe: minutes above the critical composite temperature above this fails.
    pub critical_temp_minutes: u64,
    /// NVMe: minutes above the warning composite temperature above this flags.
    pub warning_temp_minutes: u64,
    /// HDD: annualized workload above this (TB/year) flags.
    pub heavy_use_tb_per_year: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            pending_sectors: 10,
            reallocated_sectors: 10,
            percent_used: 100,
            available_spare: 97,
            media_errors: 10,
            critical_temp_minutes: 0,
            warning_temp_minutes: 60,
            heavy_use_tb_per_year: 550.0,
        }
    }
}

impl Thresholds {
    /// Loads thresholds from a JSON file and validates them. Keys absent
    /// from the file keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let thresholds: Thresholds =
            serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.heavy_use_tb_per_year.is_finite() || self.heavy_use_tb_per_year <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "heavy_use_tb_per_year",
                reason: format!("must be a positive number, got {}", self.heavy_use_tb_per_year),
            });
        }
        if self.available_spare > 100 {
            return Err(ConfigError::Invalid {
                field: "available_spare",
                reason: format!("must be a percentage (0-100), got {}", self.available_spare),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Thresholds;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_documented_values() {
        let thresholds = Thresholds::default();
        assert_eq!(thresholds.pending_sectors, 10);
        assert_eq!(thresholds.reallocated_sectors, 10);
        assert_eq!(thresholds.percent_used, 100);
        assert_eq!(thresholds.available_spare, 97);
        assert_eq!(thresholds.media_errors, 10);
        assert_eq!(thresholds.critical_temp_minutes, 0);
        assert_eq!(thresholds.warning_temp_minutes, 60);
        assert_eq!(thresholds.heavy_use_tb_per_year, 550.0);
        assert!(thresholds.validate().is_ok());
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("thresholds.json");
        std::fs::write(&path, r#"{"media_errors": 0, "warning_temp_minutes": 5}"#).unwrap();
        let thresholds = Thresholds::load(&path).unwrap();
        assert_eq!(thresholds.media_errors, 0);
        assert_eq!(thresholds.warning_temp_minutes, 5);
        assert_eq!(thresholds.reallocated_sectors, 10);
    }

    #[test]
    fn non_numeric_threshold_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("thresholds.json");
        std::fs::write(&path, r#"{"media_errors": "lots"}"#).unwrap();
        assert!(Thresholds::load(&path).is_err());
    }

    #[test]
    fn unknown_key_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("thresholds.json");
        std::fs::write(&path, r#"{"media_error_limit": 3}"#).unwrap();
        assert!(Thresholds::load(&path).is_err());
    }

    #[test]
    fn negative_heavy_use_is_invalid() {
        let thresholds = Thresholds {
            heavy_use_tb_per_year: -1.0,
            ..Thresholds::default()
        };
        assert!(thresholds.validate().is_err());
    }
}
