use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::missing::DEFAULT_PROBLEMATIC_PERCENT;
use crate::analysis::plot::DEFAULT_BINS;
use crate::analysis::unique::UniqueLimits;
use crate::data::loader::{LoadOptions, DEFAULT_NA_VALUES};
use crate::error::{AnalysisError, Result};
use crate::export::DEFAULT_EXPORT_FILE;

/// Analysis settings, read from a JSON file. Every field is optional.
///
/// ```json
/// { "missing_threshold_percent": 10.0, "histogram_bins": 50 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Dataset loaded at startup when present.
    pub autoload_path: PathBuf,
    /// Destination of the statistics export.
    pub export_path: PathBuf,
    pub missing_threshold_percent: f64,
    pub unique_display_threshold: usize,
    pub unique_sample_size: usize,
    pub histogram_bins: usize,
    /// Pairs listed under the heatmap.
    pub strongest_pairs: usize,
    pub na_values: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let limits = UniqueLimits::default();
        Self {
            autoload_path: PathBuf::from("diamonds.csv"),
            export_path: PathBuf::from(DEFAULT_EXPORT_FILE),
            missing_threshold_percent: DEFAULT_PROBLEMATIC_PERCENT,
            unique_display_threshold: limits.display_threshold,
            unique_sample_size: limits.sample_size,
            histogram_bins: DEFAULT_BINS,
            strongest_pairs: 3,
            na_values: DEFAULT_NA_VALUES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_err = |message: String| AnalysisError::Config {
            path: path.to_path_buf(),
            message,
        };

        let text = std::fs::read_to_string(path).map_err(|e| config_err(e.to_string()))?;
        let config: AnalysisConfig =
            serde_json::from_str(&text).map_err(|e| config_err(e.to_string()))?;

        if config.histogram_bins == 0 {
            return Err(config_err("histogram_bins must be at least 1".into()));
        }
        if !(0.0..=100.0).contains(&config.missing_threshold_percent) {
            return Err(config_err(
                "missing_threshold_percent must be within 0..=100".into(),
            ));
        }

        if config.unique_sample_size > config.unique_display_threshold {
            return Err(config_err(
                "unique_sample_size must not exceed unique_display_threshold".into(),
            ));
        }

        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            na_values: self.na_values.clone(),
        }
    }

    pub fn unique_limits(&self) -> UniqueLimits {
        UniqueLimits {
            display_threshold: self.unique_display_threshold,
            sample_size: self.unique_sample_size,
        }
    }
}
