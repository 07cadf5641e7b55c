// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Default input file (NYC 311 water complaints filtered to plumbing)
pub const DEFAULT_INPUT: &str = "311complaints_Plumbing.csv";

/// Default output file for abnormally slow responses
pub const DEFAULT_OUTPUT: &str = "Plumbing_AB.csv";

/// Category spellings accepted by default
pub const DEFAULT_CATEGORIES: [&str; 2] = ["Plumbing", "PLUMBING"];

/// Rows slower than this many days are copied to the output file
pub const DEFAULT_THRESHOLD_DAYS: f64 = 1000.0;

pub const DEFAULT_BINS: usize = 50;

/// Top of the vertical reference lines, in histogram counts
pub const DEFAULT_LINE_HEIGHT: f64 = 900.0;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Timestamp layout used by the 311 export, e.g. `2020-01-01T00:00:00.000000`
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub const COL_COMPLAINT_TYPE: &str = "complaint_type";
pub const COL_CREATED_DATE: &str = "created_date";
pub const COL_CLOSED_DATE: &str = "closed_date";

/// Custom error types for the application
#[derive(Error, Debug)]
pub enum TendencyError {
    #[error("Error opening file '{}': {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error creating file '{}': {source}", .path.display())]
    FileCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("No response times to summarize: no matching row had parseable dates")]
    EmptySample,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Plot error: {0}")]
    Plot(String),
}

/// Where the lower outlier fence is anchored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FenceMode {
    /// Both fences measured from the upper quartile: `P75 ± 1.5 × IQR`
    #[default]
    UpperQuartile,
    /// Conventional Tukey fences: `P25 - 1.5 × IQR`, `P75 + 1.5 × IQR`
    Tukey,
}

/// Everything one analysis run needs to know
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub categories: Vec<String>,
    pub threshold_days: f64,
    pub bins: usize,
    pub line_height: f64,
    pub fence_mode: FenceMode,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            threshold_days: DEFAULT_THRESHOLD_DAYS,
            bins: DEFAULT_BINS,
            line_height: DEFAULT_LINE_HEIGHT,
            fence_mode: FenceMode::default(),
        }
    }
}

impl AnalysisConfig {
    /// Reject settings that would make the later stages meaningless
    pub fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            return Err(TendencyError::InvalidConfig(
                "at least one complaint category is required".to_string(),
            ));
        }
        if self.bins == 0 {
            return Err(TendencyError::InvalidConfig(
                "histogram needs at least one bin".to_string(),
            ));
        }
        if !self.threshold_days.is_finite() {
            return Err(TendencyError::InvalidConfig(format!(
                "threshold must be finite, got {}",
                self.threshold_days
            )));
        }
        if !(self.line_height.is_finite() && self.line_height > 0.0) {
            return Err(TendencyError::InvalidConfig(format!(
                "line height must be positive, got {}",
                self.line_height
            )));
        }
        Ok(())
    }
}

/// Result type used throughout the application
pub type Result<T> = std::result::Result<T, TendencyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_original_constants() {
        let config = AnalysisConfig::default();
        assert_eq!(config.input, PathBuf::from("311complaints_Plumbing.csv"));
        assert_eq!(config.output, PathBuf::from("Plumbing_AB.csv"));
        assert_eq!(config.categories, vec!["Plumbing", "PLUMBING"]);
        assert_eq!(config.threshold_days, 1000.0);
        assert_eq!(config.bins, 50);
        assert_eq!(config.fence_mode, FenceMode::UpperQuartile);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_bins_and_empty_categories() {
        let config = AnalysisConfig {
            bins: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(TendencyError::InvalidConfig(_))));

        let config = AnalysisConfig {
            categories: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(TendencyError::InvalidConfig(_))));
    }

    #[test]
    fn file_errors_name_the_path() {
        let err = TendencyError::FileOpen {
            path: PathBuf::from("missing.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("missing.csv"));
    }
}
