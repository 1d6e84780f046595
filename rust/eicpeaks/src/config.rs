use crate::baseline::{
    DEFAULT_BASELINE_QUANTILE,
    DEFAULT_BASELINE_SMOOTHING_WINDOW,
};
use crate::errors::DataProcessingError;
use crate::smoothing::SmootherKind;
use serde::{
    Deserialize,
    Serialize,
};

/// Parameters of peak extraction and alignment.
///
/// Example:
/// ```
/// use eicpeaks::ExtractionConfig;
///
/// let config = ExtractionConfig::default();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub smoother: SmootherKind,
    pub smoothing_window: usize,
    pub baseline_smoothing_window: usize,
    /// Percentile (0-100) of the intensities used as the baseline clip ceiling.
    pub baseline_quantile: u32,
    /// Max apex retention time difference for a peak to join a group,
    /// unless the peaks overlap enough.
    pub max_rt_diff: f32,
    /// When set, only the `rank_limit + 1` most intense groups are kept.
    pub rank_limit: Option<usize>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            smoother: SmootherKind::default(),
            smoothing_window: 10,
            baseline_smoothing_window: DEFAULT_BASELINE_SMOOTHING_WINDOW,
            baseline_quantile: DEFAULT_BASELINE_QUANTILE,
            max_rt_diff: 0.5,
            rank_limit: None,
        }
    }
}

impl ExtractionConfig {
    pub fn validate(&self) -> Result<(), DataProcessingError> {
        if self.baseline_quantile > 100 {
            return Err(DataProcessingError::InvalidParameter {
                name: "baseline_quantile",
                value: self.baseline_quantile.to_string(),
                context: "expected a percentile in 0..=100".to_string(),
            });
        }
        if !self.max_rt_diff.is_finite() || self.max_rt_diff < 0.0 {
            return Err(DataProcessingError::InvalidParameter {
                name: "max_rt_diff",
                value: self.max_rt_diff.to_string(),
                context: "expected a finite, non-negative retention time".to_string(),
            });
        }
        Ok(())
    }
}
