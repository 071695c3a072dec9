//! Tunable thresholds for cohort generation.
//!
//! Like the prediction weights, these defaults carry the product's tuned
//! values and are loadable from the environment; treat them as candidates
//! for recalibration rather than fixed rules.

use serde::Deserialize;

fn default_min_cohort_size() -> usize {
    1
}
fn default_min_sector_cohort_size() -> usize {
    5
}
fn default_high_engagement_min() -> f64 {
    70.0
}
fn default_moderate_engagement_min() -> f64 {
    40.0
}
fn default_early_hours_start() -> u8 {
    6
}
fn default_early_hours_end() -> u8 {
    8
}
fn default_deep_reading_secs() -> f64 {
    180.0
}
fn default_volatility_threshold() -> f64 {
    25.0
}

/// Configuration injected into the cohort generator.
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentationConfig {
    /// Minimum matching profiles for risk/engagement/experience/behavioral
    /// cohorts.
    #[serde(default = "default_min_cohort_size")]
    pub min_cohort_size: usize,
    /// Minimum matching profiles for sector cohorts; higher to avoid overly
    /// narrow segments.
    #[serde(default = "default_min_sector_cohort_size")]
    pub min_sector_cohort_size: usize,
    /// Engagement score at or above which a subscriber counts as highly
    /// engaged.
    #[serde(default = "default_high_engagement_min")]
    pub high_engagement_min: f64,
    /// Engagement score at or above which a subscriber counts as moderately
    /// engaged.
    #[serde(default = "default_moderate_engagement_min")]
    pub moderate_engagement_min: f64,
    /// Start of the early-morning reading window, inclusive hour of day.
    #[serde(default = "default_early_hours_start")]
    pub early_hours_start: u8,
    /// End of the early-morning reading window, inclusive hour of day.
    #[serde(default = "default_early_hours_end")]
    pub early_hours_end: u8,
    /// Average reading seconds at or above which a subscriber is a deep
    /// reader.
    #[serde(default = "default_deep_reading_secs")]
    pub deep_reading_secs: f64,
    /// Volatility index above which market-responsive cohorts activate.
    #[serde(default = "default_volatility_threshold")]
    pub volatility_threshold: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            min_cohort_size: default_min_cohort_size(),
            min_sector_cohort_size: default_min_sector_cohort_size(),
            high_engagement_min: default_high_engagement_min(),
            moderate_engagement_min: default_moderate_engagement_min(),
            early_hours_start: default_early_hours_start(),
            early_hours_end: default_early_hours_end(),
            deep_reading_secs: default_deep_reading_secs(),
            volatility_threshold: default_volatility_threshold(),
        }
    }
}

impl SegmentationConfig {
    /// Checks internal consistency.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_cohort_size == 0 {
            return Err("min_cohort_size must be at least 1".to_string());
        }
        if self.min_sector_cohort_size < self.min_cohort_size {
            return Err("min_sector_cohort_size cannot be below min_cohort_size".to_string());
        }
        if self.moderate_engagement_min >= self.high_engagement_min {
            return Err("moderate_engagement_min must be below high_engagement_min".to_string());
        }
        if self.early_hours_start > self.early_hours_end || self.early_hours_end > 23 {
            return Err("early reading window must be an ordered range within 0-23".to_string());
        }
        Ok(())
    }
}
