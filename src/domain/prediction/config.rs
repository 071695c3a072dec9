//! Tunable weights and thresholds for the prediction module.
//!
//! Defaults mirror the product's tuned values. They are configuration, not
//! business rules: candidates for empirical recalibration, loadable from the
//! environment through `config::AppConfig`.

use serde::Deserialize;

fn default_low_engagement_weight() -> f64 {
    0.4
}
fn default_mid_engagement_weight() -> f64 {
    0.2
}
fn default_long_inactive_weight() -> f64 {
    0.3
}
fn default_mid_inactive_weight() -> f64 {
    0.1
}
fn default_low_open_weight() -> f64 {
    0.2
}
fn default_mid_open_weight() -> f64 {
    0.1
}
fn default_low_engagement_below() -> f64 {
    30.0
}
fn default_mid_engagement_below() -> f64 {
    50.0
}
fn default_long_inactive_days() -> u32 {
    30
}
fn default_mid_inactive_days() -> u32 {
    14
}
fn default_low_open_below() -> f64 {
    0.10
}
fn default_mid_open_below() -> f64 {
    0.20
}
fn default_ltv_base() -> f64 {
    100.0
}
fn default_daily_min() -> f64 {
    80.0
}
fn default_bi_weekly_min() -> f64 {
    60.0
}
fn default_weekly_min() -> f64 {
    40.0
}
fn default_max_recommendations() -> usize {
    5
}

/// Additive churn-risk weights and the thresholds that trigger them.
#[derive(Debug, Clone, Deserialize)]
pub struct ChurnWeights {
    /// Added when engagement score is below `low_engagement_below`.
    #[serde(default = "default_low_engagement_weight")]
    pub low_engagement: f64,
    /// Added when engagement score is below `mid_engagement_below` but not
    /// below the low threshold.
    #[serde(default = "default_mid_engagement_weight")]
    pub mid_engagement: f64,
    /// Added when inactive longer than `long_inactive_days`.
    #[serde(default = "default_long_inactive_weight")]
    pub long_inactive: f64,
    /// Added when inactive longer than `mid_inactive_days`.
    #[serde(default = "default_mid_inactive_weight")]
    pub mid_inactive: f64,
    /// Added when open rate is below `low_open_below`.
    #[serde(default = "default_low_open_weight")]
    pub low_open: f64,
    /// Added when open rate is below `mid_open_below`.
    #[serde(default = "default_mid_open_weight")]
    pub mid_open: f64,

    #[serde(default = "default_low_engagement_below")]
    pub low_engagement_below: f64,
    #[serde(default = "default_mid_engagement_below")]
    pub mid_engagement_below: f64,
    #[serde(default = "default_long_inactive_days")]
    pub long_inactive_days: u32,
    #[serde(default = "default_mid_inactive_days")]
    pub mid_inactive_days: u32,
    #[serde(default = "default_low_open_below")]
    pub low_open_below: f64,
    #[serde(default = "default_mid_open_below")]
    pub mid_open_below: f64,
}

impl Default for ChurnWeights {
    fn default() -> Self {
        Self {
            low_engagement: default_low_engagement_weight(),
            mid_engagement: default_mid_engagement_weight(),
            long_inactive: default_long_inactive_weight(),
            mid_inactive: default_mid_inactive_weight(),
            low_open: default_low_open_weight(),
            mid_open: default_mid_open_weight(),
            low_engagement_below: default_low_engagement_below(),
            mid_engagement_below: default_mid_engagement_below(),
            long_inactive_days: default_long_inactive_days(),
            mid_inactive_days: default_mid_inactive_days(),
            low_open_below: default_low_open_below(),
            mid_open_below: default_mid_open_below(),
        }
    }
}

/// Configuration injected into the prediction module.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionConfig {
    #[serde(default)]
    pub churn: ChurnWeights,
    /// Base multiplier for lifetime-value estimation.
    #[serde(default = "default_ltv_base")]
    pub ltv_base: f64,
    /// Engagement score at or above which daily sends are recommended.
    #[serde(default = "default_daily_min")]
    pub daily_min: f64,
    /// Engagement score at or above which twice-weekly sends are recommended.
    #[serde(default = "default_bi_weekly_min")]
    pub bi_weekly_min: f64,
    /// Engagement score at or above which weekly sends are recommended.
    #[serde(default = "default_weekly_min")]
    pub weekly_min: f64,
    /// Maximum number of recommended topics returned.
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            churn: ChurnWeights::default(),
            ltv_base: default_ltv_base(),
            daily_min: default_daily_min(),
            bi_weekly_min: default_bi_weekly_min(),
            weekly_min: default_weekly_min(),
            max_recommendations: default_max_recommendations(),
        }
    }
}

impl PredictionConfig {
    /// Checks internal consistency of the thresholds.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.weekly_min < self.bi_weekly_min && self.bi_weekly_min < self.daily_min) {
            return Err(format!(
                "frequency thresholds must be strictly increasing, got {}/{}/{}",
                self.weekly_min, self.bi_weekly_min, self.daily_min
            ));
        }
        if self.ltv_base < 0.0 {
            return Err("ltv_base must be non-negative".to_string());
        }
        if self.max_recommendations == 0 {
            return Err("max_recommendations must be at least 1".to_string());
        }
        Ok(())
    }
}
