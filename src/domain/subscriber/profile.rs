//! Subscriber profile aggregate and its classification enums.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::foundation::SubscriberId;

/// Investment risk appetite declared by or inferred for a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTolerance {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskTolerance {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTolerance::Conservative => "conservative",
            RiskTolerance::Moderate => "moderate",
            RiskTolerance::Aggressive => "aggressive",
        }
    }
}

impl Default for RiskTolerance {
    fn default() -> Self {
        Self::Moderate
    }
}

impl std::fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How seasoned the subscriber is as an investor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Default for ExperienceLevel {
    fn default() -> Self {
        Self::Intermediate
    }
}

/// Investment time horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeHorizon {
    Short,
    Medium,
    Long,
}

impl Default for TimeHorizon {
    fn default() -> Self {
        Self::Long
    }
}

/// Preferred register for adapted copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunicationStyle {
    Formal,
    Conversational,
    Concise,
}

impl CommunicationStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommunicationStyle::Formal => "formal",
            CommunicationStyle::Conversational => "conversational",
            CommunicationStyle::Concise => "concise",
        }
    }
}

impl Default for CommunicationStyle {
    fn default() -> Self {
        Self::Conversational
    }
}

/// How much depth the subscriber wants per topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentDepth {
    Summary,
    Standard,
    Deep,
}

impl Default for ContentDepth {
    fn default() -> Self {
        Self::Standard
    }
}

/// Text-versus-visual balance preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualPreference {
    TextHeavy,
    Balanced,
    ChartHeavy,
}

impl Default for VisualPreference {
    fn default() -> Self {
        Self::Balanced
    }
}

/// Observed engagement behavior, normalized from raw counters.
///
/// All values are clamped at construction so downstream scoring never sees
/// out-of-range inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorMetrics {
    /// Composite engagement score, 0-100.
    pub engagement_score: f64,
    /// Fraction of sends opened, 0-1.
    pub open_rate: f64,
    /// Fraction of sends clicked, 0-1.
    pub click_rate: f64,
    /// Average reading time per opened email, seconds.
    pub avg_reading_secs: f64,
    /// Hours of day (0-23) in which the subscriber typically opens email.
    pub active_hours: BTreeSet<u8>,
    /// Whole days since the last recorded open or click.
    pub days_since_active: u32,
}

impl BehaviorMetrics {
    /// Builds metrics, clamping score and rates into range and dropping
    /// out-of-range hours.
    pub fn new(
        engagement_score: f64,
        open_rate: f64,
        click_rate: f64,
        avg_reading_secs: f64,
        active_hours: BTreeSet<u8>,
        days_since_active: u32,
    ) -> Self {
        Self {
            engagement_score: engagement_score.clamp(0.0, 100.0),
            open_rate: open_rate.clamp(0.0, 1.0),
            click_rate: click_rate.clamp(0.0, 1.0),
            avg_reading_secs: avg_reading_secs.max(0.0),
            active_hours: active_hours.into_iter().filter(|h| *h < 24).collect(),
            days_since_active,
        }
    }

    /// True if any active hour falls in the inclusive range.
    pub fn active_between(&self, start: u8, end: u8) -> bool {
        self.active_hours.iter().any(|h| *h >= start && *h <= end)
    }
}

impl Default for BehaviorMetrics {
    fn default() -> Self {
        Self {
            engagement_score: 0.0,
            open_rate: 0.0,
            click_rate: 0.0,
            avg_reading_secs: 0.0,
            active_hours: BTreeSet::new(),
            days_since_active: 0,
        }
    }
}

/// Declared interest tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Interests {
    /// Market sectors ("Technology", "Healthcare", ...).
    pub sectors: Vec<String>,
    /// Asset classes ("equities", "bonds", "crypto", ...).
    pub asset_classes: Vec<String>,
}

impl Interests {
    pub fn has_sector(&self, sector: &str) -> bool {
        self.sectors.iter().any(|s| s.eq_ignore_ascii_case(sector))
    }
}

/// Presentation preferences for personalized content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalizationPrefs {
    pub communication_style: CommunicationStyle,
    pub content_depth: ContentDepth,
    pub visual_preference: VisualPreference,
}

/// Scores derived from behavior, recomputed on every rebuild.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedScores {
    /// Heuristic disengagement probability, 0-1.
    pub churn_risk: f64,
    /// Lifetime value estimate, >= 0 and unbounded above.
    pub lifetime_value: f64,
    /// Referral-driven influence score, 0-100.
    pub influence_score: f64,
}

/// Complete behavioral profile of one subscriber.
///
/// Profiles are rebuilt wholesale from current subscriber and engagement
/// data; no field is ever mutated in place after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriberProfile {
    pub id: SubscriberId,
    pub email: String,
    pub risk_tolerance: RiskTolerance,
    pub experience_level: ExperienceLevel,
    /// Approximate portfolio size in account currency.
    pub portfolio_size: f64,
    pub time_horizon: TimeHorizon,
    pub behavior: BehaviorMetrics,
    pub interests: Interests,
    pub prefs: PersonalizationPrefs,
    pub scores: DerivedScores,
}

impl SubscriberProfile {
    /// Returns a copy with the derived scores replaced.
    ///
    /// Used by the profile service after running predictions; keeps the
    /// rebuild-wholesale discipline (no in-place mutation of a shared
    /// profile).
    pub fn with_scores(mut self, scores: DerivedScores) -> Self {
        self.scores = scores;
        self
    }
}
