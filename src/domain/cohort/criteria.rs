//! Cohort membership criteria as composable predicates.
//!
//! A criteria value is a conjunction: every predicate that is present must
//! hold for a profile to match. Absent predicates are unconstrained. This
//! keeps cohort membership fully explainable: a cohort's definition is its
//! criteria, and `size == profiles matching criteria` by construction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::subscriber::{ExperienceLevel, RiskTolerance, SubscriberProfile};

/// Engagement-score range, closed at the lower bound and open at the upper
/// so adjacent tiers never overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementRange {
    pub min: f64,
    /// Exclusive upper bound; `None` means unbounded.
    pub max: Option<f64>,
}

impl EngagementRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max: Some(max) }
    }

    /// At-least range with an open upper bound.
    pub fn at_least(min: f64) -> Self {
        Self { min, max: None }
    }

    /// Below-only range with an open lower bound.
    pub fn below(max: f64) -> Self {
        Self {
            min: 0.0,
            max: Some(max),
        }
    }

    pub fn contains(&self, score: f64) -> bool {
        score >= self.min && self.max.map_or(true, |max| score < max)
    }
}

/// Conjunction of optional membership predicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CohortCriteria {
    /// Profile risk tolerance must be one of these.
    pub risk_tolerances: Option<Vec<RiskTolerance>>,
    /// Profile experience level must be one of these.
    pub experience_levels: Option<Vec<ExperienceLevel>>,
    /// Engagement score must fall in this range.
    pub engagement: Option<EngagementRange>,
    /// Profile must declare interest in at least one of these sectors.
    pub sectors: Option<Vec<String>>,
    /// Additional attribute filters; see `matches_custom` for the supported
    /// keys. An unsupported key never matches, so a typo surfaces as an
    /// empty cohort rather than a silently widened one.
    pub custom: BTreeMap<String, String>,
}

impl CohortCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_risk(mut self, tolerances: Vec<RiskTolerance>) -> Self {
        self.risk_tolerances = Some(tolerances);
        self
    }

    pub fn with_experience(mut self, levels: Vec<ExperienceLevel>) -> Self {
        self.experience_levels = Some(levels);
        self
    }

    pub fn with_engagement(mut self, range: EngagementRange) -> Self {
        self.engagement = Some(range);
        self
    }

    pub fn with_sectors(mut self, sectors: Vec<String>) -> Self {
        self.sectors = Some(sectors);
        self
    }

    pub fn with_custom(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom.insert(key.into(), value.into());
        self
    }

    /// True iff the profile satisfies every present predicate.
    pub fn matches(&self, profile: &SubscriberProfile) -> bool {
        if let Some(ref tolerances) = self.risk_tolerances {
            if !tolerances.contains(&profile.risk_tolerance) {
                return false;
            }
        }

        if let Some(ref levels) = self.experience_levels {
            if !levels.contains(&profile.experience_level) {
                return false;
            }
        }

        if let Some(ref range) = self.engagement {
            if !range.contains(profile.behavior.engagement_score) {
                return false;
            }
        }

        if let Some(ref sectors) = self.sectors {
            if !sectors.iter().any(|s| profile.interests.has_sector(s)) {
                return false;
            }
        }

        self.custom
            .iter()
            .all(|(key, value)| matches_custom(profile, key, value))
    }
}

/// Evaluates one custom filter against a profile.
///
/// Supported keys:
/// - `active_hour_between`: "6-8", any active hour in the inclusive range
/// - `min_avg_reading_secs`: minimum average reading time
/// - `max_avg_reading_secs`: maximum average reading time
/// - `time_horizon`: "short" | "medium" | "long"
fn matches_custom(profile: &SubscriberProfile, key: &str, value: &str) -> bool {
    match key {
        "active_hour_between" => match parse_hour_range(value) {
            Some((start, end)) => profile.behavior.active_between(start, end),
            None => false,
        },
        "min_avg_reading_secs" => value
            .parse::<f64>()
            .map(|min| profile.behavior.avg_reading_secs >= min)
            .unwrap_or(false),
        "max_avg_reading_secs" => value
            .parse::<f64>()
            .map(|max| profile.behavior.avg_reading_secs <= max)
            .unwrap_or(false),
        "time_horizon" => serde_json::from_value::<crate::domain::subscriber::TimeHorizon>(
            serde_json::Value::String(value.to_string()),
        )
        .map(|h| profile.time_horizon == h)
        .unwrap_or(false),
        _ => false,
    }
}

fn parse_hour_range(value: &str) -> Option<(u8, u8)> {
    let (start, end) = value.split_once('-')?;
    let start: u8 = start.trim().parse().ok()?;
    let end: u8 = end.trim().parse().ok()?;
    (start <= end && end <= 23).then_some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{SubscriberId, Timestamp};
    use crate::domain::subscriber::{build_profile, EngagementHistory, RawSubscriberData, TimeHorizon};

    fn profile() -> SubscriberProfile {
        let raw = RawSubscriberData {
            risk_tolerance: Some(RiskTolerance::Aggressive),
            experience_level: Some(ExperienceLevel::Advanced),
            sectors: vec!["Technology".to_string()],
            ..RawSubscriberData::with_email("c@example.com")
        };
        let mut p = build_profile(
            SubscriberId::new("sub-c").unwrap(),
            &raw,
            &EngagementHistory::default(),
            Timestamp::from_unix_secs(1_705_276_800),
        );
        p.behavior.engagement_score = 75.0;
        p.behavior.avg_reading_secs = 200.0;
        p.behavior.active_hours = [7].into_iter().collect();
        p
    }

    #[test]
    fn empty_criteria_matches_everything() {
        assert!(CohortCriteria::new().matches(&profile()));
    }

    #[test]
    fn conjunction_requires_all_predicates() {
        let criteria = CohortCriteria::new()
            .with_risk(vec![RiskTolerance::Aggressive])
            .with_engagement(EngagementRange::at_least(70.0));
        assert!(criteria.matches(&profile()));

        let criteria = criteria.with_sectors(vec!["Energy".to_string()]);
        assert!(!criteria.matches(&profile()));
    }

    #[test]
    fn risk_set_membership() {
        let criteria = CohortCriteria::new().with_risk(vec![RiskTolerance::Conservative]);
        assert!(!criteria.matches(&profile()));
    }

    #[test]
    fn engagement_range_is_half_open() {
        let criteria = CohortCriteria::new().with_engagement(EngagementRange::new(75.0, 80.0));
        assert!(criteria.matches(&profile()));

        // Lower bound included, upper bound excluded.
        let criteria = CohortCriteria::new().with_engagement(EngagementRange::new(70.0, 75.0));
        assert!(!criteria.matches(&profile()));
    }

    #[test]
    fn sector_predicate_matches_any_listed_sector() {
        let criteria = CohortCriteria::new()
            .with_sectors(vec!["Energy".to_string(), "Technology".to_string()]);
        assert!(criteria.matches(&profile()));
    }

    #[test]
    fn custom_hour_window_filter() {
        let criteria = CohortCriteria::new().with_custom("active_hour_between", "6-8");
        assert!(criteria.matches(&profile()));

        let criteria = CohortCriteria::new().with_custom("active_hour_between", "12-14");
        assert!(!criteria.matches(&profile()));
    }

    #[test]
    fn custom_reading_time_filter() {
        let criteria = CohortCriteria::new().with_custom("min_avg_reading_secs", "180");
        assert!(criteria.matches(&profile()));

        let criteria = CohortCriteria::new().with_custom("min_avg_reading_secs", "300");
        assert!(!criteria.matches(&profile()));
    }

    #[test]
    fn custom_time_horizon_filter() {
        let mut p = profile();
        p.time_horizon = TimeHorizon::Short;
        let criteria = CohortCriteria::new().with_custom("time_horizon", "short");
        assert!(criteria.matches(&p));
    }

    #[test]
    fn unknown_custom_key_never_matches() {
        let criteria = CohortCriteria::new().with_custom("shoe_size", "42");
        assert!(!criteria.matches(&profile()));
    }

    #[test]
    fn malformed_hour_range_never_matches() {
        let criteria = CohortCriteria::new().with_custom("active_hour_between", "8-6");
        assert!(!criteria.matches(&profile()));
        let criteria = CohortCriteria::new().with_custom("active_hour_between", "six-eight");
        assert!(!criteria.matches(&profile()));
    }
}
