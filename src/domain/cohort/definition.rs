//! Cohort definitions and their aggregate metrics.

use serde::{Deserialize, Serialize};

use super::criteria::CohortCriteria;
use crate::domain::foundation::{CohortId, Timestamp};
use crate::domain::prediction::SendFrequency;
use crate::domain::subscriber::{CommunicationStyle, SubscriberProfile};

/// Arithmetic means of member engagement signals.
///
/// All metrics are 0 for an empty cohort; aggregation never divides by the
/// member count when it is zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngagementAverages {
    pub avg_open_rate: f64,
    pub avg_click_rate: f64,
    pub avg_engagement_score: f64,
}

impl EngagementAverages {
    /// Computes means over the given members.
    pub fn from_members(members: &[&SubscriberProfile]) -> Self {
        if members.is_empty() {
            return Self::default();
        }
        let n = members.len() as f64;
        Self {
            avg_open_rate: members.iter().map(|p| p.behavior.open_rate).sum::<f64>() / n,
            avg_click_rate: members.iter().map(|p| p.behavior.click_rate).sum::<f64>() / n,
            avg_engagement_score: members
                .iter()
                .map(|p| p.behavior.engagement_score)
                .sum::<f64>()
                / n,
        }
    }
}

/// Content preferences aggregated for a cohort.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CohortContentPreferences {
    pub preferred_topics: Vec<String>,
    /// "HH:MM" send time derived from members' most common active hour.
    pub optimal_send_time: Option<String>,
    pub preferred_frequency: Option<SendFrequency>,
    pub style: CommunicationStyle,
}

/// A named, rule-matched group of subscribers used as a personalization
/// unit.
///
/// Cohorts are regenerated wholesale on every generator call; there is no
/// incremental update path, so `size` always equals the number of profiles
/// matching `criteria` at generation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortDefinition {
    pub id: CohortId,
    pub name: String,
    pub description: String,
    pub size: usize,
    pub criteria: CohortCriteria,
    /// Human-readable tags driving rule derivation and prompt archetypes.
    pub characteristics: Vec<String>,
    pub engagement: EngagementAverages,
    pub content_preferences: CohortContentPreferences,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CohortDefinition {
    /// True if the cohort carries the given characteristic tag.
    pub fn has_characteristic(&self, tag: &str) -> bool {
        self.characteristics.iter().any(|c| c == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SubscriberId;
    use crate::domain::subscriber::{build_profile, EngagementHistory, RawSubscriberData};

    fn profile_with_rates(open: f64, click: f64, engagement: f64) -> SubscriberProfile {
        let mut p = build_profile(
            SubscriberId::new("sub-a").unwrap(),
            &RawSubscriberData::with_email("a@example.com"),
            &EngagementHistory::default(),
            Timestamp::from_unix_secs(1_705_276_800),
        );
        p.behavior.open_rate = open;
        p.behavior.click_rate = click;
        p.behavior.engagement_score = engagement;
        p
    }

    #[test]
    fn empty_cohort_aggregates_to_zero() {
        let averages = EngagementAverages::from_members(&[]);
        assert_eq!(averages, EngagementAverages::default());
        assert_eq!(averages.avg_open_rate, 0.0);
    }

    #[test]
    fn aggregates_are_arithmetic_means() {
        let a = profile_with_rates(0.2, 0.1, 40.0);
        let b = profile_with_rates(0.6, 0.3, 80.0);
        let averages = EngagementAverages::from_members(&[&a, &b]);
        assert!((averages.avg_open_rate - 0.4).abs() < 1e-9);
        assert!((averages.avg_click_rate - 0.2).abs() < 1e-9);
        assert!((averages.avg_engagement_score - 60.0).abs() < 1e-9);
    }
}
