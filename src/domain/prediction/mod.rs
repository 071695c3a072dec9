//! Lightweight predictive scoring.
//!
//! Four pure predictions per profile: churn risk, lifetime-value estimate,
//! optimal send cadence, and content-topic recommendations. Every function
//! is total over its inputs: no I/O, no errors, conservative defaults when
//! history is absent. The additive, threshold-based churn design is
//! deliberate for explainability; do not replace it with an opaque model.

mod config;

pub use config::{ChurnWeights, PredictionConfig};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::subscriber::{EngagementHistory, ExperienceLevel, SubscriberProfile};

/// Recommended send cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendFrequency {
    Daily,
    BiWeekly,
    Weekly,
    Monthly,
}

impl SendFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendFrequency::Daily => "daily",
            SendFrequency::BiWeekly => "bi-weekly",
            SendFrequency::Weekly => "weekly",
            SendFrequency::Monthly => "monthly",
        }
    }
}

/// Bundle of the four predictions for one profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predictions {
    /// Disengagement probability estimate, always in [0, 1].
    pub churn_risk: f64,
    /// Lifetime-value estimate, >= 0, unbounded above.
    pub lifetime_value: f64,
    pub optimal_frequency: SendFrequency,
    /// At most `max_recommendations` topics.
    pub recommended_topics: Vec<String>,
}

/// Topics appropriate for each experience level. Sector interests are
/// unioned in on top of these.
static TOPIC_CATALOG: Lazy<BTreeMap<ExperienceLevel, Vec<&'static str>>> = Lazy::new(|| {
    BTreeMap::from([
        (
            ExperienceLevel::Beginner,
            vec![
                "Investing fundamentals",
                "Diversification basics",
                "Understanding market indexes",
            ],
        ),
        (
            ExperienceLevel::Intermediate,
            vec![
                "Portfolio rebalancing",
                "Sector rotation",
                "Valuation metrics",
            ],
        ),
        (
            ExperienceLevel::Advanced,
            vec![
                "Options strategies",
                "Macro positioning",
                "Factor investing",
            ],
        ),
        (
            ExperienceLevel::Expert,
            vec![
                "Derivatives hedging",
                "Volatility trading",
                "Alternative assets",
            ],
        ),
    ])
});

/// Computes all four predictions.
pub fn predict(
    profile: &SubscriberProfile,
    history: Option<&EngagementHistory>,
    config: &PredictionConfig,
) -> Predictions {
    Predictions {
        churn_risk: churn_risk(profile, history, config),
        lifetime_value: lifetime_value(profile, config),
        optimal_frequency: optimal_frequency(profile.behavior.engagement_score, config),
        recommended_topics: recommend_topics(profile, config),
    }
}

/// Additive churn-risk score, clamped to [0, 1].
///
/// Three independent signals each contribute a fixed weight when their
/// threshold trips: engagement score, inactivity, and open rate. When
/// `history` carries fresher counters than the profile snapshot its open
/// rate takes precedence; inactivity always comes from the profile, whose
/// `days_since_active` was fixed against the rebuild instant.
pub fn churn_risk(
    profile: &SubscriberProfile,
    history: Option<&EngagementHistory>,
    config: &PredictionConfig,
) -> f64 {
    let w = &config.churn;
    let engagement = profile.behavior.engagement_score;
    let open_rate = history
        .filter(|h| h.sends > 0)
        .map(EngagementHistory::open_rate)
        .unwrap_or(profile.behavior.open_rate);
    let inactive_days = profile.behavior.days_since_active;

    let mut risk = 0.0;

    if engagement < w.low_engagement_below {
        risk += w.low_engagement;
    } else if engagement < w.mid_engagement_below {
        risk += w.mid_engagement;
    }

    if inactive_days > w.long_inactive_days {
        risk += w.long_inactive;
    } else if inactive_days > w.mid_inactive_days {
        risk += w.mid_inactive;
    }

    if open_rate < w.low_open_below {
        risk += w.low_open;
    } else if open_rate < w.mid_open_below {
        risk += w.mid_open;
    }

    risk.clamp(0.0, 1.0)
}

/// Multiplicative lifetime-value estimate: `base × engagement/50 ×
/// influence/50`. Unbounded above, floored at zero.
pub fn lifetime_value(profile: &SubscriberProfile, config: &PredictionConfig) -> f64 {
    let value = config.ltv_base
        * (profile.behavior.engagement_score / 50.0)
        * (profile.scores.influence_score / 50.0);
    value.max(0.0)
}

/// Stepped engagement-score to cadence mapping.
pub fn optimal_frequency(engagement_score: f64, config: &PredictionConfig) -> SendFrequency {
    if engagement_score >= config.daily_min {
        SendFrequency::Daily
    } else if engagement_score >= config.bi_weekly_min {
        SendFrequency::BiWeekly
    } else if engagement_score >= config.weekly_min {
        SendFrequency::Weekly
    } else {
        SendFrequency::Monthly
    }
}

/// Experience-appropriate topics unioned with declared sector interests,
/// truncated to the configured maximum.
pub fn recommend_topics(profile: &SubscriberProfile, config: &PredictionConfig) -> Vec<String> {
    let mut topics: Vec<String> = TOPIC_CATALOG
        .get(&profile.experience_level)
        .map(|list| list.iter().map(|t| t.to_string()).collect())
        .unwrap_or_default();

    for sector in &profile.interests.sectors {
        let topic = format!("{} outlook", sector);
        if !topics.contains(&topic) {
            topics.push(topic);
        }
    }

    topics.truncate(config.max_recommendations);
    topics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SubscriberId;
    use crate::domain::subscriber::{build_profile, RawSubscriberData};
    use crate::domain::foundation::Timestamp;
    use proptest::prelude::*;

    fn profile_with(
        engagement: f64,
        open_rate: f64,
        days_inactive: u32,
        influence: f64,
    ) -> SubscriberProfile {
        let mut profile = build_profile(
            SubscriberId::new("sub-p").unwrap(),
            &RawSubscriberData::with_email("p@example.com"),
            &EngagementHistory::default(),
            Timestamp::from_unix_secs(1_705_276_800),
        );
        profile.behavior.engagement_score = engagement;
        profile.behavior.open_rate = open_rate;
        profile.behavior.days_since_active = days_inactive;
        profile.scores.influence_score = influence;
        profile
    }

    #[test]
    fn churn_risk_worst_case_scenario() {
        // engagement 20, inactive 45 days, open rate 0.05:
        // 0.4 + 0.3 + 0.2 = 0.9
        let profile = profile_with(20.0, 0.05, 45, 50.0);
        let risk = churn_risk(&profile, None, &PredictionConfig::default());
        assert!((risk - 0.9).abs() < 1e-9);
    }

    #[test]
    fn churn_risk_mid_tier_weights() {
        // engagement 45 (+0.2), inactive 20 days (+0.1), open 0.15 (+0.1)
        let profile = profile_with(45.0, 0.15, 20, 50.0);
        let risk = churn_risk(&profile, None, &PredictionConfig::default());
        assert!((risk - 0.4).abs() < 1e-9);
    }

    #[test]
    fn churn_risk_zero_for_healthy_subscriber() {
        let profile = profile_with(90.0, 0.6, 2, 50.0);
        assert_eq!(churn_risk(&profile, None, &PredictionConfig::default()), 0.0);
    }

    #[test]
    fn lifetime_value_is_multiplicative() {
        // 100 * (80/50) * (60/50) = 192
        let profile = profile_with(80.0, 0.5, 0, 60.0);
        let ltv = lifetime_value(&profile, &PredictionConfig::default());
        assert!((ltv - 192.0).abs() < 1e-9);
    }

    #[test]
    fn lifetime_value_zero_without_influence() {
        let profile = profile_with(80.0, 0.5, 0, 0.0);
        assert_eq!(lifetime_value(&profile, &PredictionConfig::default()), 0.0);
    }

    #[test]
    fn optimal_frequency_steps() {
        let config = PredictionConfig::default();
        assert_eq!(optimal_frequency(85.0, &config), SendFrequency::Daily);
        assert_eq!(optimal_frequency(80.0, &config), SendFrequency::Daily);
        assert_eq!(optimal_frequency(79.9, &config), SendFrequency::BiWeekly);
        assert_eq!(optimal_frequency(60.0, &config), SendFrequency::BiWeekly);
        assert_eq!(optimal_frequency(45.0, &config), SendFrequency::Weekly);
        assert_eq!(optimal_frequency(10.0, &config), SendFrequency::Monthly);
    }

    #[test]
    fn topics_union_catalog_and_sectors_capped_at_five() {
        let mut profile = profile_with(50.0, 0.3, 0, 50.0);
        profile.interests.sectors = vec![
            "Technology".to_string(),
            "Energy".to_string(),
            "Healthcare".to_string(),
        ];
        let topics = recommend_topics(&profile, &PredictionConfig::default());
        assert_eq!(topics.len(), 5);
        assert!(topics.contains(&"Portfolio rebalancing".to_string()));
        assert!(topics.contains(&"Technology outlook".to_string()));
        // Healthcare fell past the cap.
        assert!(!topics.contains(&"Healthcare outlook".to_string()));
    }

    #[test]
    fn predict_bundles_all_four() {
        let profile = profile_with(85.0, 0.5, 0, 50.0);
        let predictions = predict(&profile, None, &PredictionConfig::default());
        assert_eq!(predictions.optimal_frequency, SendFrequency::Daily);
        assert!(predictions.churn_risk >= 0.0 && predictions.churn_risk <= 1.0);
        assert!(predictions.lifetime_value >= 0.0);
        assert!(!predictions.recommended_topics.is_empty());
    }

    proptest! {
        #[test]
        fn churn_risk_always_in_unit_interval(
            engagement in 0.0f64..=100.0,
            open_rate in 0.0f64..=1.0,
            days in 0u32..=400,
        ) {
            let profile = profile_with(engagement, open_rate, days, 50.0);
            let risk = churn_risk(&profile, None, &PredictionConfig::default());
            prop_assert!((0.0..=1.0).contains(&risk));
        }

        #[test]
        fn lifetime_value_never_negative(
            engagement in 0.0f64..=100.0,
            influence in 0.0f64..=100.0,
        ) {
            let profile = profile_with(engagement, 0.5, 0, influence);
            prop_assert!(lifetime_value(&profile, &PredictionConfig::default()) >= 0.0);
        }
    }
}
