//! Pure profile construction from raw subscriber and engagement data.
//!
//! `build_profile` is deterministic given its inputs (including the `now`
//! timestamp), so it can be recomputed on every personalization request
//! without caching. Missing optional fields are substituted with documented
//! defaults and never raise.

use std::collections::BTreeSet;

use super::engagement::{EngagementHistory, RawSubscriberData};
use super::profile::{
    BehaviorMetrics, DerivedScores, Interests, PersonalizationPrefs, SubscriberProfile,
};
use crate::domain::foundation::{SubscriberId, Timestamp};

/// Reading time (seconds) treated as fully engaged when scoring.
const FULL_ENGAGEMENT_READING_SECS: f64 = 180.0;

/// Influence points granted per referred subscriber, capped at 100.
const INFLUENCE_PER_REFERRAL: f64 = 10.0;

/// Builds a complete profile from raw records.
///
/// The derived churn/lifetime-value scores are left at their defaults here;
/// the profile service fills them from the prediction module so that profile
/// construction stays free of scoring configuration.
pub fn build_profile(
    id: SubscriberId,
    raw: &RawSubscriberData,
    history: &EngagementHistory,
    now: Timestamp,
) -> SubscriberProfile {
    let behavior = behavior_metrics(history, now);
    let influence = influence_score(history);

    SubscriberProfile {
        id,
        email: raw.email.clone(),
        risk_tolerance: raw.risk_tolerance.unwrap_or_default(),
        experience_level: raw.experience_level.unwrap_or_default(),
        portfolio_size: raw.portfolio_size.unwrap_or(0.0).max(0.0),
        time_horizon: raw.time_horizon.unwrap_or_default(),
        behavior,
        interests: Interests {
            sectors: raw.sectors.clone(),
            asset_classes: raw.asset_classes.clone(),
        },
        prefs: PersonalizationPrefs {
            communication_style: raw.communication_style.unwrap_or_default(),
            content_depth: raw.content_depth.unwrap_or_default(),
            visual_preference: raw.visual_preference.unwrap_or_default(),
        },
        scores: DerivedScores {
            churn_risk: 0.0,
            lifetime_value: 0.0,
            influence_score: influence,
        },
    }
}

fn behavior_metrics(history: &EngagementHistory, now: Timestamp) -> BehaviorMetrics {
    let open_rate = history.open_rate();
    let click_rate = history.click_rate();
    let avg_reading = history.avg_reading_secs();

    BehaviorMetrics::new(
        engagement_score(open_rate, click_rate, avg_reading),
        open_rate,
        click_rate,
        avg_reading,
        history.active_hours.iter().copied().collect::<BTreeSet<u8>>(),
        history.days_since_active(&now),
    )
}

/// Composite 0-100 engagement score.
///
/// Opens carry half the weight, clicks (a stronger signal but rarer) thirty
/// percent, and reading depth the remainder. Weights are fixed: the score is
/// an internal ordinal, not a tunable product metric.
fn engagement_score(open_rate: f64, click_rate: f64, avg_reading_secs: f64) -> f64 {
    let reading_factor = (avg_reading_secs / FULL_ENGAGEMENT_READING_SECS).min(1.0);
    (open_rate * 50.0 + click_rate * 30.0 + reading_factor * 20.0).clamp(0.0, 100.0)
}

fn influence_score(history: &EngagementHistory) -> f64 {
    (f64::from(history.referrals) * INFLUENCE_PER_REFERRAL).min(100.0)
}
