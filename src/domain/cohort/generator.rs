//! Six-family rule-based cohort generation.
//!
//! Each family runs independently over the full profile population, so a
//! subscriber can appear in several cohorts at once (simultaneously
//! "aggressive", "high engagement", and "Technology-focused"). A family
//! that fails is logged and skipped; the remaining families still produce
//! their cohorts. Generation never raises for valid profile input.

use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::config::SegmentationConfig;
use super::criteria::{CohortCriteria, EngagementRange};
use super::definition::{CohortContentPreferences, CohortDefinition, EngagementAverages};
use crate::domain::foundation::{CohortId, DomainError, Timestamp};
use crate::domain::market::{MarketContext, Sentiment};
use crate::domain::prediction::{optimal_frequency, PredictionConfig};
use crate::domain::subscriber::{
    CommunicationStyle, ExperienceLevel, RiskTolerance, SubscriberProfile,
};

/// Stateless cohort generator; configuration is injected rather than held
/// as global state so thresholds are testable without code changes.
#[derive(Debug, Clone)]
pub struct CohortGenerator {
    segmentation: SegmentationConfig,
    prediction: PredictionConfig,
}

/// One cohort blueprint before member matching.
struct CohortSpec {
    slug: &'static str,
    name: &'static str,
    description: String,
    criteria: CohortCriteria,
    characteristics: Vec<String>,
    style: CommunicationStyle,
    min_size: usize,
}

impl CohortGenerator {
    pub fn new(segmentation: SegmentationConfig, prediction: PredictionConfig) -> Self {
        Self {
            segmentation,
            prediction,
        }
    }

    /// Produces the full current cohort set from the given population.
    ///
    /// The result is a fresh, consistent snapshot: cohorts are regenerated,
    /// never incrementally updated.
    pub fn generate(
        &self,
        profiles: &[SubscriberProfile],
        market: Option<&MarketContext>,
    ) -> Vec<CohortDefinition> {
        let now = Timestamp::now();
        let mut cohorts = Vec::new();

        let families: [(&str, Result<Vec<CohortDefinition>, DomainError>); 6] = [
            ("risk", self.risk_family(profiles, now)),
            ("engagement", self.engagement_family(profiles, now)),
            ("experience", self.experience_family(profiles, now)),
            ("sector", self.sector_family(profiles, now)),
            ("behavioral", self.behavioral_family(profiles, now)),
            ("market_responsive", self.market_family(profiles, market, now)),
        ];

        for (family, result) in families {
            match result {
                Ok(mut family_cohorts) => cohorts.append(&mut family_cohorts),
                Err(err) => {
                    warn!(family, error = %err, "cohort family skipped");
                }
            }
        }

        cohorts
    }

    fn risk_family(
        &self,
        profiles: &[SubscriberProfile],
        now: Timestamp,
    ) -> Result<Vec<CohortDefinition>, DomainError> {
        let specs = vec![
            CohortSpec {
                slug: "conservative_investors",
                name: "Conservative Investors",
                description: "Subscribers prioritizing capital preservation".to_string(),
                criteria: CohortCriteria::new().with_risk(vec![RiskTolerance::Conservative]),
                characteristics: tags(&["Conservative", "Capital preservation focus"]),
                style: CommunicationStyle::Formal,
                min_size: self.segmentation.min_cohort_size,
            },
            CohortSpec {
                slug: "moderate_investors",
                name: "Moderate Investors",
                description: "Subscribers with a balanced risk appetite".to_string(),
                criteria: CohortCriteria::new().with_risk(vec![RiskTolerance::Moderate]),
                characteristics: tags(&["Moderate", "Balanced allocation"]),
                style: CommunicationStyle::Conversational,
                min_size: self.segmentation.min_cohort_size,
            },
            CohortSpec {
                slug: "aggressive_investors",
                name: "Aggressive Investors",
                description: "Subscribers pursuing high-conviction positions".to_string(),
                criteria: CohortCriteria::new().with_risk(vec![RiskTolerance::Aggressive]),
                characteristics: tags(&["Aggressive", "High conviction"]),
                style: CommunicationStyle::Concise,
                min_size: self.segmentation.min_cohort_size,
            },
        ];

        Ok(self.build_all(specs, profiles, now))
    }

    fn engagement_family(
        &self,
        profiles: &[SubscriberProfile],
        now: Timestamp,
    ) -> Result<Vec<CohortDefinition>, DomainError> {
        let high = self.segmentation.high_engagement_min;
        let moderate = self.segmentation.moderate_engagement_min;

        let specs = vec![
            CohortSpec {
                slug: "high_engagement",
                name: "Highly Engaged Readers",
                description: "Subscribers who open and read nearly every issue".to_string(),
                criteria: CohortCriteria::new().with_engagement(EngagementRange::at_least(high)),
                characteristics: tags(&["High engagement", "Frequent readers"]),
                style: CommunicationStyle::Conversational,
                min_size: self.segmentation.min_cohort_size,
            },
            CohortSpec {
                slug: "moderate_engagement",
                name: "Moderately Engaged Readers",
                description: "Subscribers who read selectively".to_string(),
                criteria: CohortCriteria::new()
                    .with_engagement(EngagementRange::new(moderate, high)),
                characteristics: tags(&["Moderate engagement"]),
                style: CommunicationStyle::Conversational,
                min_size: self.segmentation.min_cohort_size,
            },
            CohortSpec {
                slug: "low_engagement",
                name: "At-Risk Readers",
                description: "Subscribers drifting toward disengagement".to_string(),
                criteria: CohortCriteria::new().with_engagement(EngagementRange::below(moderate)),
                characteristics: tags(&["Low engagement", "Re-engagement candidates"]),
                style: CommunicationStyle::Concise,
                min_size: self.segmentation.min_cohort_size,
            },
        ];

        Ok(self.build_all(specs, profiles, now))
    }

    fn experience_family(
        &self,
        profiles: &[SubscriberProfile],
        now: Timestamp,
    ) -> Result<Vec<CohortDefinition>, DomainError> {
        let specs = vec![
            CohortSpec {
                slug: "learning_investors",
                name: "Learning Investors",
                description: "Subscribers new to investing".to_string(),
                criteria: CohortCriteria::new()
                    .with_experience(vec![ExperienceLevel::Beginner]),
                characteristics: tags(&["Learning", "Beginner-friendly"]),
                style: CommunicationStyle::Conversational,
                min_size: self.segmentation.min_cohort_size,
            },
            CohortSpec {
                slug: "developing_investors",
                name: "Developing Investors",
                description: "Subscribers building on the fundamentals".to_string(),
                criteria: CohortCriteria::new()
                    .with_experience(vec![ExperienceLevel::Intermediate]),
                characteristics: tags(&["Developing"]),
                style: CommunicationStyle::Conversational,
                min_size: self.segmentation.min_cohort_size,
            },
            CohortSpec {
                slug: "professional_investors",
                name: "Professional Investors",
                description: "Experienced subscribers who expect technical depth".to_string(),
                criteria: CohortCriteria::new().with_experience(vec![
                    ExperienceLevel::Advanced,
                    ExperienceLevel::Expert,
                ]),
                characteristics: tags(&["Professional", "Technical depth"]),
                style: CommunicationStyle::Formal,
                min_size: self.segmentation.min_cohort_size,
            },
        ];

        Ok(self.build_all(specs, profiles, now))
    }

    fn sector_family(
        &self,
        profiles: &[SubscriberProfile],
        now: Timestamp,
    ) -> Result<Vec<CohortDefinition>, DomainError> {
        // Sector cohorts are built from the sectors actually present in the
        // population; each needs min_sector_cohort_size members so narrow
        // interests don't produce single-reader segments.
        let mut sectors: Vec<String> = profiles
            .iter()
            .flat_map(|p| p.interests.sectors.iter().cloned())
            .collect();
        sectors.sort();
        sectors.dedup();

        let mut cohorts = Vec::new();
        for sector in sectors {
            let slug = format!("sector_{}", slugify(&sector));
            let criteria = CohortCriteria::new().with_sectors(vec![sector.clone()]);
            let members: Vec<&SubscriberProfile> =
                profiles.iter().filter(|p| criteria.matches(p)).collect();
            if members.len() < self.segmentation.min_sector_cohort_size {
                continue;
            }
            cohorts.push(self.assemble(
                CohortId::new(slug).map_err(DomainError::from)?,
                format!("{} Focus", sector),
                format!("Subscribers following the {} sector", sector),
                criteria,
                vec![format!("{}-focused", sector), "Sector specialist".to_string()],
                CommunicationStyle::Conversational,
                &members,
                now,
            ));
        }
        Ok(cohorts)
    }

    fn behavioral_family(
        &self,
        profiles: &[SubscriberProfile],
        now: Timestamp,
    ) -> Result<Vec<CohortDefinition>, DomainError> {
        let window = format!(
            "{}-{}",
            self.segmentation.early_hours_start, self.segmentation.early_hours_end
        );
        let specs = vec![
            CohortSpec {
                slug: "early_morning_readers",
                name: "Early Morning Readers",
                description: "Subscribers who read before the market opens".to_string(),
                criteria: CohortCriteria::new().with_custom("active_hour_between", window),
                characteristics: tags(&["Early morning readers"]),
                style: CommunicationStyle::Concise,
                min_size: self.segmentation.min_cohort_size,
            },
            CohortSpec {
                slug: "deep_readers",
                name: "Deep Readers",
                description: "Subscribers who read issues end to end".to_string(),
                criteria: CohortCriteria::new().with_custom(
                    "min_avg_reading_secs",
                    self.segmentation.deep_reading_secs.to_string(),
                ),
                characteristics: tags(&["Deep readers", "Long-form preference"]),
                style: CommunicationStyle::Formal,
                min_size: self.segmentation.min_cohort_size,
            },
        ];

        Ok(self.build_all(specs, profiles, now))
    }

    fn market_family(
        &self,
        profiles: &[SubscriberProfile],
        market: Option<&MarketContext>,
        now: Timestamp,
    ) -> Result<Vec<CohortDefinition>, DomainError> {
        let Some(market) = market else {
            debug!("no market context supplied; market-responsive family skipped");
            return Ok(Vec::new());
        };

        let mut specs = Vec::new();
        if market.is_volatile(self.segmentation.volatility_threshold) {
            specs.push(CohortSpec {
                slug: "volatility_responsive",
                name: "Volatility Opportunists",
                description: "Aggressive, highly engaged subscribers during elevated volatility"
                    .to_string(),
                criteria: CohortCriteria::new()
                    .with_risk(vec![RiskTolerance::Aggressive])
                    .with_engagement(EngagementRange::at_least(
                        self.segmentation.high_engagement_min,
                    )),
                characteristics: tags(&[
                    "Aggressive",
                    "High engagement",
                    "Volatility responsive",
                ]),
                style: CommunicationStyle::Concise,
                min_size: self.segmentation.min_cohort_size,
            });
        }
        if market.sentiment == Sentiment::Bearish {
            specs.push(CohortSpec {
                slug: "defensive_rotation",
                name: "Defensive Rotation",
                description: "Conservative subscribers during a bearish stretch".to_string(),
                criteria: CohortCriteria::new().with_risk(vec![RiskTolerance::Conservative]),
                characteristics: tags(&["Conservative", "Defensive positioning"]),
                style: CommunicationStyle::Formal,
                min_size: self.segmentation.min_cohort_size,
            });
        }

        Ok(self.build_all(specs, profiles, now))
    }

    fn build_all(
        &self,
        specs: Vec<CohortSpec>,
        profiles: &[SubscriberProfile],
        now: Timestamp,
    ) -> Vec<CohortDefinition> {
        specs
            .into_iter()
            .filter_map(|spec| {
                let members: Vec<&SubscriberProfile> =
                    profiles.iter().filter(|p| spec.criteria.matches(p)).collect();
                if members.len() < spec.min_size {
                    return None;
                }
                Some(self.assemble(
                    CohortId::from_slug(spec.slug),
                    spec.name.to_string(),
                    spec.description,
                    spec.criteria,
                    spec.characteristics,
                    spec.style,
                    &members,
                    now,
                ))
            })
            .collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        &self,
        id: CohortId,
        name: String,
        description: String,
        criteria: CohortCriteria,
        characteristics: Vec<String>,
        style: CommunicationStyle,
        members: &[&SubscriberProfile],
        now: Timestamp,
    ) -> CohortDefinition {
        let engagement = EngagementAverages::from_members(members);
        let content_preferences = CohortContentPreferences {
            preferred_topics: top_sectors(members, 3),
            optimal_send_time: most_common_hour(members).map(|h| format!("{:02}:00", h)),
            preferred_frequency: (!members.is_empty())
                .then(|| optimal_frequency(engagement.avg_engagement_score, &self.prediction)),
            style,
        };

        CohortDefinition {
            id,
            name,
            description,
            size: members.len(),
            criteria,
            characteristics,
            engagement,
            content_preferences,
            created_at: now,
            updated_at: now,
        }
    }
}

fn tags(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn slugify(s: &str) -> String {
    s.to_ascii_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Most frequently declared sectors among members, ties broken
/// alphabetically.
fn top_sectors(members: &[&SubscriberProfile], limit: usize) -> Vec<String> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for member in members {
        for sector in &member.interests.sectors {
            *counts.entry(sector.clone()).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().take(limit).map(|(s, _)| s).collect()
}

/// Most common active hour among members, ties broken toward the earlier
/// hour.
fn most_common_hour(members: &[&SubscriberProfile]) -> Option<u8> {
    let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
    for member in members {
        for hour in &member.behavior.active_hours {
            *counts.entry(*hour).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(hour, _)| hour)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SubscriberId;
    use crate::domain::subscriber::{build_profile, EngagementHistory, RawSubscriberData};

    fn make_profile(
        idx: usize,
        risk: RiskTolerance,
        experience: ExperienceLevel,
        engagement: f64,
        sectors: Vec<&str>,
        active_hours: Vec<u8>,
    ) -> SubscriberProfile {
        let raw = RawSubscriberData {
            risk_tolerance: Some(risk),
            experience_level: Some(experience),
            sectors: sectors.into_iter().map(String::from).collect(),
            ..RawSubscriberData::with_email(format!("s{}@example.com", idx))
        };
        let mut p = build_profile(
            SubscriberId::new(format!("sub-{}", idx)).unwrap(),
            &raw,
            &EngagementHistory::default(),
            Timestamp::from_unix_secs(1_705_276_800),
        );
        p.behavior.engagement_score = engagement;
        p.behavior.active_hours = active_hours.into_iter().collect();
        p
    }

    fn generator() -> CohortGenerator {
        CohortGenerator::new(SegmentationConfig::default(), PredictionConfig::default())
    }

    fn population() -> Vec<SubscriberProfile> {
        vec![
            make_profile(0, RiskTolerance::Conservative, ExperienceLevel::Beginner, 30.0, vec!["Technology"], vec![7]),
            make_profile(1, RiskTolerance::Aggressive, ExperienceLevel::Expert, 85.0, vec!["Technology"], vec![7]),
            make_profile(2, RiskTolerance::Aggressive, ExperienceLevel::Advanced, 75.0, vec!["Technology"], vec![12]),
            make_profile(3, RiskTolerance::Moderate, ExperienceLevel::Intermediate, 55.0, vec!["Technology"], vec![9]),
            make_profile(4, RiskTolerance::Moderate, ExperienceLevel::Intermediate, 45.0, vec!["Technology"], vec![7]),
            make_profile(5, RiskTolerance::Conservative, ExperienceLevel::Beginner, 20.0, vec!["Energy"], vec![20]),
        ]
    }

    #[test]
    fn risk_family_produces_all_present_tolerances() {
        let cohorts = generator().generate(&population(), None);
        let slugs: Vec<&str> = cohorts.iter().map(|c| c.id.as_str()).collect();
        assert!(slugs.contains(&"conservative_investors"));
        assert!(slugs.contains(&"moderate_investors"));
        assert!(slugs.contains(&"aggressive_investors"));
    }

    #[test]
    fn cohort_size_matches_criteria_count() {
        let profiles = population();
        let cohorts = generator().generate(&profiles, None);
        for cohort in &cohorts {
            let matching = profiles.iter().filter(|p| cohort.criteria.matches(p)).count();
            assert_eq!(cohort.size, matching, "size invariant broken for {}", cohort.id);
            assert!(cohort.size <= profiles.len());
        }
    }

    #[test]
    fn sector_cohort_requires_five_members() {
        let profiles = population();
        let cohorts = generator().generate(&profiles, None);
        let slugs: Vec<&str> = cohorts.iter().map(|c| c.id.as_str()).collect();
        // Technology has 5 declared readers, Energy only 1.
        assert!(slugs.contains(&"sector_technology"));
        assert!(!slugs.contains(&"sector_energy"));
    }

    #[test]
    fn subscribers_appear_in_multiple_cohorts() {
        let profiles = population();
        let cohorts = generator().generate(&profiles, None);
        let sub1 = &profiles[1];
        let containing = cohorts
            .iter()
            .filter(|c| c.criteria.matches(sub1))
            .count();
        // Aggressive + high engagement + professional + sector_technology at
        // minimum.
        assert!(containing >= 4);
    }

    #[test]
    fn empty_population_produces_no_cohorts() {
        let cohorts = generator().generate(&[], None);
        assert!(cohorts.is_empty());
    }

    #[test]
    fn market_family_absent_without_context() {
        let cohorts = generator().generate(&population(), None);
        assert!(!cohorts.iter().any(|c| c.id.as_str() == "volatility_responsive"));
    }

    #[test]
    fn volatile_market_adds_responsive_cohort() {
        let mut market = MarketContext::neutral();
        market.volatility_index = 30.0;
        let cohorts = generator().generate(&population(), Some(&market));
        let cohort = cohorts
            .iter()
            .find(|c| c.id.as_str() == "volatility_responsive")
            .expect("volatility cohort present");
        // Subscribers 1 and 2: aggressive with engagement >= 70.
        assert_eq!(cohort.size, 2);
        assert!(cohort.has_characteristic("Volatility responsive"));
    }

    #[test]
    fn bearish_market_adds_defensive_cohort() {
        let mut market = MarketContext::neutral();
        market.sentiment = Sentiment::Bearish;
        let cohorts = generator().generate(&population(), Some(&market));
        let cohort = cohorts
            .iter()
            .find(|c| c.id.as_str() == "defensive_rotation")
            .expect("defensive cohort present");
        assert_eq!(cohort.size, 2);
    }

    #[test]
    fn calm_market_adds_no_market_cohorts() {
        let market = MarketContext::neutral();
        let cohorts = generator().generate(&population(), Some(&market));
        assert!(!cohorts.iter().any(|c| c.id.as_str() == "volatility_responsive"));
        assert!(!cohorts.iter().any(|c| c.id.as_str() == "defensive_rotation"));
    }

    #[test]
    fn behavioral_family_finds_early_readers() {
        let profiles = population();
        let cohorts = generator().generate(&profiles, None);
        let cohort = cohorts
            .iter()
            .find(|c| c.id.as_str() == "early_morning_readers")
            .expect("early readers present");
        // Subscribers 0, 1, 4 are active at hour 7.
        assert_eq!(cohort.size, 3);
    }

    #[test]
    fn content_preferences_derive_from_members() {
        let profiles = population();
        let cohorts = generator().generate(&profiles, None);
        let high = cohorts
            .iter()
            .find(|c| c.id.as_str() == "high_engagement")
            .expect("high engagement present");
        assert_eq!(
            high.content_preferences.preferred_topics.first().map(String::as_str),
            Some("Technology")
        );
        assert!(high.content_preferences.optimal_send_time.is_some());
        assert!(high.content_preferences.preferred_frequency.is_some());
    }

    #[test]
    fn engagement_tiers_do_not_overlap() {
        let profiles = population();
        let cohorts = generator().generate(&profiles, None);
        let tier_sizes: usize = cohorts
            .iter()
            .filter(|c| {
                matches!(
                    c.id.as_str(),
                    "high_engagement" | "moderate_engagement" | "low_engagement"
                )
            })
            .map(|c| c.size)
            .sum();
        assert_eq!(tier_sizes, profiles.len());
    }

    #[test]
    fn generation_is_deterministic_apart_from_timestamps() {
        let profiles = population();
        let a = generator().generate(&profiles, None);
        let b = generator().generate(&profiles, None);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.id, y.id);
            assert_eq!(x.size, y.size);
            assert_eq!(x.criteria, y.criteria);
        }
    }

    #[test]
    fn slugify_sanitizes_names() {
        assert_eq!(slugify("Real Estate"), "real_estate");
        assert_eq!(slugify("Technology"), "technology");
    }
}
