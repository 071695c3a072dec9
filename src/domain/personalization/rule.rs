//! Personalization rule derivation and priority resolution.
//!
//! Rules are derived from a cohort's characteristic tags and content
//! preferences through a fixed, total mapping: unrecognized characteristics
//! simply contribute no rule, so derivation never fails. Rule ids are
//! name-based UUIDs over (cohort, type, action), which makes repeated
//! derivation byte-for-byte identical.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::cohort::CohortDefinition;
use crate::domain::foundation::{CohortId, RuleId};

/// What aspect of a send the rule controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    SubjectLine,
    ContentTone,
    Cta,
    SendTime,
    Frequency,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::SubjectLine => "subject_line",
            RuleType::ContentTone => "content_tone",
            RuleType::Cta => "cta",
            RuleType::SendTime => "send_time",
            RuleType::Frequency => "frequency",
        }
    }
}

/// One derived personalization rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalizationRule {
    pub id: RuleId,
    pub cohort_id: CohortId,
    pub rule_type: RuleType,
    /// Human-readable trigger description, kept for audit.
    pub condition: String,
    /// Instruction applied when the rule wins for its type.
    pub action: String,
    /// Higher wins on conflict within the same type.
    pub priority: u32,
    pub active: bool,
}

impl PersonalizationRule {
    fn derived(
        cohort_id: &CohortId,
        rule_type: RuleType,
        condition: impl Into<String>,
        action: impl Into<String>,
        priority: u32,
    ) -> Self {
        let action = action.into();
        let id = RuleId::from_uuid(Uuid::new_v5(
            &Uuid::NAMESPACE_OID,
            format!("{}:{}:{}", cohort_id, rule_type.as_str(), action).as_bytes(),
        ));
        Self {
            id,
            cohort_id: cohort_id.clone(),
            rule_type,
            condition: condition.into(),
            action,
            priority,
            active: true,
        }
    }
}

/// Fixed characteristic-tag to rule mappings.
///
/// Priorities: explicit content preferences (90) beat characteristic-derived
/// rules (40-80) so aggregated member data wins over archetype defaults.
const CHARACTERISTIC_RULES: &[(&str, RuleType, &str, u32)] = &[
    (
        "High engagement",
        RuleType::SubjectLine,
        "use curiosity-driven subject lines",
        80,
    ),
    (
        "Low engagement",
        RuleType::SubjectLine,
        "lead with a direct value proposition in the subject",
        80,
    ),
    (
        "Low engagement",
        RuleType::Frequency,
        "reduce send frequency until engagement recovers",
        70,
    ),
    (
        "Conservative",
        RuleType::ContentTone,
        "formal, cautious tone emphasizing capital preservation",
        70,
    ),
    (
        "Aggressive",
        RuleType::ContentTone,
        "energetic tone highlighting conviction and opportunity",
        70,
    ),
    (
        "Aggressive",
        RuleType::Cta,
        "action-oriented call to action with a clear next step",
        60,
    ),
    (
        "Beginner-friendly",
        RuleType::ContentTone,
        "plain-language explanations, define every term",
        65,
    ),
    (
        "Professional",
        RuleType::ContentTone,
        "technical, data-dense tone without hand-holding",
        65,
    ),
    (
        "Early morning readers",
        RuleType::SendTime,
        "deliver before the market opens",
        50,
    ),
    (
        "Deep readers",
        RuleType::Cta,
        "link to the long-form analysis",
        40,
    ),
    (
        "Re-engagement candidates",
        RuleType::Cta,
        "single prominent re-engagement call to action",
        50,
    ),
];

/// Derives the full rule set for a cohort. Total and deterministic.
pub fn derive_rules(cohort: &CohortDefinition) -> Vec<PersonalizationRule> {
    let mut rules = Vec::new();

    for (tag, rule_type, action, priority) in CHARACTERISTIC_RULES {
        if cohort.has_characteristic(tag) {
            rules.push(PersonalizationRule::derived(
                &cohort.id,
                *rule_type,
                format!("cohort has characteristic '{}'", tag),
                *action,
                *priority,
            ));
        }
    }

    if let Some(ref send_time) = cohort.content_preferences.optimal_send_time {
        rules.push(PersonalizationRule::derived(
            &cohort.id,
            RuleType::SendTime,
            "cohort has an aggregated optimal send time",
            format!("send at {}", send_time),
            90,
        ));
    }

    if let Some(frequency) = cohort.content_preferences.preferred_frequency {
        rules.push(PersonalizationRule::derived(
            &cohort.id,
            RuleType::Frequency,
            "cohort has an aggregated preferred frequency",
            format!("send {}", frequency.as_str()),
            90,
        ));
    }

    rules
}

/// Resolves conflicts: for each rule type, the highest-priority active rule
/// is authoritative. Losing rules are retained by the caller for audit but
/// are not applied.
pub fn authoritative_rules(rules: &[PersonalizationRule]) -> Vec<PersonalizationRule> {
    let order = [
        RuleType::SubjectLine,
        RuleType::ContentTone,
        RuleType::Cta,
        RuleType::SendTime,
        RuleType::Frequency,
    ];

    order
        .iter()
        .filter_map(|rule_type| {
            rules
                .iter()
                .filter(|r| r.active && r.rule_type == *rule_type)
                .max_by_key(|r| r.priority)
                .cloned()
        })
        .collect()
}
