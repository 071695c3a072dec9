//! Sharpening result types.
//!
//! "Sharpening" is adapting base email content for a cohort or individual
//! while preserving the author's voice. Predicted open/click rates are
//! advisory estimates parsed from free-form provider text; they carry no
//! accuracy guarantee and tests should assert presence and range only.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CohortId, SubscriberId};
use crate::domain::market::MarketContext;

/// Marker included in `preserved_elements` when a per-cohort failure fell
/// back to the unmodified base content.
pub const FALLBACK_PRESERVED_MARKER: &str = "original content";

/// Per-cohort adaptation of one base-content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailSharpening {
    pub cohort_id: CohortId,
    pub subject: String,
    pub content: String,
    pub call_to_action: String,
    /// Why the adaptation reads the way it does.
    pub reasoning: String,
    /// Advisory estimate, 0-1.
    pub predicted_open_rate: f64,
    /// Advisory estimate, 0-1.
    pub predicted_click_rate: f64,
    /// "HH:MM" recommendation.
    pub optimal_send_time: String,
    /// How faithfully the adaptation preserves the extracted voice, 0-1.
    /// Exactly 1.0 for fallbacks: unmodified content is trivially faithful.
    pub voice_consistency_score: f64,
    /// Voice elements the adaptation kept (signature phrases, structure).
    pub preserved_elements: Vec<String>,
    /// True when the provider failed and base content was returned.
    pub fallback: bool,
    pub fallback_reason: Option<String>,
}

impl EmailSharpening {
    /// Builds the fallback result for a cohort whose provider call failed:
    /// the unmodified base content, trivially voice-consistent, explicitly
    /// marked so callers can tell it apart from an adaptation.
    pub fn fallback(
        cohort_id: CohortId,
        base_subject: impl Into<String>,
        base_content: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            cohort_id,
            subject: base_subject.into(),
            content: base_content.into(),
            call_to_action: String::new(),
            reasoning: "provider unavailable; base content returned unchanged".to_string(),
            predicted_open_rate: 0.0,
            predicted_click_rate: 0.0,
            optimal_send_time: "09:00".to_string(),
            voice_consistency_score: 1.0,
            preserved_elements: vec![FALLBACK_PRESERVED_MARKER.to_string()],
            fallback: true,
            fallback_reason: Some(reason.into()),
        }
    }
}

/// Per-subscriber adaptation of one base-content item. Ephemeral: computed
/// per request and optionally logged by the caller, never authoritative
/// state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualPersonalization {
    pub subscriber_id: SubscriberId,
    pub subject: String,
    pub content: String,
    pub call_to_action: String,
    /// "HH:MM" send time computed from the subscriber's active hours.
    pub send_time: String,
    pub reasoning: String,
    /// Confidence in the adaptation, 0-1. Low for fallbacks.
    pub confidence: f64,
    /// Snapshot used during generation, kept for audit.
    pub market_context: MarketContext,
}
