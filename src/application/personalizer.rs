//! Per-subscriber personalization.
//!
//! Unlike cohort sharpening, this path starts from a single subscriber id:
//! profile resolution can fail with `SubscriberNotFound`, which propagates.
//! Everything downstream of identity resolution degrades instead of
//! failing: a dead market feed becomes the neutral context, a dead AI
//! provider becomes the base content at low confidence.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::foundation::{DomainError, SubscriberId, TenantContext};
use crate::domain::market::MarketContext;
use crate::domain::personalization::IndividualPersonalization;
use crate::domain::prediction::{self, PredictionConfig};
use crate::domain::subscriber::SubscriberProfile;
use crate::ports::{AiProvider, GenerationRequest, MarketContextProvider};

use super::parser::parse_individual;
use super::profile_service::ProfileService;

/// Confidence reported when the provider failed and base content was
/// returned unchanged.
const FALLBACK_CONFIDENCE: f64 = 0.3;

/// Adapts one base-content item for one subscriber.
pub struct IndividualPersonalizer {
    profiles: Arc<ProfileService>,
    provider: Arc<dyn AiProvider>,
    market: Arc<dyn MarketContextProvider>,
    prediction: PredictionConfig,
}

impl IndividualPersonalizer {
    pub fn new(
        profiles: Arc<ProfileService>,
        provider: Arc<dyn AiProvider>,
        market: Arc<dyn MarketContextProvider>,
        prediction: PredictionConfig,
    ) -> Self {
        Self {
            profiles,
            provider,
            market,
            prediction,
        }
    }

    /// Personalizes base content for one subscriber.
    ///
    /// # Errors
    ///
    /// `EmptyField` for empty subject/content and `SubscriberNotFound` for
    /// unknown ids. Market and AI provider failures degrade, they never
    /// propagate.
    pub async fn personalize(
        &self,
        tenant: &TenantContext,
        subscriber_id: &SubscriberId,
        base_subject: &str,
        base_content: &str,
    ) -> Result<IndividualPersonalization, DomainError> {
        if base_subject.trim().is_empty() {
            return Err(DomainError::empty_field("base_subject"));
        }
        if base_content.trim().is_empty() {
            return Err(DomainError::empty_field("base_content"));
        }

        let profile = self.profiles.build(tenant, subscriber_id).await?;

        let market = match self.market.current_context().await {
            Ok(context) => context,
            Err(err) => {
                warn!(
                    tenant = %tenant.tenant_id,
                    error = %err,
                    "market context unavailable, using neutral snapshot"
                );
                MarketContext::neutral()
            }
        };

        let request = self.prompt(tenant, &profile, &market, base_subject, base_content);
        let send_time = preferred_send_time(&profile);

        let result = match self.provider.generate(request).await {
            Ok(text) => parse_individual(&text).map(|draft| IndividualPersonalization {
                subscriber_id: subscriber_id.clone(),
                subject: draft
                    .subject
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| base_subject.to_string()),
                content: draft.content,
                call_to_action: draft.call_to_action.unwrap_or_default(),
                send_time: draft.send_time.unwrap_or_else(|| send_time.clone()),
                reasoning: draft.reasoning.unwrap_or_default(),
                confidence: draft.confidence.map(|c| c.clamp(0.0, 1.0)).unwrap_or(0.7),
                market_context: market.clone(),
            }),
            Err(err) => {
                warn!(
                    tenant = %tenant.tenant_id,
                    subscriber = %subscriber_id,
                    error = %err,
                    "personalization call failed, returning base content"
                );
                None
            }
        };

        let result = result.unwrap_or_else(|| IndividualPersonalization {
            subscriber_id: subscriber_id.clone(),
            subject: base_subject.to_string(),
            content: base_content.to_string(),
            call_to_action: String::new(),
            send_time,
            reasoning: "provider unavailable; base content returned unchanged".to_string(),
            confidence: FALLBACK_CONFIDENCE,
            market_context: market,
        });

        debug!(
            tenant = %tenant.tenant_id,
            subscriber = %subscriber_id,
            confidence = result.confidence,
            "personalization complete"
        );

        Ok(result)
    }

    fn prompt(
        &self,
        tenant: &TenantContext,
        profile: &SubscriberProfile,
        market: &MarketContext,
        base_subject: &str,
        base_content: &str,
    ) -> GenerationRequest {
        let predictions = prediction::predict(profile, None, &self.prediction);

        GenerationRequest::new(
            format!(
                "You are the personalization editor for the newsletter \"{}\". \
                 You adapt one issue for one specific reader. Respond with \
                 JSON only.",
                tenant.publication_name
            ),
            format!(
                "Reader profile: {:?} risk tolerance, {:?} experience, \
                 engagement score {:.0}, interested in [{}], prefers {} \
                 communication.\n\
                 Suggested topics for this reader: {}.\n\
                 Market context: volatility index {:.1}, sentiment {:?}.\n\n\
                 Respond with a JSON object with fields: subject, content, \
                 call_to_action, reasoning, send_time (HH:MM), confidence \
                 (0-1).\n\n\
                 Subject: {}\n\nContent:\n{}",
                profile.risk_tolerance,
                profile.experience_level,
                profile.behavior.engagement_score,
                profile.interests.sectors.join(", "),
                profile.prefs.communication_style.as_str(),
                predictions.recommended_topics.join(", "),
                market.volatility_index,
                market.sentiment,
                base_subject,
                base_content,
            ),
        )
    }
}

/// "HH:MM" send time from the subscriber's earliest active hour, defaulting
/// to 09:00 when no activity is recorded.
fn preferred_send_time(profile: &SubscriberProfile) -> String {
    profile
        .behavior
        .active_hours
        .iter()
        .next()
        .map(|hour| format!("{:02}:00", hour))
        .unwrap_or_else(|| "09:00".to_string())
}
