//! Voice-preserving sharpening pipeline.
//!
//! Two stages per base-content item:
//!
//! 1. Voice extraction: one provider call analyzing the base content into a
//!    [`VoiceProfile`]. Always terminates with a profile; any provider or
//!    parse failure yields the documented fallback profile.
//! 2. Per-cohort adaptation: one provider call per target cohort, each with
//!    an archetype-specific prompt embedding the extracted voice and the
//!    optional market snapshot. A failed cohort falls back to the unmodified
//!    base content and never aborts the others.
//!
//! The voice profile is extracted exactly once per item no matter how many
//! cohorts are targeted, so every variant sounds like the same author.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use crate::domain::cohort::CohortDefinition;
use crate::domain::foundation::{DomainError, TenantContext};
use crate::domain::market::MarketContext;
use crate::domain::personalization::{EmailSharpening, VoiceProfile};
use crate::ports::{AiProvider, GenerationRequest};

use super::parser::{parse_sharpening, parse_voice_profile};

const DEFAULT_CONCURRENCY: usize = 10;

/// Cohort archetype, chosen from characteristics, selecting the adaptation
/// template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Archetype {
    Professional,
    Learning,
    Conservative,
    Aggressive,
    General,
}

impl Archetype {
    fn for_cohort(cohort: &CohortDefinition) -> Self {
        if cohort.has_characteristic("Professional") {
            Self::Professional
        } else if cohort.has_characteristic("Beginner-friendly") {
            Self::Learning
        } else if cohort.has_characteristic("Conservative") {
            Self::Conservative
        } else if cohort.has_characteristic("Aggressive") {
            Self::Aggressive
        } else {
            Self::General
        }
    }

    /// Archetype-specific adaptation instructions.
    fn instructions(self) -> &'static str {
        match self {
            Self::Professional => {
                "These readers are professional investors. Assume fluency with \
                 market mechanics, skip definitions, lead with data and \
                 second-order implications. Keep the subject precise rather \
                 than clever."
            }
            Self::Learning => {
                "These readers are still learning. Define terms on first use, \
                 favor one concrete example over three abstract points, and \
                 keep sentences short. An encouraging close outperforms a \
                 hard sell."
            }
            Self::Conservative => {
                "These readers are conservative, capital-preservation-first \
                 investors. Use a formal, cautious register, foreground risk \
                 and downside scenarios, and avoid urgency or hype framing."
            }
            Self::Aggressive => {
                "These readers are aggressive, opportunity-seeking investors. \
                 Lead with the upside case and the catalyst, quantify the \
                 move, and make the call to action direct."
            }
            Self::General => {
                "These readers are a general audience. Keep the original \
                 framing, tighten wording, and make the single most important \
                 takeaway impossible to miss."
            }
        }
    }
}

/// Adapts base newsletter content per cohort while preserving the author's
/// voice.
pub struct ContentSharpener {
    provider: Arc<dyn AiProvider>,
    concurrency_limit: usize,
}

impl ContentSharpener {
    pub fn new(provider: Arc<dyn AiProvider>) -> Self {
        Self {
            provider,
            concurrency_limit: DEFAULT_CONCURRENCY,
        }
    }

    /// Bounds simultaneous per-cohort provider calls.
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit.max(1);
        self
    }

    /// Stage one: analyzes base content into a voice profile.
    ///
    /// Infallible: provider or parse failures produce the fallback profile
    /// so the pipeline always proceeds with *a* voice.
    pub async fn extract_voice(&self, tenant: &TenantContext, base_content: &str) -> VoiceProfile {
        let request = GenerationRequest::new(
            format!(
                "You are an editorial analyst for the newsletter \"{}\". \
                 You extract a writer's voice profile from a sample of \
                 their writing and respond with JSON only.",
                tenant.publication_name
            ),
            format!(
                "Analyze the voice profile of this newsletter issue. Respond \
                 with a JSON object with fields: tone, avg_sentence_length, \
                 technical_density (0-1), reading_level, signature_phrases, \
                 preferred_transitions, paragraph_length (short|medium|long), \
                 list_usage, question_frequency, personality.\n\n{}",
                base_content
            ),
        )
        .with_temperature(0.2);

        match self.provider.generate(request).await {
            Ok(text) => parse_voice_profile(&text).unwrap_or_else(|| {
                warn!(tenant = %tenant.tenant_id, "voice analysis unparseable, using fallback profile");
                VoiceProfile::fallback()
            }),
            Err(err) => {
                warn!(
                    tenant = %tenant.tenant_id,
                    error = %err,
                    "voice analysis failed, using fallback profile"
                );
                VoiceProfile::fallback()
            }
        }
    }

    fn adaptation_request(
        &self,
        tenant: &TenantContext,
        voice: &VoiceProfile,
        cohort: &CohortDefinition,
        base_subject: &str,
        base_content: &str,
        market: Option<&MarketContext>,
    ) -> GenerationRequest {
        let archetype = Archetype::for_cohort(cohort);

        let mut user_prompt = format!(
            "Adapt this newsletter issue for the \"{}\" cohort ({} members).\n\
             Cohort traits: {}.\n{}\n\n\
             Voice to preserve: {}.\n",
            cohort.name,
            cohort.size,
            cohort.characteristics.join(", "),
            archetype.instructions(),
            voice.prompt_summary(),
        );

        if let Some(market) = market {
            user_prompt.push_str(&format!(
                "\nMarket context: volatility index {:.1}, sentiment {:?}. \
                 Weave it in only where it sharpens the point.\n",
                market.volatility_index, market.sentiment
            ));
        }

        user_prompt.push_str(&format!(
            "\nRespond with a JSON object with fields: subject, content, \
             call_to_action, reasoning, predicted_open_rate, \
             predicted_click_rate, optimal_send_time (HH:MM), \
             voice_consistency_score (0-1), preserved_elements.\n\n\
             Subject: {}\n\nContent:\n{}",
            base_subject, base_content
        ));

        GenerationRequest::new(
            format!(
                "You are the sharpening editor for the newsletter \"{}\". \
                 You rewrite issues for specific audience cohorts without \
                 losing the author's voice. Respond with JSON only.",
                tenant.publication_name
            ),
            user_prompt,
        )
    }

    /// Stage two for a single cohort. Infallible: any provider or parse
    /// failure yields the fallback result carrying the unmodified base
    /// content.
    pub async fn sharpen_one(
        &self,
        tenant: &TenantContext,
        voice: &VoiceProfile,
        cohort: &CohortDefinition,
        base_subject: &str,
        base_content: &str,
        market: Option<&MarketContext>,
    ) -> EmailSharpening {
        let request =
            self.adaptation_request(tenant, voice, cohort, base_subject, base_content, market);

        match self.provider.generate(request).await {
            Ok(text) => {
                match parse_sharpening(&text, cohort.id.clone(), base_subject) {
                    Some(result) => result,
                    None => {
                        warn!(
                            tenant = %tenant.tenant_id,
                            cohort = %cohort.id,
                            "adaptation response unparseable, returning base content"
                        );
                        EmailSharpening::fallback(
                            cohort.id.clone(),
                            base_subject,
                            base_content,
                            "unparseable provider response",
                        )
                    }
                }
            }
            Err(err) => {
                warn!(
                    tenant = %tenant.tenant_id,
                    cohort = %cohort.id,
                    error = %err,
                    "adaptation call failed, returning base content"
                );
                EmailSharpening::fallback(
                    cohort.id.clone(),
                    base_subject,
                    base_content,
                    err.to_string(),
                )
            }
        }
    }

    /// Runs the full pipeline: one voice extraction, then bounded fan-out
    /// over the target cohorts. Returns exactly one result per cohort, in
    /// input order.
    ///
    /// # Errors
    ///
    /// `EmptyField` for empty subject or content. Provider failures never
    /// surface here; they show up as fallback-marked results.
    pub async fn sharpen(
        &self,
        tenant: &TenantContext,
        base_subject: &str,
        base_content: &str,
        cohorts: &[CohortDefinition],
        market: Option<&MarketContext>,
    ) -> Result<Vec<EmailSharpening>, DomainError> {
        if base_subject.trim().is_empty() {
            return Err(DomainError::empty_field("base_subject"));
        }
        if base_content.trim().is_empty() {
            return Err(DomainError::empty_field("base_content"));
        }

        let voice = self.extract_voice(tenant, base_content).await;

        let mut results = Vec::with_capacity(cohorts.len());
        for batch in cohorts.chunks(self.concurrency_limit) {
            let futures = batch.iter().map(|cohort| {
                self.sharpen_one(tenant, &voice, cohort, base_subject, base_content, market)
            });
            results.extend(join_all(futures).await);
        }

        let fallbacks = results.iter().filter(|r| r.fallback).count();
        info!(
            tenant = %tenant.tenant_id,
            cohorts = cohorts.len(),
            fallbacks,
            "sharpening pipeline complete"
        );

        Ok(results)
    }
}
