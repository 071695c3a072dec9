//! Parsing of structured AI responses.
//!
//! Providers are asked for JSON but only ever promise text, so parsing is
//! JSON-first with lenient extraction (code fences and surrounding prose
//! tolerated) and regex fallbacks for the advisory rate estimates. Every
//! function here returns `Option`; the caller owns the fallback.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::domain::foundation::CohortId;
use crate::domain::personalization::{EmailSharpening, ParagraphLength, VoiceProfile};

static OPEN_RATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)open[_\s]?rate\D{0,10}?([0-9]*\.?[0-9]+)").expect("valid regex")
});

static CLICK_RATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)click[_\s]?rate\D{0,10}?([0-9]*\.?[0-9]+)").expect("valid regex")
});

/// Extracts the outermost JSON object from provider text.
pub(crate) fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Normalizes a rate that may arrive as a fraction (0.45) or a percentage
/// (45), clamping to [0, 1].
fn normalize_rate(value: f64) -> f64 {
    let fraction = if value > 1.0 { value / 100.0 } else { value };
    fraction.clamp(0.0, 1.0)
}

/// Last-resort rate extraction from free-form text.
fn rate_from_text(text: &str, re: &Regex) -> Option<f64> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(normalize_rate)
}

#[derive(Debug, Default, Deserialize)]
struct VoiceDraft {
    #[serde(default)]
    tone: Option<String>,
    #[serde(default)]
    avg_sentence_length: Option<f64>,
    #[serde(default)]
    technical_density: Option<f64>,
    #[serde(default)]
    reading_level: Option<String>,
    #[serde(default)]
    signature_phrases: Vec<String>,
    #[serde(default)]
    preferred_transitions: Vec<String>,
    #[serde(default)]
    paragraph_length: Option<ParagraphLength>,
    #[serde(default)]
    list_usage: Option<u32>,
    #[serde(default)]
    question_frequency: Option<f64>,
    #[serde(default)]
    personality: Option<String>,
}

/// Parses a voice-analysis response. Missing fields take the documented
/// fallback values; a response with no JSON at all is `None`.
pub(crate) fn parse_voice_profile(text: &str) -> Option<VoiceProfile> {
    let draft: VoiceDraft = serde_json::from_str(extract_json(text)?).ok()?;
    let fallback = VoiceProfile::fallback();

    Some(VoiceProfile {
        tone: draft.tone.unwrap_or(fallback.tone),
        avg_sentence_length: draft
            .avg_sentence_length
            .unwrap_or(fallback.avg_sentence_length)
            .max(1.0),
        technical_density: draft
            .technical_density
            .unwrap_or(fallback.technical_density)
            .clamp(0.0, 1.0),
        reading_level: draft.reading_level.unwrap_or(fallback.reading_level),
        signature_phrases: draft.signature_phrases,
        preferred_transitions: draft.preferred_transitions,
        paragraph_length: draft.paragraph_length.unwrap_or_default(),
        list_usage: draft.list_usage.unwrap_or(fallback.list_usage),
        question_frequency: draft
            .question_frequency
            .unwrap_or(fallback.question_frequency)
            .max(0.0),
        personality: draft.personality.unwrap_or(fallback.personality),
    })
}

#[derive(Debug, Deserialize)]
struct SharpeningDraft {
    #[serde(default)]
    subject: Option<String>,
    content: String,
    #[serde(default, alias = "cta")]
    call_to_action: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    predicted_open_rate: Option<f64>,
    #[serde(default)]
    predicted_click_rate: Option<f64>,
    #[serde(default)]
    optimal_send_time: Option<String>,
    #[serde(default)]
    voice_consistency_score: Option<f64>,
    #[serde(default)]
    preserved_elements: Vec<String>,
}

/// Parses a cohort-adaptation response into [`EmailSharpening`].
///
/// `content` is the one hard requirement; everything else defaults.
/// Predicted rates are advisory: taken from the JSON when present, scraped
/// from the surrounding text otherwise, defaulted as a last resort.
pub(crate) fn parse_sharpening(
    text: &str,
    cohort_id: CohortId,
    base_subject: &str,
) -> Option<EmailSharpening> {
    let draft: SharpeningDraft = serde_json::from_str(extract_json(text)?).ok()?;
    if draft.content.trim().is_empty() {
        return None;
    }

    let predicted_open_rate = draft
        .predicted_open_rate
        .map(normalize_rate)
        .or_else(|| rate_from_text(text, &OPEN_RATE_RE))
        .unwrap_or(0.25);
    let predicted_click_rate = draft
        .predicted_click_rate
        .map(normalize_rate)
        .or_else(|| rate_from_text(text, &CLICK_RATE_RE))
        .unwrap_or(0.05);

    Some(EmailSharpening {
        cohort_id,
        subject: draft
            .subject
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| base_subject.to_string()),
        content: draft.content,
        call_to_action: draft.call_to_action.unwrap_or_default(),
        reasoning: draft.reasoning.unwrap_or_default(),
        predicted_open_rate,
        predicted_click_rate,
        optimal_send_time: draft
            .optimal_send_time
            .unwrap_or_else(|| "09:00".to_string()),
        voice_consistency_score: draft
            .voice_consistency_score
            .map(normalize_rate)
            .unwrap_or(0.8),
        preserved_elements: draft.preserved_elements,
        fallback: false,
        fallback_reason: None,
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct IndividualDraft {
    #[serde(default)]
    pub subject: Option<String>,
    pub content: String,
    #[serde(default, alias = "cta")]
    pub call_to_action: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub send_time: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Parses a per-subscriber adaptation response.
pub(crate) fn parse_individual(text: &str) -> Option<IndividualDraft> {
    let draft: IndividualDraft = serde_json::from_str(extract_json(text)?).ok()?;
    (!draft.content.trim().is_empty()).then_some(draft)
}
