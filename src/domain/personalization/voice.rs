//! Voice profiles: a structured fingerprint of an author's writing.
//!
//! Extracted once per base-content item and reused across every cohort
//! adaptation of that item, so all variants of one issue sound like the
//! same person wrote them.

use serde::{Deserialize, Serialize};

/// Paragraph length classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphLength {
    Short,
    Medium,
    Long,
}

impl Default for ParagraphLength {
    fn default() -> Self {
        Self::Medium
    }
}

/// Structured fingerprint of a writer's tone, complexity, and vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    /// Tone category ("analytical", "warm", "urgent", ...).
    pub tone: String,
    /// Average sentence length in words.
    pub avg_sentence_length: f64,
    /// Fraction of words that are domain-technical terms, 0-1.
    pub technical_density: f64,
    /// Reading level label ("general", "college", "professional").
    pub reading_level: String,
    /// Phrases the author reaches for repeatedly.
    pub signature_phrases: Vec<String>,
    /// Transitions the author prefers ("that said", "zooming out").
    pub preferred_transitions: Vec<String>,
    pub paragraph_length: ParagraphLength,
    /// Bulleted/numbered lists per item.
    pub list_usage: u32,
    /// Questions per hundred sentences.
    pub question_frequency: f64,
    /// Personality label ("measured guide", "contrarian", ...).
    pub personality: String,
}

impl VoiceProfile {
    /// The documented fallback profile used when the provider cannot
    /// analyze the content. Deliberately middle-of-the-road: applying it
    /// leaves copy unchanged in character.
    pub fn fallback() -> Self {
        Self {
            tone: "balanced".to_string(),
            avg_sentence_length: 16.0,
            technical_density: 0.2,
            reading_level: "general".to_string(),
            signature_phrases: Vec::new(),
            preferred_transitions: Vec::new(),
            paragraph_length: ParagraphLength::Medium,
            list_usage: 0,
            question_frequency: 5.0,
            personality: "measured guide".to_string(),
        }
    }

    /// Compact single-line description embedded in adaptation prompts.
    pub fn prompt_summary(&self) -> String {
        let mut summary = format!(
            "tone: {}; personality: {}; avg sentence length: {:.0} words; \
             technical density: {:.0}%; reading level: {}; paragraphs: {:?}",
            self.tone,
            self.personality,
            self.avg_sentence_length,
            self.technical_density * 100.0,
            self.reading_level,
            self.paragraph_length,
        );
        if !self.signature_phrases.is_empty() {
            summary.push_str(&format!(
                "; signature phrases: {}",
                self.signature_phrases.join(", ")
            ));
        }
        if !self.preferred_transitions.is_empty() {
            summary.push_str(&format!(
                "; preferred transitions: {}",
                self.preferred_transitions.join(", ")
            ));
        }
        summary
    }
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self::fallback()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_neutral() {
        let voice = VoiceProfile::fallback();
        assert_eq!(voice.tone, "balanced");
        assert_eq!(voice.paragraph_length, ParagraphLength::Medium);
        assert!(voice.signature_phrases.is_empty());
    }

    #[test]
    fn prompt_summary_includes_phrases_when_present() {
        let mut voice = VoiceProfile::fallback();
        assert!(!voice.prompt_summary().contains("signature phrases"));

        voice.signature_phrases = vec!["zooming out".to_string()];
        let summary = voice.prompt_summary();
        assert!(summary.contains("signature phrases: zooming out"));
        assert!(summary.contains("tone: balanced"));
    }

    #[test]
    fn serializes_round_trip() {
        let voice = VoiceProfile::fallback();
        let json = serde_json::to_string(&voice).unwrap();
        let back: VoiceProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(voice, back);
    }
}
