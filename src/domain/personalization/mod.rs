//! Personalization rules, voice profiles, and sharpening result types.

mod rule;
mod sharpening;
mod voice;

pub use rule::{authoritative_rules, derive_rules, PersonalizationRule, RuleType};
pub use sharpening::{EmailSharpening, IndividualPersonalization, FALLBACK_PRESERVED_MARKER};
pub use voice::{ParagraphLength, VoiceProfile};
