//! Subscriber profiles and the pure profile builder.

mod builder;
mod engagement;
mod profile;

pub use builder::build_profile;
pub use engagement::{EngagementHistory, RawSubscriberData};
pub use profile::{
    BehaviorMetrics, CommunicationStyle, ContentDepth, DerivedScores, ExperienceLevel, Interests,
    PersonalizationPrefs, RiskTolerance, SubscriberProfile, TimeHorizon, VisualPreference,
};
