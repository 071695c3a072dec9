//! Rule-based cohort generation.
//!
//! Cohort assignment is deterministic predicate matching, not statistical
//! clustering; the design trades sophistication for explainability. Every
//! cohort can answer "why is this subscriber here" by pointing at its
//! criteria.

mod config;
mod criteria;
mod definition;
mod generator;

pub use config::SegmentationConfig;
pub use criteria::{CohortCriteria, EngagementRange};
pub use definition::{CohortContentPreferences, CohortDefinition, EngagementAverages};
pub use generator::CohortGenerator;
