//! Application layer - services composing the domain with the ports.
//!
//! Services hold `Arc<dyn Port>` dependencies and are stateless across
//! requests; tenancy arrives as an explicit `TenantContext` argument on
//! every call.

mod cohort_service;
mod orchestrator;
mod parser;
mod personalizer;
mod profile_service;
mod sharpener;

pub use cohort_service::CohortService;
pub use orchestrator::{BatchError, BatchOrchestrator, BatchOutcome};
pub use personalizer::IndividualPersonalizer;
pub use profile_service::ProfileService;
pub use sharpener::ContentSharpener;
