//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, error types, and the tenant and
//! cancellation primitives that form the vocabulary of the engine.

mod cancel;
mod errors;
mod ids;
mod tenant;
mod timestamp;

pub use cancel::CancelFlag;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{CohortId, RuleId, SubscriberId, TenantId};
pub use tenant::TenantContext;
pub use timestamp::Timestamp;
