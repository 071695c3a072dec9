//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors, tenant context)
//! - `subscriber` - Subscriber profiles, raw records, engagement history, profile builder
//! - `cohort` - Cohort criteria, definitions, and the six-family generator
//! - `prediction` - Pure churn/lifetime-value/cadence/topic predictions
//! - `personalization` - Rule engine, voice profiles, and sharpening result types
//! - `market` - Market context snapshot consumed from the market-data port

pub mod cohort;
pub mod foundation;
pub mod market;
pub mod personalization;
pub mod prediction;
pub mod subscriber;
