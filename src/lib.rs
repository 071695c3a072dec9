//! AudienceCraft - Audience Segmentation & Content Personalization Engine
//!
//! This crate segments newsletter subscribers into rule-matched cohorts and
//! adapts email content per cohort or per individual while preserving the
//! author's writing voice.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
