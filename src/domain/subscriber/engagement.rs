//! Raw subscriber records and engagement history as loaded by callers.
//!
//! These are the inputs to the profile builder. Every field beyond the email
//! address is optional: the platform's subscriber records accumulate
//! attributes over time and the builder substitutes deterministic defaults
//! for anything missing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::profile::{
    CommunicationStyle, ContentDepth, ExperienceLevel, RiskTolerance, TimeHorizon,
    VisualPreference,
};
use crate::domain::foundation::Timestamp;

/// Raw subscriber record from the platform's store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSubscriberData {
    pub email: String,
    pub risk_tolerance: Option<RiskTolerance>,
    pub experience_level: Option<ExperienceLevel>,
    pub portfolio_size: Option<f64>,
    pub time_horizon: Option<TimeHorizon>,
    pub sectors: Vec<String>,
    pub asset_classes: Vec<String>,
    pub communication_style: Option<CommunicationStyle>,
    pub content_depth: Option<ContentDepth>,
    pub visual_preference: Option<VisualPreference>,
}

impl RawSubscriberData {
    /// Minimal record with only an email address.
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }
}

/// Engagement counters accumulated for one subscriber.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngagementHistory {
    /// Emails delivered.
    pub sends: u32,
    /// Emails opened.
    pub opens: u32,
    /// Emails with at least one click.
    pub clicks: u32,
    /// Total recorded reading time across opens, seconds.
    pub total_reading_secs: u64,
    /// Hours of day in which opens were recorded.
    pub active_hours: BTreeSet<u8>,
    /// Most recent open or click, if any.
    pub last_active: Option<Timestamp>,
    /// Subscribers referred through this subscriber's share links.
    pub referrals: u32,
}

impl EngagementHistory {
    /// Fraction of sends opened; 0 when nothing was sent.
    pub fn open_rate(&self) -> f64 {
        if self.sends == 0 {
            0.0
        } else {
            f64::from(self.opens) / f64::from(self.sends)
        }
    }

    /// Fraction of sends clicked; 0 when nothing was sent.
    pub fn click_rate(&self) -> f64 {
        if self.sends == 0 {
            0.0
        } else {
            f64::from(self.clicks) / f64::from(self.sends)
        }
    }

    /// Average reading seconds per open; 0 when nothing was opened.
    pub fn avg_reading_secs(&self) -> f64 {
        if self.opens == 0 {
            0.0
        } else {
            self.total_reading_secs as f64 / f64::from(self.opens)
        }
    }

    /// Whole days since last activity relative to `now`; 0 when no activity
    /// has been recorded (a fresh subscriber is not treated as lapsed).
    pub fn days_since_active(&self, now: &Timestamp) -> u32 {
        self.last_active
            .map(|t| now.days_since(&t).max(0) as u32)
            .unwrap_or(0)
    }
}
