//! Market context snapshot used to make adapted content timely.
//!
//! The snapshot is read-only input: it is fetched through the
//! `MarketContextProvider` port before sharpening or prediction and embedded
//! unchanged in per-individual results for audit.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Overall market sentiment classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Bullish,
    Neutral,
    Bearish,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Bullish => "bullish",
            Sentiment::Neutral => "neutral",
            Sentiment::Bearish => "bearish",
        }
    }
}

impl Default for Sentiment {
    fn default() -> Self {
        Self::Neutral
    }
}

/// Snapshot of external market conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    /// Volatility index reading (VIX-style, typically 10-40).
    pub volatility_index: f64,
    /// Recent performance per sector, as fractional change.
    pub sector_performance: BTreeMap<String, f64>,
    /// Overall sentiment classification.
    pub sentiment: Sentiment,
    /// Headlines relevant to the requested sectors.
    pub relevant_news: Vec<String>,
}

impl MarketContext {
    /// A calm, neutral snapshot used when the market-data provider is
    /// unavailable. Personalization degrades to this rather than failing.
    pub fn neutral() -> Self {
        Self {
            volatility_index: 15.0,
            sector_performance: BTreeMap::new(),
            sentiment: Sentiment::Neutral,
            relevant_news: Vec::new(),
        }
    }

    /// True when volatility is elevated enough to warrant market-responsive
    /// cohorts (threshold supplied by segmentation config).
    pub fn is_volatile(&self, threshold: f64) -> bool {
        self.volatility_index > threshold
    }
}

impl Default for MarketContext {
    fn default() -> Self {
        Self::neutral()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_context_is_calm() {
        let ctx = MarketContext::neutral();
        assert_eq!(ctx.sentiment, Sentiment::Neutral);
        assert!(!ctx.is_volatile(25.0));
        assert!(ctx.relevant_news.is_empty());
    }

    #[test]
    fn volatility_check_uses_threshold() {
        let mut ctx = MarketContext::neutral();
        ctx.volatility_index = 30.0;
        assert!(ctx.is_volatile(25.0));
        assert!(!ctx.is_volatile(35.0));
    }

    #[test]
    fn sentiment_serializes_snake_case() {
        let json = serde_json::to_string(&Sentiment::Bearish).unwrap();
        assert_eq!(json, "\"bearish\"");
    }
}
