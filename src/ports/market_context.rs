//! Market Context Port - Interface for market snapshot sources.

use async_trait::async_trait;

use crate::domain::market::MarketContext;

/// Port for fetching the current market snapshot.
///
/// Failures here never abort a pipeline; callers degrade to
/// [`MarketContext::neutral`] and record that the output is market-blind.
#[async_trait]
pub trait MarketContextProvider: Send + Sync {
    /// Returns the current market context.
    async fn current_context(&self) -> Result<MarketContext, MarketDataError>;
}

/// Market data source errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MarketDataError {
    /// Data source is unreachable.
    #[error("market data source unavailable: {0}")]
    Unavailable(String),

    /// Data source responded with malformed data.
    #[error("malformed market data: {0}")]
    Malformed(String),

    /// Data is present but too old to use.
    #[error("market data stale: last updated {age_secs}s ago")]
    Stale { age_secs: u64 },
}

impl MarketDataError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}
