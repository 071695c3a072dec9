//! Static market context adapters.
//!
//! `StaticMarketProvider` serves a fixed snapshot, useful for tests and for
//! deployments that push market data in from an external scheduler.
//! `FailingMarketProvider` always errors, for exercising degradation paths.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::domain::market::MarketContext;
use crate::ports::{MarketContextProvider, MarketDataError};

/// Serves a fixed, swappable market snapshot.
#[derive(Debug, Clone)]
pub struct StaticMarketProvider {
    context: Arc<Mutex<MarketContext>>,
}

impl StaticMarketProvider {
    /// Creates a provider serving the given snapshot.
    pub fn new(context: MarketContext) -> Self {
        Self {
            context: Arc::new(Mutex::new(context)),
        }
    }

    /// Creates a provider serving a neutral snapshot.
    pub fn neutral() -> Self {
        Self::new(MarketContext::neutral())
    }

    /// Replaces the served snapshot.
    pub fn set_context(&self, context: MarketContext) {
        *self.context.lock().unwrap() = context;
    }
}

#[async_trait]
impl MarketContextProvider for StaticMarketProvider {
    async fn current_context(&self) -> Result<MarketContext, MarketDataError> {
        Ok(self.context.lock().unwrap().clone())
    }
}

/// Always fails, for testing market-blind degradation.
#[derive(Debug, Clone, Default)]
pub struct FailingMarketProvider;

#[async_trait]
impl MarketContextProvider for FailingMarketProvider {
    async fn current_context(&self) -> Result<MarketContext, MarketDataError> {
        Err(MarketDataError::unavailable("market feed offline"))
    }
}
