//! Ports - Interfaces between the application layer and the outside world.
//!
//! Each port is an async trait implemented by one or more adapters. The
//! application layer depends only on these traits, never on concrete
//! adapter types.

pub mod ai_provider;
pub mod market_context;
pub mod subscriber_store;

pub use ai_provider::{AiError, AiProvider, GenerationRequest, ProviderInfo};
pub use market_context::{MarketContextProvider, MarketDataError};
pub use subscriber_store::{StoreError, SubscriberStore};
