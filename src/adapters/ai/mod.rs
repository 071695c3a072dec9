//! AI provider adapters.

mod http_provider;
mod mock_provider;

pub use http_provider::HttpAiProvider;
pub use mock_provider::{MockAiProvider, MockError, MockResponse};
