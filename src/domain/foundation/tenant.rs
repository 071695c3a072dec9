//! Tenant context threaded explicitly through application calls.
//!
//! The engine is stateless across requests: services never hold a tenant in
//! instance state. Every application call takes a `TenantContext` parameter
//! so the same service instance is safe to share across concurrent requests
//! for different publishers.

use serde::{Deserialize, Serialize};

use super::{TenantId, ValidationError};

/// Identifies which publisher a request is being served for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantContext {
    /// Tenant identifier (publisher account).
    pub tenant_id: TenantId,
    /// Publication name, used in prompts so adapted copy can reference the
    /// newsletter by name.
    pub publication_name: String,
}

impl TenantContext {
    /// Creates a new tenant context.
    pub fn new(
        tenant_id: TenantId,
        publication_name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let publication_name = publication_name.into();
        if publication_name.trim().is_empty() {
            return Err(ValidationError::empty_field("publication_name"));
        }
        Ok(Self {
            tenant_id,
            publication_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_context_requires_publication_name() {
        let id = TenantId::new("pub-1").unwrap();
        assert!(TenantContext::new(id.clone(), "").is_err());
        let ctx = TenantContext::new(id, "Market Brief Weekly").unwrap();
        assert_eq!(ctx.publication_name, "Market Brief Weekly");
    }
}
