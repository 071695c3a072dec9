//! Subscriber Store Port - Interface for subscriber and engagement lookups.

use async_trait::async_trait;

use crate::domain::foundation::{SubscriberId, TenantId};
use crate::domain::subscriber::{EngagementHistory, RawSubscriberData};

/// Port for reading subscriber records and engagement events.
///
/// All lookups are tenant-scoped; a subscriber id from one tenant must
/// never resolve to another tenant's record.
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Fetches a subscriber's raw record, or `None` if unknown to the tenant.
    async fn fetch_subscriber(
        &self,
        tenant_id: &TenantId,
        subscriber_id: &SubscriberId,
    ) -> Result<Option<RawSubscriberData>, StoreError>;

    /// Fetches a subscriber's engagement event history. Subscribers with no
    /// recorded events get an empty history, not an error.
    async fn fetch_engagement(
        &self,
        tenant_id: &TenantId,
        subscriber_id: &SubscriberId,
    ) -> Result<EngagementHistory, StoreError>;
}

/// Subscriber store errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Backing store is unreachable.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Stored record failed to deserialize.
    #[error("corrupt record for {subscriber_id}: {message}")]
    CorruptRecord {
        subscriber_id: String,
        message: String,
    },

    /// Query failed for another reason.
    #[error("store query failed: {0}")]
    QueryFailed(String),
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn query_failed(message: impl Into<String>) -> Self {
        Self::QueryFailed(message.into())
    }
}
