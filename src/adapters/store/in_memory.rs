//! In-memory subscriber store.
//!
//! Tenant-scoped map of subscriber records and engagement histories. Used
//! by tests and single-process deployments that load subscribers from an
//! upstream export before running a batch.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::foundation::{SubscriberId, TenantId};
use crate::domain::subscriber::{EngagementHistory, RawSubscriberData};
use crate::ports::{StoreError, SubscriberStore};

type Key = (TenantId, SubscriberId);

/// Thread-safe in-memory implementation of [`SubscriberStore`].
#[derive(Debug, Clone, Default)]
pub struct InMemorySubscriberStore {
    subscribers: Arc<RwLock<HashMap<Key, RawSubscriberData>>>,
    engagement: Arc<RwLock<HashMap<Key, EngagementHistory>>>,
}

impl InMemorySubscriberStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a subscriber record.
    pub fn insert_subscriber(
        &self,
        tenant_id: TenantId,
        subscriber_id: SubscriberId,
        data: RawSubscriberData,
    ) {
        self.subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert((tenant_id, subscriber_id), data);
    }

    /// Inserts or replaces a subscriber's engagement history.
    pub fn insert_engagement(
        &self,
        tenant_id: TenantId,
        subscriber_id: SubscriberId,
        history: EngagementHistory,
    ) {
        self.engagement
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert((tenant_id, subscriber_id), history);
    }

    /// Number of subscribers stored for a tenant.
    pub fn tenant_count(&self, tenant_id: &TenantId) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .filter(|(t, _)| t == tenant_id)
            .count()
    }
}

#[async_trait]
impl SubscriberStore for InMemorySubscriberStore {
    async fn fetch_subscriber(
        &self,
        tenant_id: &TenantId,
        subscriber_id: &SubscriberId,
    ) -> Result<Option<RawSubscriberData>, StoreError> {
        let map = self.subscribers.read().unwrap_or_else(|e| e.into_inner());
        Ok(map
            .get(&(tenant_id.clone(), subscriber_id.clone()))
            .cloned())
    }

    async fn fetch_engagement(
        &self,
        tenant_id: &TenantId,
        subscriber_id: &SubscriberId,
    ) -> Result<EngagementHistory, StoreError> {
        let map = self.engagement.read().unwrap_or_else(|e| e.into_inner());
        Ok(map
            .get(&(tenant_id.clone(), subscriber_id.clone()))
            .cloned()
            .unwrap_or_default())
    }
}
