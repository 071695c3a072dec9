//! Profile service - resolves subscriber ids into complete profiles.
//!
//! Thin orchestration over the pure profile builder: store lookups happen
//! here, and the derived churn/lifetime-value scores get filled in from the
//! prediction module so domain construction stays configuration-free.

use std::sync::Arc;

use tracing::debug;

use crate::domain::foundation::{DomainError, ErrorCode, SubscriberId, TenantContext, Timestamp};
use crate::domain::prediction::{self, PredictionConfig, Predictions};
use crate::domain::subscriber::{build_profile, DerivedScores, SubscriberProfile};
use crate::ports::{StoreError, SubscriberStore};

/// Builds subscriber profiles from stored records.
pub struct ProfileService {
    store: Arc<dyn SubscriberStore>,
    prediction: PredictionConfig,
}

impl ProfileService {
    pub fn new(store: Arc<dyn SubscriberStore>, prediction: PredictionConfig) -> Self {
        Self { store, prediction }
    }

    /// Resolves a subscriber id into a complete profile with derived scores.
    ///
    /// # Errors
    ///
    /// `SubscriberNotFound` for ids unknown to the tenant; `StoreError` when
    /// the backing store fails. Missing optional fields never error, they
    /// take deterministic defaults.
    pub async fn build(
        &self,
        tenant: &TenantContext,
        subscriber_id: &SubscriberId,
    ) -> Result<SubscriberProfile, DomainError> {
        let raw = self
            .store
            .fetch_subscriber(&tenant.tenant_id, subscriber_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| DomainError::subscriber_not_found(subscriber_id))?;

        let history = self
            .store
            .fetch_engagement(&tenant.tenant_id, subscriber_id)
            .await
            .map_err(store_error)?;

        let profile = build_profile(subscriber_id.clone(), &raw, &history, Timestamp::now());

        let scores = DerivedScores {
            churn_risk: prediction::churn_risk(&profile, Some(&history), &self.prediction),
            lifetime_value: prediction::lifetime_value(&profile, &self.prediction),
            influence_score: profile.scores.influence_score,
        };

        debug!(
            tenant = %tenant.tenant_id,
            subscriber = %subscriber_id,
            churn_risk = scores.churn_risk,
            "built subscriber profile"
        );

        Ok(profile.with_scores(scores))
    }

    /// Computes the full prediction set for a subscriber.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ProfileService::build`]; prediction itself is
    /// total and never fails.
    pub async fn predictions(
        &self,
        tenant: &TenantContext,
        subscriber_id: &SubscriberId,
    ) -> Result<Predictions, DomainError> {
        let profile = self.build(tenant, subscriber_id).await?;
        let history = self
            .store
            .fetch_engagement(&tenant.tenant_id, subscriber_id)
            .await
            .map_err(store_error)?;

        Ok(prediction::predict(
            &profile,
            Some(&history),
            &self.prediction,
        ))
    }
}

fn store_error(err: StoreError) -> DomainError {
    DomainError::new(ErrorCode::StoreError, err.to_string())
}
