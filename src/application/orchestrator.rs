//! Batch orchestrator - bounded fan-out over independent provider calls.
//!
//! Batches execute sequentially; items within a batch run concurrently up
//! to the configured limit, which bounds simultaneous outbound AI calls to
//! respect third-party rate limits. Per-item failures land in the outcome's
//! error list, never aborting the run. Items are never retried here;
//! retries are deliberately left to the caller so rate-limit handling stays
//! in one place (the HTTP provider).
//!
//! A [`CancelFlag`] is checked between batches: cancelling stops further
//! batches and reports the remaining items as cancelled errors without
//! touching results already collected.

use futures::future::{join_all, BoxFuture};
use tracing::info;

use crate::config::OrchestratorConfig;
use crate::domain::cohort::CohortDefinition;
use crate::domain::foundation::{CancelFlag, DomainError, ErrorCode, SubscriberId, TenantContext};
use crate::domain::market::MarketContext;
use crate::domain::personalization::{EmailSharpening, IndividualPersonalization};

use super::personalizer::IndividualPersonalizer;
use super::sharpener::ContentSharpener;

/// A per-item failure within a batch run.
#[derive(Debug, Clone)]
pub struct BatchError {
    /// Identifies the failed item (cohort or subscriber id).
    pub item: String,
    pub error: DomainError,
}

/// Result of a batch run. Every input item appears exactly once, in
/// `successes` or in `errors`.
#[derive(Debug)]
pub struct BatchOutcome<T> {
    pub successes: Vec<T>,
    pub errors: Vec<BatchError>,
}

impl<T> BatchOutcome<T> {
    fn new() -> Self {
        Self {
            successes: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Total items accounted for.
    pub fn total(&self) -> usize {
        self.successes.len() + self.errors.len()
    }
}

/// Runs personalization workloads in bounded sequential batches.
pub struct BatchOrchestrator {
    config: OrchestratorConfig,
}

impl BatchOrchestrator {
    pub fn new(config: OrchestratorConfig) -> Self {
        Self { config }
    }

    /// Sharpens base content for every cohort in the list.
    ///
    /// The voice profile is extracted once up front and shared by all
    /// batches. Individual cohort failures surface as fallback-marked
    /// results, so `errors` only ever holds cancellations here.
    ///
    /// # Errors
    ///
    /// `EmptyField` for an empty cohort list or empty subject/content.
    pub async fn run_cohort_batch(
        &self,
        tenant: &TenantContext,
        sharpener: &ContentSharpener,
        base_subject: &str,
        base_content: &str,
        cohorts: &[CohortDefinition],
        market: Option<&MarketContext>,
        cancel: &CancelFlag,
    ) -> Result<BatchOutcome<EmailSharpening>, DomainError> {
        if cohorts.is_empty() {
            return Err(DomainError::empty_field("cohorts"));
        }
        if base_subject.trim().is_empty() {
            return Err(DomainError::empty_field("base_subject"));
        }
        if base_content.trim().is_empty() {
            return Err(DomainError::empty_field("base_content"));
        }

        let voice = sharpener.extract_voice(tenant, base_content).await;

        let work: Vec<(String, BoxFuture<'_, Result<EmailSharpening, DomainError>>)> = cohorts
            .iter()
            .map(|cohort| {
                let voice = &voice;
                let label = cohort.id.to_string();
                let future: BoxFuture<'_, _> = Box::pin(async move {
                    Ok(sharpener
                        .sharpen_one(tenant, voice, cohort, base_subject, base_content, market)
                        .await)
                });
                (label, future)
            })
            .collect();

        let outcome = self.run_batched(work, cancel).await;
        info!(
            tenant = %tenant.tenant_id,
            cohorts = cohorts.len(),
            successes = outcome.successes.len(),
            errors = outcome.errors.len(),
            "cohort batch complete"
        );
        Ok(outcome)
    }

    /// Personalizes base content for every subscriber in the list.
    ///
    /// Identity failures (`SubscriberNotFound`) are isolated per item; a
    /// batch with some unknown ids still personalizes the rest.
    ///
    /// # Errors
    ///
    /// `EmptyField` for an empty id list or empty subject/content.
    pub async fn run_subscriber_batch(
        &self,
        tenant: &TenantContext,
        personalizer: &IndividualPersonalizer,
        base_subject: &str,
        base_content: &str,
        subscribers: &[SubscriberId],
        cancel: &CancelFlag,
    ) -> Result<BatchOutcome<IndividualPersonalization>, DomainError> {
        if subscribers.is_empty() {
            return Err(DomainError::empty_field("subscribers"));
        }
        if base_subject.trim().is_empty() {
            return Err(DomainError::empty_field("base_subject"));
        }
        if base_content.trim().is_empty() {
            return Err(DomainError::empty_field("base_content"));
        }

        let work: Vec<(String, BoxFuture<'_, Result<IndividualPersonalization, DomainError>>)> =
            subscribers
                .iter()
                .map(|id| {
                    let label = id.to_string();
                    let future: BoxFuture<'_, _> = Box::pin(
                        personalizer.personalize(tenant, id, base_subject, base_content),
                    );
                    (label, future)
                })
                .collect();

        let outcome = self.run_batched(work, cancel).await;
        info!(
            tenant = %tenant.tenant_id,
            subscribers = subscribers.len(),
            successes = outcome.successes.len(),
            errors = outcome.errors.len(),
            "subscriber batch complete"
        );
        Ok(outcome)
    }

    /// Drives labeled futures in sequential batches of `concurrency_limit`,
    /// checking the cancel flag before each batch.
    async fn run_batched<'a, T>(
        &self,
        work: Vec<(String, BoxFuture<'a, Result<T, DomainError>>)>,
        cancel: &CancelFlag,
    ) -> BatchOutcome<T> {
        let mut outcome = BatchOutcome::new();
        let mut remaining = work.into_iter();

        loop {
            if cancel.is_cancelled() {
                for (item, _) in remaining {
                    outcome.errors.push(BatchError {
                        item,
                        error: DomainError::new(ErrorCode::Cancelled, "batch run cancelled"),
                    });
                }
                break;
            }

            let batch: Vec<_> = remaining
                .by_ref()
                .take(self.config.concurrency_limit)
                .collect();
            if batch.is_empty() {
                break;
            }

            let (labels, futures): (Vec<_>, Vec<_>) = batch.into_iter().unzip();
            for (item, result) in labels.into_iter().zip(join_all(futures).await) {
                match result {
                    Ok(value) => outcome.successes.push(value),
                    Err(error) => outcome.errors.push(BatchError { item, error }),
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::adapters::ai::MockAiProvider;
    use crate::adapters::market::StaticMarketProvider;
    use crate::adapters::store::InMemorySubscriberStore;
    use crate::application::profile_service::ProfileService;
    use crate::domain::foundation::TenantId;
    use crate::domain::prediction::PredictionConfig;
    use crate::domain::subscriber::RawSubscriberData;

    fn tenant() -> TenantContext {
        TenantContext::new(TenantId::new("t1").unwrap(), "Ledger Lines").unwrap()
    }

    fn orchestrator(limit: usize) -> BatchOrchestrator {
        BatchOrchestrator::new(OrchestratorConfig {
            concurrency_limit: limit,
        })
    }

    fn boxed_ok(value: u32) -> BoxFuture<'static, Result<u32, DomainError>> {
        Box::pin(async move { Ok(value) })
    }

    #[tokio::test]
    async fn every_item_is_accounted_for() {
        let cancel = CancelFlag::new();
        let work = vec![
            ("a".to_string(), boxed_ok(1)),
            (
                "b".to_string(),
                Box::pin(async {
                    Err(DomainError::new(ErrorCode::InternalError, "boom"))
                }) as BoxFuture<'static, Result<u32, DomainError>>,
            ),
            ("c".to_string(), boxed_ok(3)),
        ];

        let outcome = orchestrator(2).run_batched(work, &cancel).await;

        assert_eq!(outcome.total(), 3);
        assert_eq!(outcome.successes, vec![1, 3]);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].item, "b");
    }

    #[tokio::test]
    async fn cancellation_between_batches_keeps_collected_results() {
        let cancel = CancelFlag::new();
        let flag = cancel.clone();

        // First batch cancels the run; later batches never execute.
        let work: Vec<(String, BoxFuture<'_, Result<u32, DomainError>>)> = vec![
            (
                "first".to_string(),
                Box::pin(async move {
                    flag.cancel();
                    Ok(1)
                }),
            ),
            ("second".to_string(), boxed_ok(2)),
            ("third".to_string(), boxed_ok(3)),
        ];

        let outcome = orchestrator(1).run_batched(work, &cancel).await;

        assert_eq!(outcome.total(), 3);
        assert_eq!(outcome.successes, vec![1]);
        assert_eq!(outcome.errors.len(), 2);
        assert!(outcome
            .errors
            .iter()
            .all(|e| e.error.code == ErrorCode::Cancelled));
    }

    #[tokio::test]
    async fn pre_cancelled_run_reports_everything_cancelled() {
        let cancel = CancelFlag::new();
        cancel.cancel();

        let work = vec![("a".to_string(), boxed_ok(1)), ("b".to_string(), boxed_ok(2))];
        let outcome = orchestrator(10).run_batched(work, &cancel).await;

        assert!(outcome.successes.is_empty());
        assert_eq!(outcome.errors.len(), 2);
    }

    #[tokio::test]
    async fn empty_subscriber_list_is_a_contract_violation() {
        let store = InMemorySubscriberStore::new();
        let profiles = Arc::new(ProfileService::new(
            Arc::new(store),
            PredictionConfig::default(),
        ));
        let personalizer = IndividualPersonalizer::new(
            profiles,
            Arc::new(MockAiProvider::new()),
            Arc::new(StaticMarketProvider::neutral()),
            PredictionConfig::default(),
        );

        let err = orchestrator(10)
            .run_subscriber_batch(
                &tenant(),
                &personalizer,
                "Subject",
                "Body",
                &[],
                &CancelFlag::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyField);
    }

    #[tokio::test]
    async fn unknown_subscribers_are_isolated_per_item() {
        let store = InMemorySubscriberStore::new();
        store.insert_subscriber(
            TenantId::new("t1").unwrap(),
            SubscriberId::new("known").unwrap(),
            RawSubscriberData::with_email("k@example.com"),
        );
        let profiles = Arc::new(ProfileService::new(
            Arc::new(store),
            PredictionConfig::default(),
        ));
        let personalizer = IndividualPersonalizer::new(
            profiles,
            Arc::new(MockAiProvider::new().with_default_response(r#"{"content": "Hi."}"#)),
            Arc::new(StaticMarketProvider::neutral()),
            PredictionConfig::default(),
        );

        let subscribers = vec![
            SubscriberId::new("known").unwrap(),
            SubscriberId::new("ghost").unwrap(),
        ];
        let outcome = orchestrator(10)
            .run_subscriber_batch(
                &tenant(),
                &personalizer,
                "Subject",
                "Body",
                &subscribers,
                &CancelFlag::new(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.total(), 2);
        assert_eq!(outcome.successes.len(), 1);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].item, "ghost");
        assert_eq!(outcome.errors[0].error.code, ErrorCode::SubscriberNotFound);
    }
}
