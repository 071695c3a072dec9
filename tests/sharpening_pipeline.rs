//! Integration tests for the sharpening and batch orchestration flows.
//!
//! Exercises the full pipeline against the mock AI provider: one voice
//! extraction per item, per-cohort adaptation with isolated failures,
//! individual personalization with degraded market data, and batch runs
//! with cancellation.

use std::sync::Arc;

use audiencecraft::adapters::ai::{MockAiProvider, MockError};
use audiencecraft::adapters::market::{FailingMarketProvider, StaticMarketProvider};
use audiencecraft::adapters::store::InMemorySubscriberStore;
use audiencecraft::application::{
    BatchOrchestrator, CohortService, ContentSharpener, IndividualPersonalizer, ProfileService,
};
use audiencecraft::config::OrchestratorConfig;
use audiencecraft::domain::cohort::{CohortDefinition, SegmentationConfig};
use audiencecraft::domain::foundation::{
    CancelFlag, ErrorCode, SubscriberId, TenantContext, TenantId, Timestamp,
};
use audiencecraft::domain::market::MarketContext;
use audiencecraft::domain::prediction::PredictionConfig;
use audiencecraft::domain::subscriber::{
    EngagementHistory, ExperienceLevel, RawSubscriberData, RiskTolerance, SubscriberProfile,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

const BASE_SUBJECT: &str = "Tech Sector Update";
const BASE_CONTENT: &str = "Chips rallied again today. Zooming out, the trend is intact.";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("audiencecraft=debug")
        .with_test_writer()
        .try_init();
}

fn tenant() -> TenantContext {
    init_tracing();
    TenantContext::new(TenantId::new("pub-7").unwrap(), "Open Positions").unwrap()
}

fn tenant_id() -> TenantId {
    TenantId::new("pub-7").unwrap()
}

fn subscriber_record(
    name: &str,
    risk: RiskTolerance,
    experience: ExperienceLevel,
    opens: u32,
) -> (SubscriberId, RawSubscriberData, EngagementHistory) {
    let raw = RawSubscriberData {
        email: format!("{}@example.com", name),
        risk_tolerance: Some(risk),
        experience_level: Some(experience),
        sectors: vec!["technology".to_string()],
        ..RawSubscriberData::default()
    };
    let history = EngagementHistory {
        sends: 10,
        opens,
        clicks: opens / 2,
        total_reading_secs: u64::from(opens) * 300,
        last_active: Some(Timestamp::now()),
        ..EngagementHistory::default()
    };
    (SubscriberId::new(name).unwrap(), raw, history)
}

async fn seeded_profiles(store: &InMemorySubscriberStore) -> Vec<SubscriberProfile> {
    let records = vec![
        subscriber_record("pro-1", RiskTolerance::Aggressive, ExperienceLevel::Expert, 9),
        subscriber_record("pro-2", RiskTolerance::Aggressive, ExperienceLevel::Expert, 9),
        subscriber_record(
            "novice-1",
            RiskTolerance::Conservative,
            ExperienceLevel::Beginner,
            4,
        ),
        subscriber_record(
            "novice-2",
            RiskTolerance::Conservative,
            ExperienceLevel::Beginner,
            3,
        ),
    ];

    let service = ProfileService::new(Arc::new(store.clone()), PredictionConfig::default());
    let mut profiles = Vec::new();
    for (id, raw, history) in records {
        store.insert_subscriber(tenant_id(), id.clone(), raw);
        store.insert_engagement(tenant_id(), id.clone(), history);
        profiles.push(service.build(&tenant(), &id).await.unwrap());
    }
    profiles
}

async fn generated_cohorts(store: &InMemorySubscriberStore) -> Vec<CohortDefinition> {
    let profiles = seeded_profiles(store).await;
    let cohorts = CohortService::new(SegmentationConfig::default(), PredictionConfig::default())
        .generate_cohorts(&tenant(), &profiles, None);
    assert!(cohorts.len() >= 4);
    cohorts
}

fn adapted_response() -> &'static str {
    r#"{"subject": "Sharper: chips", "content": "Adapted body.", "call_to_action": "Read on",
        "predicted_open_rate": 0.42, "predicted_click_rate": 0.08,
        "voice_consistency_score": 0.9, "preserved_elements": ["zooming out"]}"#
}

// =============================================================================
// Sharpening pipeline
// =============================================================================

#[tokio::test]
async fn one_voice_extraction_for_n_cohorts() {
    let store = InMemorySubscriberStore::new();
    let cohorts = generated_cohorts(&store).await;

    let provider = MockAiProvider::new()
        .respond_when("voice profile", r#"{"tone": "confident"}"#)
        .with_default_response(adapted_response());
    let sharpener = ContentSharpener::new(Arc::new(provider.clone()));

    let results = sharpener
        .sharpen(&tenant(), BASE_SUBJECT, BASE_CONTENT, &cohorts, None)
        .await
        .unwrap();

    assert_eq!(results.len(), cohorts.len());
    assert_eq!(provider.calls_matching("voice profile"), 1);
    assert_eq!(provider.call_count(), cohorts.len() + 1);
}

#[tokio::test]
async fn deterministic_subset_failure_yields_marked_fallbacks() {
    let store = InMemorySubscriberStore::new();
    let cohorts = generated_cohorts(&store).await;

    // Fail exactly the cohorts whose prompt mentions the conservative
    // investors cohort; everything else succeeds.
    let provider = MockAiProvider::new()
        .respond_when("voice profile", r#"{"tone": "confident"}"#)
        .fail_when(
            "Conservative Investors",
            MockError::Unavailable {
                message: "provider down".to_string(),
            },
        )
        .with_default_response(adapted_response());
    let sharpener = ContentSharpener::new(Arc::new(provider));

    let results = sharpener
        .sharpen(&tenant(), BASE_SUBJECT, BASE_CONTENT, &cohorts, None)
        .await
        .unwrap();

    assert_eq!(results.len(), cohorts.len());

    let (fallbacks, adapted): (Vec<_>, Vec<_>) = results.iter().partition(|r| r.fallback);
    assert_eq!(fallbacks.len(), 1);

    for result in &fallbacks {
        assert_eq!(result.subject, BASE_SUBJECT);
        assert_eq!(result.content, BASE_CONTENT);
        assert_eq!(result.voice_consistency_score, 1.0);
        assert!(result.fallback_reason.is_some());
        assert!(result
            .preserved_elements
            .contains(&"original content".to_string()));
    }
    for result in &adapted {
        assert!(!result.fallback);
        assert!((0.0..=1.0).contains(&result.voice_consistency_score));
        assert!((0.0..=1.0).contains(&result.predicted_open_rate));
        assert!((0.0..=1.0).contains(&result.predicted_click_rate));
    }
}

#[tokio::test]
async fn total_provider_outage_still_returns_every_cohort() {
    let store = InMemorySubscriberStore::new();
    let cohorts = generated_cohorts(&store).await;

    // Every prompt asks for a JSON response, so this pattern hits all calls.
    let provider =
        MockAiProvider::new().fail_when("Respond", MockError::Timeout { timeout_secs: 30 });
    let sharpener = ContentSharpener::new(Arc::new(provider));

    let results = sharpener
        .sharpen(&tenant(), BASE_SUBJECT, BASE_CONTENT, &cohorts, None)
        .await
        .unwrap();

    assert_eq!(results.len(), cohorts.len());
    assert!(results.iter().all(|r| r.fallback));
    assert!(results.iter().all(|r| r.content == BASE_CONTENT));
}

// =============================================================================
// Individual personalization
// =============================================================================

fn personalizer(
    store: &InMemorySubscriberStore,
    provider: MockAiProvider,
    market_ok: bool,
) -> IndividualPersonalizer {
    let profiles = Arc::new(ProfileService::new(
        Arc::new(store.clone()),
        PredictionConfig::default(),
    ));
    let market: Arc<dyn audiencecraft::ports::MarketContextProvider> = if market_ok {
        Arc::new(StaticMarketProvider::neutral())
    } else {
        Arc::new(FailingMarketProvider)
    };
    IndividualPersonalizer::new(
        profiles,
        Arc::new(provider),
        market,
        PredictionConfig::default(),
    )
}

#[tokio::test]
async fn market_outage_degrades_to_neutral_context() {
    let store = InMemorySubscriberStore::new();
    seeded_profiles(&store).await;

    let provider = MockAiProvider::new().with_default_response(r#"{"content": "Tailored."}"#);
    let personalizer = personalizer(&store, provider, false);

    let result = personalizer
        .personalize(
            &tenant(),
            &SubscriberId::new("pro-1").unwrap(),
            BASE_SUBJECT,
            BASE_CONTENT,
        )
        .await
        .unwrap();

    assert_eq!(result.market_context, MarketContext::neutral());
    assert_eq!(result.content, "Tailored.");
}

// =============================================================================
// Batch orchestration
// =============================================================================

#[tokio::test]
async fn cohort_batch_accounts_for_every_cohort() {
    let store = InMemorySubscriberStore::new();
    let cohorts = generated_cohorts(&store).await;

    let provider = MockAiProvider::new()
        .respond_when("voice profile", r#"{"tone": "confident"}"#)
        .with_default_response(adapted_response());
    let sharpener = ContentSharpener::new(Arc::new(provider));
    let orchestrator = BatchOrchestrator::new(OrchestratorConfig {
        concurrency_limit: 2,
    });

    let outcome = orchestrator
        .run_cohort_batch(
            &tenant(),
            &sharpener,
            BASE_SUBJECT,
            BASE_CONTENT,
            &cohorts,
            None,
            &CancelFlag::new(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.total(), cohorts.len());
    assert!(outcome.errors.is_empty());
}

#[tokio::test]
async fn subscriber_batch_isolates_unknown_ids() {
    let store = InMemorySubscriberStore::new();
    seeded_profiles(&store).await;

    let provider = MockAiProvider::new().with_default_response(r#"{"content": "Tailored."}"#);
    let personalizer = personalizer(&store, provider, true);
    let orchestrator = BatchOrchestrator::new(OrchestratorConfig::default());

    let subscribers = vec![
        SubscriberId::new("pro-1").unwrap(),
        SubscriberId::new("missing").unwrap(),
        SubscriberId::new("novice-1").unwrap(),
    ];

    let outcome = orchestrator
        .run_subscriber_batch(
            &tenant(),
            &personalizer,
            BASE_SUBJECT,
            BASE_CONTENT,
            &subscribers,
            &CancelFlag::new(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.total(), 3);
    assert_eq!(outcome.successes.len(), 2);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].item, "missing");
    assert_eq!(outcome.errors[0].error.code, ErrorCode::SubscriberNotFound);
}

#[tokio::test]
async fn cancelled_batch_reports_remaining_items() {
    let store = InMemorySubscriberStore::new();
    seeded_profiles(&store).await;

    let provider = MockAiProvider::new().with_default_response(r#"{"content": "Tailored."}"#);
    let personalizer = personalizer(&store, provider, true);
    let orchestrator = BatchOrchestrator::new(OrchestratorConfig::default());

    let cancel = CancelFlag::new();
    cancel.cancel();

    let subscribers = vec![
        SubscriberId::new("pro-1").unwrap(),
        SubscriberId::new("pro-2").unwrap(),
    ];
    let outcome = orchestrator
        .run_subscriber_batch(
            &tenant(),
            &personalizer,
            BASE_SUBJECT,
            BASE_CONTENT,
            &subscribers,
            &cancel,
        )
        .await
        .unwrap();

    assert_eq!(outcome.total(), 2);
    assert!(outcome.successes.is_empty());
    assert!(outcome
        .errors
        .iter()
        .all(|e| e.error.code == ErrorCode::Cancelled));
}

#[tokio::test]
async fn empty_cohort_list_is_rejected() {
    let sharpener = ContentSharpener::new(Arc::new(MockAiProvider::new()));
    let orchestrator = BatchOrchestrator::new(OrchestratorConfig::default());

    let err = orchestrator
        .run_cohort_batch(
            &tenant(),
            &sharpener,
            BASE_SUBJECT,
            BASE_CONTENT,
            &[],
            None,
            &CancelFlag::new(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::EmptyField);
}
