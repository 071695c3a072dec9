//! Cohort service - segmentation entry point plus rule resolution.

use tracing::info;

use crate::domain::cohort::{CohortDefinition, CohortGenerator, SegmentationConfig};
use crate::domain::foundation::{CohortId, DomainError, TenantContext};
use crate::domain::market::MarketContext;
use crate::domain::personalization::{derive_rules, PersonalizationRule};
use crate::domain::prediction::PredictionConfig;
use crate::domain::subscriber::SubscriberProfile;

/// Generates cohorts and derives personalization rules for them.
pub struct CohortService {
    generator: CohortGenerator,
}

impl CohortService {
    pub fn new(segmentation: SegmentationConfig, prediction: PredictionConfig) -> Self {
        Self {
            generator: CohortGenerator::new(segmentation, prediction),
        }
    }

    /// Regenerates the full cohort set for a tenant's subscriber base.
    ///
    /// Never fails for valid profiles: a rule family that errors is logged
    /// and skipped, the other families still contribute.
    pub fn generate_cohorts(
        &self,
        tenant: &TenantContext,
        profiles: &[SubscriberProfile],
        market: Option<&MarketContext>,
    ) -> Vec<CohortDefinition> {
        let cohorts = self.generator.generate(profiles, market);
        info!(
            tenant = %tenant.tenant_id,
            profiles = profiles.len(),
            cohorts = cohorts.len(),
            "generated cohort set"
        );
        cohorts
    }

    /// Derives personalization rules for one cohort of a generated set.
    ///
    /// # Errors
    ///
    /// `CohortNotFound` when the id is not in `cohorts`. Derivation itself
    /// is total.
    pub fn rules_for(
        &self,
        cohorts: &[CohortDefinition],
        cohort_id: &CohortId,
    ) -> Result<Vec<PersonalizationRule>, DomainError> {
        let cohort = cohorts
            .iter()
            .find(|c| &c.id == cohort_id)
            .ok_or_else(|| DomainError::cohort_not_found(cohort_id))?;

        Ok(derive_rules(cohort))
    }
}
