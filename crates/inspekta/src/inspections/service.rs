use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

use super::domain::{
    CohortScope, Observation, ObservationSubmission, Premise, PremiseFilter, PremiseId,
    PremiseRegistration, PremiseScoreView, PremiseScores, ValidationError,
};
use super::report::{district_summaries, period_rollups, DistrictSummary, PeriodKind, PeriodRollup};
use super::scoring::{
    ConfigValidationError, RecalculationSummary, ScoringConfig, ScoringConfigDraft, ScoringEngine,
};
use super::store::{ConfigStore, ConfigStoreError, PremiseStore, StoreError};

/// Service composing the premise store, the configuration store, and the
/// scoring engine. One instance serves both the HTTP surface and the CLI.
pub struct InspectionService<S, C> {
    premises: Arc<S>,
    configs: Arc<C>,
}

static PREMISE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

impl<S, C> InspectionService<S, C>
where
    S: PremiseStore + 'static,
    C: ConfigStore + 'static,
{
    pub fn new(premises: Arc<S>, configs: Arc<C>) -> Self {
        Self { premises, configs }
    }

    /// Register a new premise. Static attributes are fixed here; scoring
    /// only ever touches the observation history and derived fields.
    pub fn register(
        &self,
        registration: PremiseRegistration,
    ) -> Result<Premise, ServiceError> {
        let id = self.next_premise_id()?;
        let premise = Premise::from_registration(id, registration)?;
        self.premises.upsert(premise.clone())?;
        tracing::info!(premise = %premise.id, name = %premise.name, "premise registered");
        Ok(premise)
    }

    /// Record one inspection visit: normalize, score, append, refresh the
    /// premise aggregates, then re-rank the selected cohort.
    ///
    /// The target premise is persisted after the rest of its cohort, so a
    /// submission that fails mid-persist leaves the target unappended and
    /// can be retried without double-recording the visit.
    pub fn submit(
        &self,
        id: &PremiseId,
        submission: ObservationSubmission,
        scope: CohortScope,
    ) -> Result<ObservationReceipt, ServiceError> {
        let engine = ScoringEngine::new(self.configs.read()?);

        let mut premise = self
            .premises
            .get(id)?
            .ok_or_else(|| ServiceError::PremiseNotFound(id.clone()))?;

        let observation = engine.admit(&submission);
        let recorded = observation.clone();
        engine.append(&mut premise, observation);

        let filter = match scope {
            CohortScope::District => PremiseFilter {
                region: None,
                district: Some(premise.district.clone()),
            },
            CohortScope::Global => PremiseFilter::default(),
        };

        // Cohort with the freshly appended target at index 0, stale store
        // copy of the target dropped.
        let mut cohort = vec![premise];
        for member in self.premises.list(&filter)? {
            if member.id != *id {
                cohort.push(member);
            }
        }
        engine.rank(&mut cohort, scope);

        let target = cohort.swap_remove(0);
        for member in cohort {
            self.premises.upsert(member)?;
        }
        self.premises.upsert(target.clone())?;

        tracing::info!(
            premise = %target.id,
            intensity = recorded.intensity,
            absolute_pvi = recorded.absolute_pvi,
            cohort = scope.label(),
            "observation recorded"
        );

        Ok(ObservationReceipt {
            premise_id: target.id,
            cohort_scope: scope.label(),
            observation: recorded,
            observation_count: target.observations.len(),
            scores: target.scores,
        })
    }

    /// Fetch one premise with its full observation history.
    pub fn premise(&self, id: &PremiseId) -> Result<Premise, ServiceError> {
        self.premises
            .get(id)?
            .ok_or_else(|| ServiceError::PremiseNotFound(id.clone()))
    }

    /// List score views for premises matching the filter.
    pub fn premises(&self, filter: &PremiseFilter) -> Result<Vec<PremiseScoreView>, ServiceError> {
        let premises = self.premises.list(filter)?;
        Ok(premises.iter().map(Premise::score_view).collect())
    }

    /// Stored observation sequence for one premise, oldest first.
    pub fn observations(&self, id: &PremiseId) -> Result<Vec<Observation>, ServiceError> {
        Ok(self.premise(id)?.observations)
    }

    pub fn scoring_config(&self) -> Result<ScoringConfig, ServiceError> {
        Ok(self.configs.read()?)
    }

    /// Validate and persist a configuration edit; the write is rejected in
    /// full on the first field that fails coercion.
    pub fn update_scoring_config(
        &self,
        draft: ScoringConfigDraft,
    ) -> Result<ScoringConfig, ServiceError> {
        let config = draft.validate()?;
        self.configs.write(config.clone())?;
        tracing::info!(
            parameters = config.parameters.len(),
            weights = config.weights.len(),
            "scoring configuration updated"
        );
        Ok(config)
    }

    /// Re-score every stored premise under the current configuration and
    /// rank one global cohort.
    pub fn recalculate(&self) -> Result<RecalculationSummary, ServiceError> {
        let engine = ScoringEngine::new(self.configs.read()?);
        Ok(engine.recalculate_all(self.premises.as_ref())?)
    }

    pub fn district_report(&self) -> Result<Vec<DistrictSummary>, ServiceError> {
        let premises = self.premises.list(&PremiseFilter::default())?;
        Ok(district_summaries(&premises))
    }

    pub fn period_report(&self, kind: PeriodKind) -> Result<Vec<PeriodRollup>, ServiceError> {
        let premises = self.premises.list(&PremiseFilter::default())?;
        Ok(period_rollups(&premises, kind))
    }

    /// Allocates the next unused register id. Skips over ids already
    /// present so file-backed stores seeded externally cannot collide.
    fn next_premise_id(&self) -> Result<PremiseId, ServiceError> {
        loop {
            let sequence = PREMISE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
            let candidate = PremiseId(format!("premise-{sequence:06}"));
            if self.premises.get(&candidate)?.is_none() {
                return Ok(candidate);
            }
        }
    }
}

/// Success payload for a recorded observation: the new observation's scores
/// plus the premise's refreshed totals.
#[derive(Debug, Clone, Serialize)]
pub struct ObservationReceipt {
    pub premise_id: PremiseId,
    pub cohort_scope: &'static str,
    pub observation: Observation,
    pub observation_count: usize,
    pub scores: PremiseScores,
}

/// Error raised by the inspection service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("premise '{0}' not found")]
    PremiseNotFound(PremiseId),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Config(#[from] ConfigValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    ConfigStore(#[from] ConfigStoreError),
}
