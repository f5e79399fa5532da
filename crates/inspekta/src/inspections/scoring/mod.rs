//! The observation scoring engine: rubric configuration, submission
//! normalization, per-observation and per-premise score computation,
//! cohort-relative ranking, and the bulk recalculation job.

mod calculator;
mod config;
mod normalizer;
mod ranker;
mod recalc;

pub use config::{
    CategoryWeight, ConfigValidationError, ParameterSpec, ScoringConfig, ScoringConfigDraft,
    ViolationBlend,
};
pub use normalizer::NONE_SELECTED_LABEL;
pub use ranker::GLOBAL_COHORT;
pub use recalc::{RecalculationFailure, RecalculationSummary};

pub(crate) use calculator::round2;

use crate::inspections::domain::{CohortScope, Observation, ObservationSubmission, Premise};
use crate::inspections::store::{PremiseStore, StoreError};

/// Stateless engine applying one configuration snapshot to observations and
/// premises. Constructed fresh from the config store for each operation so
/// a bulk run never sees a mid-flight rubric edit.
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Canonicalizes a raw submission and computes its derived scores.
    pub fn admit(&self, submission: &ObservationSubmission) -> Observation {
        let mut observation = normalizer::normalize(submission, &self.config);
        let scores = calculator::score_observation(&observation, &self.config);
        observation.intensity = scores.intensity;
        observation.pvi_raw = scores.pvi_raw;
        observation.absolute_pvi = scores.absolute_pvi;
        observation
    }

    /// Appends a scored observation and refreshes the premise aggregates.
    pub fn append(&self, premise: &mut Premise, observation: Observation) {
        premise.observations.push(observation);
        calculator::aggregate_premise(premise);
    }

    /// Recomputes a premise's full history and aggregates under this
    /// engine's configuration snapshot.
    pub fn rescore(&self, premise: &mut Premise) {
        calculator::rescore_history(premise, &self.config);
    }

    /// Refreshes relative PVI and violation rates across `premises`,
    /// partitioned per district or ranked as one global cohort.
    pub fn rank(&self, premises: &mut [Premise], scope: CohortScope) {
        match scope {
            CohortScope::District => ranker::rank_cohort(
                premises,
                |premise| premise.district.to_ascii_lowercase(),
                &self.config,
            ),
            CohortScope::Global => ranker::rank_cohort(
                premises,
                |_| GLOBAL_COHORT.to_string(),
                &self.config,
            ),
        }
    }

    /// Runs the bulk job over every stored premise; see [`RecalculationSummary`].
    pub fn recalculate_all<S>(&self, store: &S) -> Result<RecalculationSummary, StoreError>
    where
        S: PremiseStore + ?Sized,
    {
        recalc::recalculate_all(store, &self.config)
    }
}
