use serde::Serialize;

use super::calculator::rescore_history;
use super::config::ScoringConfig;
use super::ranker::{rank_cohort, GLOBAL_COHORT};
use crate::inspections::domain::{PremiseFilter, PremiseId};
use crate::inspections::store::{PremiseStore, StoreError};

/// Outcome of a bulk recalculation run.
#[derive(Debug, Clone, Serialize)]
pub struct RecalculationSummary {
    pub premises_processed: usize,
    pub premises_updated: usize,
    pub failures: Vec<RecalculationFailure>,
}

impl RecalculationSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// One premise the job could not persist; the run continues past it.
#[derive(Debug, Clone, Serialize)]
pub struct RecalculationFailure {
    pub premise: PremiseId,
    pub reason: String,
}

/// Re-scores every stored premise under one configuration snapshot, then
/// ranks a single global cohort. Used after retroactive rubric edits.
///
/// Persistence is per premise: a failed upsert is recorded in the summary
/// and the job moves on, so one bad record cannot abort the run.
pub(crate) fn recalculate_all<S>(
    store: &S,
    config: &ScoringConfig,
) -> Result<RecalculationSummary, StoreError>
where
    S: PremiseStore + ?Sized,
{
    let mut premises = store.list(&PremiseFilter::default())?;

    for premise in premises.iter_mut() {
        rescore_history(premise, config);
    }
    rank_cohort(&mut premises, |_| GLOBAL_COHORT.to_string(), config);

    let mut summary = RecalculationSummary {
        premises_processed: premises.len(),
        premises_updated: 0,
        failures: Vec::new(),
    };

    for premise in premises {
        let id = premise.id.clone();
        match store.upsert(premise) {
            Ok(()) => summary.premises_updated += 1,
            Err(error) => {
                tracing::warn!(premise = %id, %error, "failed to persist recalculated premise");
                summary.failures.push(RecalculationFailure {
                    premise: id,
                    reason: error.to_string(),
                });
            }
        }
    }

    tracing::info!(
        processed = summary.premises_processed,
        updated = summary.premises_updated,
        failed = summary.failures.len(),
        "bulk recalculation finished"
    );

    Ok(summary)
}
