use std::collections::BTreeMap;

use super::calculator::round2;
use super::config::ScoringConfig;
use crate::inspections::domain::Premise;

/// Cohort key used when ranking every premise against every other.
pub const GLOBAL_COHORT: &str = "all";

/// Recomputes each premise's relative PVI against the maximum raw PVI total
/// within its cohort, then the blended violation rates. A cohort whose
/// maximum is 0 divides by 1 instead, ranking every member at 0.
pub(crate) fn rank_cohort<F>(premises: &mut [Premise], cohort_key: F, config: &ScoringConfig)
where
    F: Fn(&Premise) -> String,
{
    let mut cohort_maxima: BTreeMap<String, f64> = BTreeMap::new();
    for premise in premises.iter() {
        let entry = cohort_maxima.entry(cohort_key(premise)).or_insert(0.0);
        if premise.scores.total_pvi_raw > *entry {
            *entry = premise.scores.total_pvi_raw;
        }
    }

    for premise in premises.iter_mut() {
        let maximum = cohort_maxima
            .get(&cohort_key(premise))
            .copied()
            .unwrap_or(0.0);
        let divisor = if maximum <= 0.0 { 1.0 } else { maximum };
        premise.scores.relative_pvi =
            round2(premise.scores.total_pvi_raw / divisor * 100.0);
        apply_violation_rates(premise, config);
    }
}

fn apply_violation_rates(premise: &mut Premise, config: &ScoringConfig) {
    let non_conformance = f64::from(config.violation_blend.non_conformance) / 100.0;
    let pvi = f64::from(config.violation_blend.pvi) / 100.0;

    let scores = &mut premise.scores;
    scores.violation_rate = round2(
        scores.average_intensity * non_conformance + scores.average_absolute_pvi * pvi,
    );
    scores.relative_violation_rate =
        round2(scores.average_intensity * non_conformance + scores.relative_pvi * pvi);
}
