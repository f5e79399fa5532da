use std::collections::BTreeMap;

use serde::Serialize;

use super::periods::{period_label, PeriodKind};
use crate::inspections::domain::Premise;
use crate::inspections::scoring::round2;

/// Activity totals for one reporting period across the whole register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodRollup {
    pub period: String,
    pub observations: usize,
    pub defects_found: usize,
    pub total_intensity: u64,
}

/// Standing of one district: how many premises it has on the register, how
/// much inspection activity they have seen, and how severe it looks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictSummary {
    pub district: String,
    pub premises: usize,
    pub observations: usize,
    pub total_intensity: u64,
    pub mean_violation_rate: f64,
    pub max_relative_pvi: f64,
}

/// Accumulates per-period totals over every stored observation, keyed and
/// sorted by period label.
pub fn period_rollups(premises: &[Premise], kind: PeriodKind) -> Vec<PeriodRollup> {
    let mut buckets: BTreeMap<String, PeriodRollup> = BTreeMap::new();
    for premise in premises {
        for observation in &premise.observations {
            let label = period_label(observation.date, kind);
            let entry = buckets.entry(label.clone()).or_insert(PeriodRollup {
                period: label,
                observations: 0,
                defects_found: 0,
                total_intensity: 0,
            });
            entry.observations += 1;
            entry.defects_found += observation.selected_defects.len();
            entry.total_intensity += u64::from(observation.intensity);
        }
    }
    buckets.into_values().collect()
}

/// Rolls the register up per district, sorted by district name.
pub fn district_summaries(premises: &[Premise]) -> Vec<DistrictSummary> {
    #[derive(Default)]
    struct Accumulator {
        premises: usize,
        observations: usize,
        total_intensity: u64,
        violation_rate_sum: f64,
        max_relative_pvi: f64,
    }

    let mut buckets: BTreeMap<String, Accumulator> = BTreeMap::new();
    for premise in premises {
        let entry = buckets.entry(premise.district.clone()).or_default();
        entry.premises += 1;
        entry.observations += premise.observations.len();
        entry.total_intensity += u64::from(premise.scores.total_intensity);
        entry.violation_rate_sum += premise.scores.violation_rate;
        if premise.scores.relative_pvi > entry.max_relative_pvi {
            entry.max_relative_pvi = premise.scores.relative_pvi;
        }
    }

    buckets
        .into_iter()
        .map(|(district, entry)| DistrictSummary {
            district,
            premises: entry.premises,
            observations: entry.observations,
            total_intensity: entry.total_intensity,
            mean_violation_rate: round2(entry.violation_rate_sum / entry.premises as f64),
            max_relative_pvi: entry.max_relative_pvi,
        })
        .collect()
}
