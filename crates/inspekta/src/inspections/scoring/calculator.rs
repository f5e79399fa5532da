use super::config::ScoringConfig;
use crate::inspections::domain::{Observation, Premise};

/// Derived scores for a single observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationScores {
    pub intensity: u32,
    pub pvi_raw: f64,
    pub absolute_pvi: f64,
}

/// Scores one observation under the given rubric. Degenerate configuration
/// never raises: zero weights and zero policy ceilings resolve to 0-valued
/// outputs so a corrupt rubric cannot block a field submission.
pub(crate) fn score_observation(
    observation: &Observation,
    config: &ScoringConfig,
) -> ObservationScores {
    let intensity = observation
        .selected_defects
        .iter()
        .filter_map(|key| config.parameters.get(key))
        .map(|spec| spec.intensity)
        .sum();

    let mut pvi_raw = 0.0;
    let mut policy_max = 0.0;
    for (key, category) in &config.weights {
        if category.weight == 0 {
            continue;
        }
        let share = category.weight as f64 / 100.0;
        policy_max += category.policy_max as f64 * share;

        let magnitude = observation.defect_magnitudes.get(key).copied().unwrap_or(0);
        if magnitude == 0 {
            continue;
        }
        pvi_raw += magnitude as f64 * share;
    }

    let absolute_pvi = if policy_max <= 0.0 {
        0.0
    } else {
        round2(pvi_raw / policy_max * 100.0)
    };

    ObservationScores {
        intensity,
        pvi_raw: round2(pvi_raw),
        absolute_pvi,
    }
}

/// Rewrites every observation's derived fields under `config`, then the
/// premise aggregates. Raw inputs are left untouched.
pub(crate) fn rescore_history(premise: &mut Premise, config: &ScoringConfig) {
    for observation in premise.observations.iter_mut() {
        let scores = score_observation(observation, config);
        observation.intensity = scores.intensity;
        observation.pvi_raw = scores.pvi_raw;
        observation.absolute_pvi = scores.absolute_pvi;
    }
    aggregate_premise(premise);
}

/// Recomputes premise totals and averages by re-scanning the full
/// observation history. Histories are short enough that the scan beats
/// maintaining incremental sums under the rounding rule.
pub(crate) fn aggregate_premise(premise: &mut Premise) {
    let count = premise.observations.len();
    let total_intensity: u32 = premise.observations.iter().map(|obs| obs.intensity).sum();
    let total_pvi_raw: f64 = premise.observations.iter().map(|obs| obs.pvi_raw).sum();
    let total_absolute_pvi: f64 = premise
        .observations
        .iter()
        .map(|obs| obs.absolute_pvi)
        .sum();

    let scores = &mut premise.scores;
    scores.total_intensity = total_intensity;
    scores.total_pvi_raw = round2(total_pvi_raw);
    scores.total_absolute_pvi = round2(total_absolute_pvi);

    if count == 0 {
        scores.average_intensity = 0.0;
        scores.average_pvi_raw = 0.0;
        scores.average_absolute_pvi = 0.0;
    } else {
        let divisor = count as f64;
        scores.average_intensity = round2(f64::from(total_intensity) / divisor);
        scores.average_pvi_raw = round2(total_pvi_raw / divisor);
        scores.average_absolute_pvi = round2(total_absolute_pvi / divisor);
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspections::scoring::config::{CategoryWeight, ViolationBlend};
    use chrono::NaiveDate;
    use std::collections::{BTreeMap, BTreeSet};

    fn observation() -> Observation {
        Observation {
            date: NaiveDate::from_ymd_opt(2024, 3, 14).expect("valid date"),
            selected_defects: BTreeSet::new(),
            defect_labels: Vec::new(),
            defect_magnitudes: BTreeMap::new(),
            intensity: 0,
            pvi_raw: 0.0,
            absolute_pvi: 0.0,
        }
    }

    #[test]
    fn intensity_sums_selected_parameter_weights() {
        let config = ScoringConfig::default();
        let mut obs = observation();
        obs.selected_defects.insert("got".to_string());
        obs.selected_defects.insert("personnel".to_string());

        let scores = score_observation(&obs, &config);
        assert_eq!(scores.intensity, 35);
    }

    #[test]
    fn worked_pvi_example() {
        let mut config = ScoringConfig::default();
        config.weights.clear();
        config.weights.insert(
            "got".to_string(),
            CategoryWeight {
                weight: 50,
                policy_max: 1000,
            },
        );

        let mut obs = observation();
        obs.defect_magnitudes.insert("got".to_string(), 500);

        let scores = score_observation(&obs, &config);
        assert_eq!(scores.pvi_raw, 250.0);
        assert_eq!(scores.absolute_pvi, 50.0);
    }

    #[test]
    fn zero_policy_ceiling_yields_zero_absolute_pvi() {
        let mut config = ScoringConfig::default();
        config.weights.clear();
        config.weights.insert(
            "got".to_string(),
            CategoryWeight {
                weight: 50,
                policy_max: 0,
            },
        );

        let mut obs = observation();
        obs.defect_magnitudes.insert("got".to_string(), 750_000);

        let scores = score_observation(&obs, &config);
        assert!(scores.pvi_raw > 0.0);
        assert_eq!(scores.absolute_pvi, 0.0);
    }

    #[test]
    fn zero_weight_terms_are_skipped() {
        let mut config = ScoringConfig::default();
        config.weights.clear();
        config.weights.insert(
            "got".to_string(),
            CategoryWeight {
                weight: 0,
                policy_max: 1_000_000,
            },
        );

        let mut obs = observation();
        obs.defect_magnitudes.insert("got".to_string(), 500_000);

        let scores = score_observation(&obs, &config);
        assert_eq!(scores.pvi_raw, 0.0);
        assert_eq!(scores.absolute_pvi, 0.0);
    }

    #[test]
    fn magnitudes_past_the_ceiling_exceed_one_hundred() {
        let mut config = ScoringConfig::default();
        config.weights.clear();
        config.weights.insert(
            "got".to_string(),
            CategoryWeight {
                weight: 100,
                policy_max: 1000,
            },
        );

        let mut obs = observation();
        obs.defect_magnitudes.insert("got".to_string(), 2500);

        let scores = score_observation(&obs, &config);
        assert_eq!(scores.absolute_pvi, 250.0);
    }

    #[test]
    fn aggregates_cover_empty_histories() {
        let mut premise = Premise {
            id: crate::inspections::domain::PremiseId("premise-000001".to_string()),
            name: "Mwenge Pharmacy".to_string(),
            category: "Pharmacy (Human)".to_string(),
            region: "Mtwara".to_string(),
            district: "Mtwara DC".to_string(),
            location: "Chuno Street".to_string(),
            coordinates: None,
            observations: Vec::new(),
            scores: Default::default(),
        };

        aggregate_premise(&mut premise);
        assert_eq!(premise.scores.total_intensity, 0);
        assert_eq!(premise.scores.average_intensity, 0.0);
        assert_eq!(premise.scores.average_absolute_pvi, 0.0);
    }

    #[test]
    fn rescore_history_rewrites_derived_fields_only() {
        let config = ScoringConfig {
            violation_blend: ViolationBlend {
                non_conformance: 60,
                pvi: 40,
            },
            ..ScoringConfig::default()
        };

        let mut obs = observation();
        obs.selected_defects.insert("got".to_string());
        obs.intensity = 999;

        let mut premise = Premise {
            id: crate::inspections::domain::PremiseId("premise-000001".to_string()),
            name: "Mwenge Pharmacy".to_string(),
            category: "Pharmacy (Human)".to_string(),
            region: "Mtwara".to_string(),
            district: "Mtwara DC".to_string(),
            location: "Chuno Street".to_string(),
            coordinates: None,
            observations: vec![obs],
            scores: Default::default(),
        };

        rescore_history(&mut premise, &config);
        assert_eq!(premise.observations[0].intensity, 30);
        assert!(premise.observations[0].selected_defects.contains("got"));
        assert_eq!(premise.scores.total_intensity, 30);
        assert_eq!(premise.scores.average_intensity, 30.0);
    }
}
