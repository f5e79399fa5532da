use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use super::config::ScoringConfig;
use crate::inspections::domain::{Observation, ObservationSubmission};

/// Display label recorded when an inspector explicitly reports no defects.
pub const NONE_SELECTED_LABEL: &str = "None";

/// Canonicalizes a raw submission against the rubric. Unknown defect flags
/// and magnitude categories are dropped silently; malformed magnitudes
/// coerce to 0 rather than failing the visit record.
pub(crate) fn normalize(
    submission: &ObservationSubmission,
    config: &ScoringConfig,
) -> Observation {
    let selected_defects: BTreeSet<String> = if submission.none_selected {
        BTreeSet::new()
    } else {
        submission
            .defect_flags
            .iter()
            .filter(|key| config.parameters.contains_key(key.as_str()))
            .cloned()
            .collect()
    };

    let defect_labels: Vec<String> = if submission.none_selected {
        vec![NONE_SELECTED_LABEL.to_string()]
    } else {
        selected_defects
            .iter()
            .filter_map(|key| config.parameters.get(key).map(|spec| spec.label.clone()))
            .collect()
    };

    let defect_magnitudes: BTreeMap<String, u64> = config
        .weights
        .keys()
        .filter_map(|key| {
            submission
                .magnitudes
                .get(key)
                .map(|raw| (key.clone(), coerce_magnitude(raw)))
        })
        .collect();

    Observation {
        date: submission.date,
        selected_defects,
        defect_labels,
        defect_magnitudes,
        intensity: 0,
        pvi_raw: 0.0,
        absolute_pvi: 0.0,
    }
}

/// Field devices send magnitudes as numbers or as formatted strings such as
/// "1,500,000 Tsh"; everything except the digits is discarded.
fn coerce_magnitude(raw: &Value) -> u64 {
    match raw {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|value| *value > 0.0)
                    .map(|value| value.trunc() as u64)
            })
            .unwrap_or(0),
        Value::String(text) => {
            let digits: String = text.chars().filter(char::is_ascii_digit).collect();
            digits.parse::<u64>().unwrap_or(0)
        }
        _ => 0,
    }
}
