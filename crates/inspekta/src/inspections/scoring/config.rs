use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One defect-flag parameter: the checklist label shown to inspectors and
/// the intensity weight it contributes when selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub label: String,
    pub intensity: u32,
}

/// Weighting for one monetary defect category: its percentage share of the
/// PVI and the policy ceiling used to normalize absolute PVI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryWeight {
    pub weight: u32,
    pub policy_max: u64,
}

/// Blending weights for the composite violation rate. Intended to sum to
/// 100; each is clamped to [0, 100] on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationBlend {
    pub non_conformance: u32,
    pub pvi: u32,
}

/// The scoring rubric read before every scoring operation. Passed by value
/// into the engine so one snapshot covers an entire recalculation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub parameters: BTreeMap<String, ParameterSpec>,
    pub weights: BTreeMap<String, CategoryWeight>,
    pub violation_blend: ViolationBlend,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let parameters = [
            ("got", "GOT Medicines", 30),
            ("unreg", "Unregistered Medicines", 30),
            ("personnel", "No Qualified Personnel", 5),
            ("requirements", "Premise doesn't meet GSP Requirement", 5),
            ("unregPremise", "Unregistered Premise", 5),
            ("medicalPractices", "Medical Practices", 5),
            ("dldmNotAllowed", "DLDM NOT ALLOWED Medicines", 10),
        ]
        .into_iter()
        .map(|(key, label, intensity)| {
            (
                key.to_string(),
                ParameterSpec {
                    label: label.to_string(),
                    intensity,
                },
            )
        })
        .collect();

        let weights = [
            ("got", 40, 5_000_000),
            ("unreg", 40, 5_000_000),
            ("dldmNotAllowed", 20, 2_000_000),
        ]
        .into_iter()
        .map(|(key, weight, policy_max)| {
            (
                key.to_string(),
                CategoryWeight {
                    weight,
                    policy_max,
                },
            )
        })
        .collect();

        Self {
            parameters,
            weights,
            violation_blend: ViolationBlend {
                non_conformance: 60,
                pvi: 40,
            },
        }
    }
}

/// Raw configuration edit as submitted by administrative tooling. Numeric
/// fields arrive as JSON values because the editing UI posts strings;
/// `validate` coerces them field by field and rejects the whole draft on
/// the first failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringConfigDraft {
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterDraft>,
    #[serde(default)]
    pub weights: BTreeMap<String, CategoryWeightDraft>,
    #[serde(default)]
    pub violation_blend: ViolationBlendDraft,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParameterDraft {
    pub label: String,
    #[serde(default)]
    pub intensity: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryWeightDraft {
    #[serde(default)]
    pub weight: Value,
    #[serde(default)]
    pub policy_max: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViolationBlendDraft {
    #[serde(default)]
    pub non_conformance: Value,
    #[serde(default)]
    pub pvi: Value,
}

impl ScoringConfigDraft {
    pub fn validate(self) -> Result<ScoringConfig, ConfigValidationError> {
        let mut parameters = BTreeMap::new();
        for (key, draft) in self.parameters {
            let field = format!("parameters.{key}.intensity");
            let intensity = coerce_non_negative(&field, &draft.intensity)? as u32;
            parameters.insert(
                key,
                ParameterSpec {
                    label: draft.label,
                    intensity,
                },
            );
        }

        let mut weights = BTreeMap::new();
        for (key, draft) in self.weights {
            let weight =
                coerce_non_negative(&format!("weights.{key}.weight"), &draft.weight)? as u32;
            let policy_max =
                coerce_non_negative(&format!("weights.{key}.policy_max"), &draft.policy_max)?;
            weights.insert(key, CategoryWeight { weight, policy_max });
        }

        let violation_blend = ViolationBlend {
            non_conformance: coerce_blend(
                "violation_blend.non_conformance",
                &self.violation_blend.non_conformance,
            )?,
            pvi: coerce_blend("violation_blend.pvi", &self.violation_blend.pvi)?,
        };

        Ok(ScoringConfig {
            parameters,
            weights,
            violation_blend,
        })
    }
}

/// Field-level coercion failure; the configuration write that carried it is
/// rejected in full.
#[derive(Debug, thiserror::Error)]
#[error("field '{field}' must be a non-negative integer, got {value}")]
pub struct ConfigValidationError {
    pub field: String,
    pub value: String,
}

fn coerce_non_negative(field: &str, raw: &Value) -> Result<u64, ConfigValidationError> {
    let reject = || ConfigValidationError {
        field: field.to_string(),
        value: raw.to_string(),
    };

    match raw {
        Value::Number(number) => number.as_u64().ok_or_else(reject),
        Value::String(text) => text.trim().parse::<u64>().map_err(|_| reject()),
        _ => Err(reject()),
    }
}

fn coerce_blend(field: &str, raw: &Value) -> Result<u32, ConfigValidationError> {
    let reject = || ConfigValidationError {
        field: field.to_string(),
        value: raw.to_string(),
    };

    let parsed = match raw {
        Value::Number(number) => number.as_i64().ok_or_else(reject)?,
        Value::String(text) => text.trim().parse::<i64>().map_err(|_| reject())?,
        _ => return Err(reject()),
    };

    Ok(parsed.clamp(0, 100) as u32)
}
