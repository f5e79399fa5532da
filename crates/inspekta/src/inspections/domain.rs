use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for registered premises.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PremiseId(pub String);

impl fmt::Display for PremiseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Premise categories accepted at registration, matching the inspectorate's
/// licensing register.
pub const KNOWN_CATEGORIES: [&str; 12] = [
    "DLDM (Human)",
    "DLDM (Vet)",
    "Pharmacy (Human)",
    "Pharmacy (Vet)",
    "Hospitals",
    "Health Centre",
    "Dispensaries",
    "Laboratory (GOT)",
    "Laboratory (Private)",
    "Polyclinic",
    "Warehouse",
    "Medical Device Shop",
];

/// Geographic point recorded for premises mapped in the field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Registration payload for a new premise, validated before a record is
/// created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiseRegistration {
    pub name: String,
    pub category: String,
    pub region: String,
    pub district: String,
    pub location: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

/// A registered premise with its inspection history and derived scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Premise {
    pub id: PremiseId,
    pub name: String,
    pub category: String,
    pub region: String,
    pub district: String,
    pub location: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub observations: Vec<Observation>,
    #[serde(default)]
    pub scores: PremiseScores,
}

impl Premise {
    /// Builds a premise record from a validated registration. Names and
    /// locations are stored title-cased so the register reads uniformly
    /// however inspectors typed them.
    pub fn from_registration(
        id: PremiseId,
        registration: PremiseRegistration,
    ) -> Result<Self, ValidationError> {
        let name = registration.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField { field: "name" });
        }
        let region = registration.region.trim();
        if region.is_empty() {
            return Err(ValidationError::MissingField { field: "region" });
        }
        let district = registration.district.trim();
        if district.is_empty() {
            return Err(ValidationError::MissingField { field: "district" });
        }
        let category = registration.category.trim();
        if !KNOWN_CATEGORIES
            .iter()
            .any(|known| known.eq_ignore_ascii_case(category))
        {
            return Err(ValidationError::UnknownCategory {
                category: registration.category.clone(),
            });
        }
        let canonical_category = KNOWN_CATEGORIES
            .iter()
            .find(|known| known.eq_ignore_ascii_case(category))
            .map(|known| known.to_string())
            .unwrap_or_else(|| category.to_string());

        Ok(Self {
            id,
            name: title_case(name),
            category: canonical_category,
            region: region.to_string(),
            district: district.to_string(),
            location: title_case(registration.location.trim()),
            coordinates: registration.coordinates,
            observations: Vec::new(),
            scores: PremiseScores::default(),
        })
    }

    pub fn score_view(&self) -> PremiseScoreView {
        PremiseScoreView {
            id: self.id.clone(),
            name: self.name.clone(),
            category: self.category.clone(),
            region: self.region.clone(),
            district: self.district.clone(),
            observation_count: self.observations.len(),
            scores: self.scores.clone(),
        }
    }
}

/// One inspection visit's canonical record. Raw inputs (`date`,
/// `selected_defects`, `defect_magnitudes`) are immutable after submission;
/// the derived fields are rewritten by recomputation passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub selected_defects: BTreeSet<String>,
    pub defect_labels: Vec<String>,
    pub defect_magnitudes: BTreeMap<String, u64>,
    #[serde(default)]
    pub intensity: u32,
    #[serde(default)]
    pub pvi_raw: f64,
    #[serde(default)]
    pub absolute_pvi: f64,
}

/// Raw observation payload as submitted from the field, before
/// normalization against the scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationSubmission {
    pub date: NaiveDate,
    #[serde(default)]
    pub defect_flags: BTreeSet<String>,
    #[serde(default)]
    pub magnitudes: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub none_selected: bool,
}

/// Running totals and cohort-relative standings for a premise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PremiseScores {
    pub total_intensity: u32,
    pub average_intensity: f64,
    pub total_pvi_raw: f64,
    pub average_pvi_raw: f64,
    pub total_absolute_pvi: f64,
    pub average_absolute_pvi: f64,
    pub relative_pvi: f64,
    pub violation_rate: f64,
    pub relative_violation_rate: f64,
}

/// Comparison group used when computing relative PVI after a submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CohortScope {
    #[default]
    District,
    Global,
}

impl CohortScope {
    pub const fn label(self) -> &'static str {
        match self {
            CohortScope::District => "district",
            CohortScope::Global => "global",
        }
    }
}

/// Listing filter; empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiseFilter {
    pub region: Option<String>,
    pub district: Option<String>,
}

impl PremiseFilter {
    pub fn matches(&self, premise: &Premise) -> bool {
        if let Some(region) = &self.region {
            if !premise.region.eq_ignore_ascii_case(region) {
                return false;
            }
        }
        if let Some(district) = &self.district {
            if !premise.district.eq_ignore_ascii_case(district) {
                return false;
            }
        }
        true
    }
}

/// Sanitized listing row: static attributes plus the derived scores,
/// without the full observation history.
#[derive(Debug, Clone, Serialize)]
pub struct PremiseScoreView {
    pub id: PremiseId,
    pub name: String,
    pub category: String,
    pub region: String,
    pub district: String,
    pub observation_count: usize,
    pub scores: PremiseScores,
}

/// Boundary validation failures for registrations and submissions.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("required field '{field}' is missing or empty")]
    MissingField { field: &'static str },
    #[error("unknown premise category '{category}'")]
    UnknownCategory { category: String },
}

/// Uppercases the first letter of each whitespace-separated word and
/// lowercases the rest, so register entries read consistently.
pub(crate) fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (index, word) in value.split_whitespace().enumerate() {
        if index > 0 {
            out.push(' ');
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.extend(chars.flat_map(|c| c.to_lowercase()));
        }
    }
    out
}
