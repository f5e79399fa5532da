//! Premise register, observation scoring engine, and reporting rollups.
//!
//! `scoring` is the heart of the crate: it converts raw inspection
//! checklists into intensity and PVI scores, keeps premise aggregates
//! current, and ranks premises within their comparison cohorts. The
//! surrounding modules feed it (`register`, `service`, `router`) or read
//! from it (`report`).

pub mod domain;
pub mod register;
pub mod report;
pub mod router;
pub mod scoring;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    CohortScope, Coordinates, Observation, ObservationSubmission, Premise, PremiseFilter,
    PremiseId, PremiseRegistration, PremiseScoreView, PremiseScores, ValidationError,
    KNOWN_CATEGORIES,
};
pub use register::{PremiseRegisterImporter, RegisterImportError, RegisterImportSummary};
pub use report::{DistrictSummary, PeriodKind, PeriodRollup};
pub use router::inspection_router;
pub use scoring::{
    RecalculationFailure, RecalculationSummary, ScoringConfig, ScoringConfigDraft, ScoringEngine,
};
pub use service::{InspectionService, ObservationReceipt, ServiceError};
pub use store::{ConfigStore, ConfigStoreError, PremiseStore, StoreError};
