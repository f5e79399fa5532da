//! Core library for the premise-inspection scoring service.
//!
//! The `inspections` module carries the domain model and the observation
//! scoring engine; `config`, `telemetry`, and `error` provide the shared
//! application plumbing used by the deployable services.

pub mod config;
pub mod error;
pub mod inspections;
pub mod telemetry;
