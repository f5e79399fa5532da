use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    CohortScope, ObservationSubmission, PremiseFilter, PremiseId, PremiseRegistration,
};
use super::report::PeriodKind;
use super::scoring::ScoringConfigDraft;
use super::service::{InspectionService, ServiceError};
use super::store::{ConfigStore, PremiseStore};

/// Router builder exposing the scoring engine and register over HTTP.
pub fn inspection_router<S, C>(service: Arc<InspectionService<S, C>>) -> Router
where
    S: PremiseStore + 'static,
    C: ConfigStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/premises",
            post(register_handler::<S, C>).get(list_handler::<S, C>),
        )
        .route("/api/v1/premises/:premise_id", get(premise_handler::<S, C>))
        .route(
            "/api/v1/premises/:premise_id/observations",
            post(submit_handler::<S, C>).get(observations_handler::<S, C>),
        )
        .route(
            "/api/v1/scoring/config",
            get(config_handler::<S, C>).put(update_config_handler::<S, C>),
        )
        .route(
            "/api/v1/scoring/recalculate",
            post(recalculate_handler::<S, C>),
        )
        .route("/api/v1/reports/districts", get(districts_handler::<S, C>))
        .route("/api/v1/reports/periods", get(periods_handler::<S, C>))
        .with_state(service)
}

/// Wire shape for one observation submission.
#[derive(Debug, Deserialize)]
pub(crate) struct SubmitObservationRequest {
    date: NaiveDate,
    #[serde(default)]
    defect_flags: BTreeSet<String>,
    #[serde(default)]
    magnitudes: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    none_selected: bool,
    #[serde(default)]
    cohort_scope: CohortScope,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PeriodReportQuery {
    #[serde(default)]
    kind: Option<PeriodKind>,
}

pub(crate) async fn register_handler<S, C>(
    State(service): State<Arc<InspectionService<S, C>>>,
    axum::Json(registration): axum::Json<PremiseRegistration>,
) -> Response
where
    S: PremiseStore + 'static,
    C: ConfigStore + 'static,
{
    match service.register(registration) {
        Ok(premise) => (StatusCode::CREATED, axum::Json(premise)).into_response(),
        Err(ServiceError::Validation(error)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn list_handler<S, C>(
    State(service): State<Arc<InspectionService<S, C>>>,
    Query(filter): Query<PremiseFilter>,
) -> Response
where
    S: PremiseStore + 'static,
    C: ConfigStore + 'static,
{
    match service.premises(&filter) {
        Ok(views) => (StatusCode::OK, axum::Json(views)).into_response(),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn premise_handler<S, C>(
    State(service): State<Arc<InspectionService<S, C>>>,
    Path(premise_id): Path<String>,
) -> Response
where
    S: PremiseStore + 'static,
    C: ConfigStore + 'static,
{
    let id = PremiseId(premise_id);
    match service.premise(&id) {
        Ok(premise) => (StatusCode::OK, axum::Json(premise)).into_response(),
        Err(ServiceError::PremiseNotFound(id)) => premise_not_found(&id),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn submit_handler<S, C>(
    State(service): State<Arc<InspectionService<S, C>>>,
    Path(premise_id): Path<String>,
    axum::Json(request): axum::Json<SubmitObservationRequest>,
) -> Response
where
    S: PremiseStore + 'static,
    C: ConfigStore + 'static,
{
    let id = PremiseId(premise_id);
    let submission = ObservationSubmission {
        date: request.date,
        defect_flags: request.defect_flags,
        magnitudes: request.magnitudes,
        none_selected: request.none_selected,
    };

    match service.submit(&id, submission, request.cohort_scope) {
        Ok(receipt) => (StatusCode::CREATED, axum::Json(receipt)).into_response(),
        Err(ServiceError::PremiseNotFound(id)) => premise_not_found(&id),
        Err(ServiceError::Validation(error)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn observations_handler<S, C>(
    State(service): State<Arc<InspectionService<S, C>>>,
    Path(premise_id): Path<String>,
) -> Response
where
    S: PremiseStore + 'static,
    C: ConfigStore + 'static,
{
    let id = PremiseId(premise_id);
    match service.observations(&id) {
        Ok(observations) => (StatusCode::OK, axum::Json(observations)).into_response(),
        Err(ServiceError::PremiseNotFound(id)) => premise_not_found(&id),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn config_handler<S, C>(
    State(service): State<Arc<InspectionService<S, C>>>,
) -> Response
where
    S: PremiseStore + 'static,
    C: ConfigStore + 'static,
{
    match service.scoring_config() {
        Ok(config) => (StatusCode::OK, axum::Json(config)).into_response(),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn update_config_handler<S, C>(
    State(service): State<Arc<InspectionService<S, C>>>,
    axum::Json(draft): axum::Json<ScoringConfigDraft>,
) -> Response
where
    S: PremiseStore + 'static,
    C: ConfigStore + 'static,
{
    match service.update_scoring_config(draft) {
        Ok(config) => (StatusCode::OK, axum::Json(config)).into_response(),
        Err(ServiceError::Config(error)) => {
            let payload = json!({ "error": error.to_string(), "field": error.field });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn recalculate_handler<S, C>(
    State(service): State<Arc<InspectionService<S, C>>>,
) -> Response
where
    S: PremiseStore + 'static,
    C: ConfigStore + 'static,
{
    match service.recalculate() {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn districts_handler<S, C>(
    State(service): State<Arc<InspectionService<S, C>>>,
) -> Response
where
    S: PremiseStore + 'static,
    C: ConfigStore + 'static,
{
    match service.district_report() {
        Ok(summaries) => (StatusCode::OK, axum::Json(summaries)).into_response(),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn periods_handler<S, C>(
    State(service): State<Arc<InspectionService<S, C>>>,
    Query(query): Query<PeriodReportQuery>,
) -> Response
where
    S: PremiseStore + 'static,
    C: ConfigStore + 'static,
{
    let kind = query.kind.unwrap_or_default();
    match service.period_report(kind) {
        Ok(rollups) => (StatusCode::OK, axum::Json(rollups)).into_response(),
        Err(other) => internal_error(other),
    }
}

fn premise_not_found(id: &PremiseId) -> Response {
    let payload = json!({ "error": format!("premise '{id}' not found") });
    (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
}

fn internal_error(error: ServiceError) -> Response {
    let payload = json!({ "error": error.to_string() });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
