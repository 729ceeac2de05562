use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationId, JobApplication, PreScreeningAnswerInput};
use super::repository::{ApplicationRepository, CvRepository, InstructionsSource, RepositoryError};
use super::service::{ScreeningService, ScreeningServiceError};

/// Router builder exposing HTTP endpoints for intake, pre-screening, and
/// CV screening.
pub fn screening_router<R, C, G>(service: Arc<ScreeningService<R, C, G>>) -> Router
where
    R: ApplicationRepository + 'static,
    C: CvRepository + 'static,
    G: InstructionsSource + 'static,
{
    Router::new()
        .route(
            "/api/v1/screening/applications",
            post(apply_handler::<R, C, G>),
        )
        .route(
            "/api/v1/screening/applications/:application_id",
            get(status_handler::<R, C, G>),
        )
        .route(
            "/api/v1/screening/applications/:application_id/screen",
            post(screen_handler::<R, C, G>),
        )
        .route(
            "/api/v1/screening/applications/:application_id/analyze",
            post(analyze_handler::<R, C, G>),
        )
        .route(
            "/api/v1/screening/applications/:application_id/pre-screening",
            post(pre_screening_handler::<R, C, G>),
        )
        .with_state(service)
}

/// Body for screen/analyze calls; the email must match the application.
#[derive(Debug, Deserialize)]
pub(crate) struct ScreenRequest {
    pub(crate) email: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PreScreeningRequest {
    pub(crate) answers: Vec<PreScreeningAnswerInput>,
}

pub(crate) async fn apply_handler<R, C, G>(
    State(service): State<Arc<ScreeningService<R, C, G>>>,
    axum::Json(application): axum::Json<JobApplication>,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: CvRepository + 'static,
    G: InstructionsSource + 'static,
{
    match service.apply(application) {
        Ok(record) => (StatusCode::ACCEPTED, axum::Json(record.status_view())).into_response(),
        Err(ScreeningServiceError::Repository(RepositoryError::Conflict)) => {
            let payload = json!({
                "error": "Job Application Failed",
                "message": "You have a pending application for this role.",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => error_response(other),
    }
}

pub(crate) async fn status_handler<R, C, G>(
    State(service): State<Arc<ScreeningService<R, C, G>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: CvRepository + 'static,
    G: InstructionsSource + 'static,
{
    let id = ApplicationId(application_id);
    match service.get(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(other) => error_response(other),
    }
}

pub(crate) async fn screen_handler<R, C, G>(
    State(service): State<Arc<ScreeningService<R, C, G>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<ScreenRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: CvRepository + 'static,
    G: InstructionsSource + 'static,
{
    let id = ApplicationId(application_id);
    match service.screen_cv(&id, &request.email).await {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(other) => error_response(other),
    }
}

pub(crate) async fn analyze_handler<R, C, G>(
    State(service): State<Arc<ScreeningService<R, C, G>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<ScreenRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: CvRepository + 'static,
    G: InstructionsSource + 'static,
{
    let id = ApplicationId(application_id);
    match service.analyze_cv(&id, &request.email).await {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(other) => error_response(other),
    }
}

pub(crate) async fn pre_screening_handler<R, C, G>(
    State(service): State<Arc<ScreeningService<R, C, G>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<PreScreeningRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: CvRepository + 'static,
    G: InstructionsSource + 'static,
{
    let id = ApplicationId(application_id);
    match service.submit_pre_screening(&id, request.answers) {
        Ok(receipt) => (StatusCode::OK, axum::Json(receipt)).into_response(),
        Err(other) => error_response(other),
    }
}

/// Map service failures onto specific, actionable payloads: missing inputs
/// are caller errors with distinct messages; cascade exhaustion is reported
/// as an upstream failure worth retrying.
fn error_response(error: ScreeningServiceError) -> Response {
    match error {
        ScreeningServiceError::ApplicationNotFound => {
            let payload = json!({
                "error": "CV Screening Failed",
                "message": "No application found for the selected job.",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        ScreeningServiceError::CvNotFound => {
            let payload = json!({
                "error": "CV Screening Failed",
                "message": "You have not uploaded a CV for this application.",
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        ScreeningServiceError::Cascade(err) => {
            tracing::error!(error = %err, "screening cascade exhausted");
            let payload = json!({
                "error": "CV Screening Failed",
                "message": "Screening failed, please retry.",
            });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
