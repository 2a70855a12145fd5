use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{AuditId, NdtTest, TestToggle};
use super::evaluators::evaluate;
use super::form::FormError;
use super::measurement::{MeasurementValue, Measurements};
use super::repository::{RepositoryError, SubmissionRepository};
use super::service::{FormServiceError, NdtFormService};
use super::submission::{PhotoAttachment, SubmissionError};

#[derive(Debug, Deserialize)]
pub(crate) struct EvaluateRequest {
    #[serde(default)]
    pub(crate) measurements: Measurements,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ToggleRequest {
    pub(crate) toggle: TestToggle,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum MeasurementUpdate {
    Single {
        field: String,
        value: MeasurementValue,
    },
    Bulk {
        measurements: Measurements,
    },
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SubmitRequest {
    #[serde(default)]
    pub(crate) photos: Vec<PhotoAttachment>,
}

/// Router builder exposing the NDT evaluation and form endpoints.
pub fn ndt_router<R>(service: Arc<NdtFormService<R>>) -> Router
where
    R: SubmissionRepository + 'static,
{
    Router::new()
        .route("/api/v1/ndt/:test/evaluate", post(evaluate_handler))
        .route(
            "/api/v1/audits/:audit_id/ndt",
            post(mount_handler::<R>).get(form_handler::<R>),
        )
        .route(
            "/api/v1/audits/:audit_id/ndt/:test/toggle",
            put(toggle_handler::<R>),
        )
        .route(
            "/api/v1/audits/:audit_id/ndt/:test/measurements",
            put(measurement_handler::<R>),
        )
        .route(
            "/api/v1/audits/:audit_id/ndt/submit",
            post(submit_handler::<R>),
        )
        .route(
            "/api/v1/audits/:audit_id/ndt/report",
            get(report_handler::<R>),
        )
        .with_state(service)
}

fn unknown_test(raw: &str) -> Response {
    let payload = json!({ "error": format!("unknown NDT test '{raw}'") });
    (StatusCode::NOT_FOUND, Json(payload)).into_response()
}

fn error_response(error: FormServiceError) -> Response {
    let status = match &error {
        FormServiceError::NotMounted(_) => StatusCode::NOT_FOUND,
        FormServiceError::InFlight(_)
        | FormServiceError::Form(FormError::ReadOnly { .. })
        | FormServiceError::Submission(SubmissionError::AlreadySubmitted(_))
        | FormServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        FormServiceError::Form(_) | FormServiceError::Submission(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        FormServiceError::Repository(_) => StatusCode::BAD_GATEWAY,
    };

    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

pub(crate) async fn evaluate_handler(
    Path(test): Path<String>,
    Json(request): Json<EvaluateRequest>,
) -> Response {
    match test.parse::<NdtTest>() {
        Ok(test) => {
            let result = evaluate(test, &request.measurements);
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(_) => unknown_test(&test),
    }
}

pub(crate) async fn mount_handler<R>(
    State(service): State<Arc<NdtFormService<R>>>,
    Path(audit_id): Path<String>,
) -> Response
where
    R: SubmissionRepository + 'static,
{
    match service.mount(&AuditId(audit_id)) {
        Ok(form) => (StatusCode::OK, Json(form)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn form_handler<R>(
    State(service): State<Arc<NdtFormService<R>>>,
    Path(audit_id): Path<String>,
) -> Response
where
    R: SubmissionRepository + 'static,
{
    match service.form(&AuditId(audit_id)) {
        Ok(form) => (StatusCode::OK, Json(form)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn toggle_handler<R>(
    State(service): State<Arc<NdtFormService<R>>>,
    Path((audit_id, test)): Path<(String, String)>,
    Json(request): Json<ToggleRequest>,
) -> Response
where
    R: SubmissionRepository + 'static,
{
    let Ok(parsed) = test.parse::<NdtTest>() else {
        return unknown_test(&test);
    };

    match service.set_toggle(&AuditId(audit_id), parsed, request.toggle) {
        Ok(entry) => (StatusCode::OK, Json(entry)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn measurement_handler<R>(
    State(service): State<Arc<NdtFormService<R>>>,
    Path((audit_id, test)): Path<(String, String)>,
    Json(update): Json<MeasurementUpdate>,
) -> Response
where
    R: SubmissionRepository + 'static,
{
    let Ok(parsed) = test.parse::<NdtTest>() else {
        return unknown_test(&test);
    };
    let audit_id = AuditId(audit_id);

    let outcome = match update {
        MeasurementUpdate::Single { field, value } => {
            service.record_measurement(&audit_id, parsed, &field, value)
        }
        MeasurementUpdate::Bulk { measurements } => {
            service.replace_measurements(&audit_id, parsed, measurements)
        }
    };

    match outcome {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<NdtFormService<R>>>,
    Path(audit_id): Path<String>,
    Json(request): Json<SubmitRequest>,
) -> Response
where
    R: SubmissionRepository + 'static,
{
    match service.submit(&AuditId(audit_id), request.photos) {
        Ok(receipt) => (StatusCode::ACCEPTED, Json(receipt)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn report_handler<R>(
    State(service): State<Arc<NdtFormService<R>>>,
    Path(audit_id): Path<String>,
) -> Response
where
    R: SubmissionRepository + 'static,
{
    match service.report(&AuditId(audit_id)) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}
