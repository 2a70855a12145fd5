use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;
use structural_audit::error::AppError;
use structural_audit::workflows::ndt::{
    ndt_router, AuditId, FieldLogImporter, NdtFormService, NdtReport, SubmissionRepository,
};

#[derive(Debug, Deserialize)]
pub(crate) struct FieldLogReportRequest {
    pub(crate) audit_id: String,
    pub(crate) csv: String,
}

pub(crate) fn with_ndt_routes<R>(service: Arc<NdtFormService<R>>) -> axum::Router
where
    R: SubmissionRepository + 'static,
{
    ndt_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/ndt/field-log/report",
            axum::routing::post(field_log_report_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Evaluate an uploaded field log and return the report without touching any stored form.
pub(crate) async fn field_log_report_endpoint(
    Json(payload): Json<FieldLogReportRequest>,
) -> Result<Json<NdtReport>, AppError> {
    let FieldLogReportRequest { audit_id, csv } = payload;
    let reader = Cursor::new(csv.into_bytes());
    let form = FieldLogImporter::from_reader(AuditId(audit_id), reader)?;
    Ok(Json(NdtReport::from_form(&form)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::InMemorySubmissionRepository;
    use axum::body::Body;
    use axum::http::Request;
    use structural_audit::workflows::ndt::{NdtTest, Severity, SubmissionLimits};
    use tower::ServiceExt;

    #[tokio::test]
    async fn field_log_report_endpoint_evaluates_rows() {
        let request = FieldLogReportRequest {
            audit_id: "AUD-77".to_string(),
            csv: "Test,Field,Value\n\
concrete_cover,required_cover,40\n\
concrete_cover,measured_cover,29\n\
carbonation,status,skipped\n"
                .to_string(),
        };

        let Json(report) = field_log_report_endpoint(Json(request))
            .await
            .expect("report builds");

        assert_eq!(report.audit_id, AuditId("AUD-77".to_string()));
        assert_eq!(report.sections.len(), 1);
        assert_eq!(report.sections[0].tier, "Severe Cover Deficiency");
        assert_eq!(report.overall_severity, Some(Severity::Severe));
        assert_eq!(report.skipped, vec![NdtTest::Carbonation]);
    }

    #[tokio::test]
    async fn field_log_report_endpoint_rejects_unknown_tests() {
        let request = FieldLogReportRequest {
            audit_id: "AUD-77".to_string(),
            csv: "Test,Field,Value\nground_radar,depth,3\n".to_string(),
        };

        let error = field_log_report_endpoint(Json(request))
            .await
            .expect_err("unknown test");
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_route_is_served_alongside_ndt_routes() {
        let service = Arc::new(NdtFormService::new(
            Arc::new(InMemorySubmissionRepository::default()),
            SubmissionLimits::default(),
        ));

        let response = with_ndt_routes(service)
            .oneshot(
                Request::get("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
    }
}
