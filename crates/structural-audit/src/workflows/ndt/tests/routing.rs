use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::ndt::router::{evaluate_handler, EvaluateRequest};
use crate::workflows::ndt::{NdtFormService, NdtTest, TestToggle};

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("encode body")))
        .expect("request")
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn evaluate_handler_classifies_without_a_form() {
    let response = evaluate_handler(
        Path("half-cell-potential".to_string()),
        axum::Json(EvaluateRequest {
            measurements: [("potential", "-200")].into_iter().collect(),
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["tier"], "Moderate Risk");
    assert_eq!(payload["quantities"]["corrosion_probability"], 50.0);
}

#[tokio::test]
async fn evaluate_route_rejects_unknown_tests() {
    let (service, _) = build_service();
    let response = router_with_memory_repository(service)
        .oneshot(json_request(
            Method::POST,
            "/api/v1/ndt/schmidt_probe/evaluate",
            json!({ "measurements": {} }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "unknown NDT test 'schmidt_probe'");
}

#[tokio::test]
async fn wizard_flow_over_http_ends_in_a_read_only_form() {
    let (service, repository) = build_service();
    let app = router_with_memory_repository(service);
    let base = format!("/api/v1/audits/{}/ndt", audit_id());

    let mounted = app
        .clone()
        .oneshot(empty_request(Method::POST, &base))
        .await
        .expect("mount");
    assert_eq!(mounted.status(), StatusCode::OK);

    let toggled = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("{base}/crushing_strength/toggle"),
            json!({ "toggle": "performed" }),
        ))
        .await
        .expect("toggle");
    assert_eq!(toggled.status(), StatusCode::OK);
    let entry = read_json_body(toggled).await;
    assert_eq!(entry["toggle"], "performed");
    assert_eq!(entry["result"]["tier"], "Highly Defective");

    let measured = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("{base}/crushing_strength/measurements"),
            json!({ "field": "strength", "value": "88" }),
        ))
        .await
        .expect("measure");
    assert_eq!(measured.status(), StatusCode::OK);
    assert_eq!(read_json_body(measured).await["tier"], "Good");

    let submitted = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("{base}/submit"),
            json!({ "photos": [] }),
        ))
        .await
        .expect("submit");
    assert_eq!(submitted.status(), StatusCode::ACCEPTED);
    assert_eq!(read_json_body(submitted).await["reference"], "ndt-1");
    assert_eq!(repository.persist_count(), 1);

    let locked = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("{base}/crushing_strength/measurements"),
            json!({ "measurements": { "strength": 40 } }),
        ))
        .await
        .expect("edit after submit");
    assert_eq!(locked.status(), StatusCode::CONFLICT);

    let report = app
        .oneshot(empty_request(Method::GET, &format!("{base}/report")))
        .await
        .expect("report");
    assert_eq!(report.status(), StatusCode::OK);
    let report = read_json_body(report).await;
    assert_eq!(report["submitted"], true);
    assert_eq!(report["sections"][0]["test"], "crushing_strength");
}

#[tokio::test]
async fn form_errors_map_to_unprocessable_entity() {
    let (service, _) = build_service();
    service.mount(&audit_id()).expect("mount");
    let app = router_with_memory_repository(service);

    let response = app
        .oneshot(json_request(
            Method::PUT,
            &format!("/api/v1/audits/{}/ndt/sulfate/measurements", audit_id()),
            json!({ "field": "content", "value": 0.2 }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unmounted_forms_are_not_found() {
    let (service, _) = build_service();
    let app = router_with_memory_repository(service);

    let response = app
        .oneshot(empty_request(
            Method::GET,
            &format!("/api/v1/audits/{}/ndt", audit_id()),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn persistence_failures_map_to_bad_gateway() {
    let service = Arc::new(NdtFormService::new(
        Arc::new(UnavailableRepository),
        limits(),
    ));
    service.mount(&audit_id()).expect("mount");
    service
        .set_toggle(&audit_id(), NdtTest::Sulfate, TestToggle::Performed)
        .expect("toggle");

    let response = crate::workflows::ndt::router::submit_handler::<UnavailableRepository>(
        State(service.clone()),
        Path(audit_id().0),
        axum::Json(Default::default()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(!service.form(&audit_id()).expect("form").is_read_only());
}
