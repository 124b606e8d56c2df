use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::response::IntoResponse;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::{classifier_outputs, read_json_body, reference_payload, service_with, StubModel};
use crate::scoring::router::{predict_handler, PREDICT_PATH, PREDICT_V1_PATH};
use crate::scoring::{parse_record, prediction_router, ModelError, RequestError, POOR_THRESHOLD};

fn post_json(path: &str, body: impl Into<Body>) -> Request<Body> {
    Request::post(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .expect("request builds")
}

#[tokio::test]
async fn predict_route_returns_documented_shape() {
    let (service, _) =
        service_with(StubModel::returning(classifier_outputs([2.0, -1.0, 0.5])), None);
    let router = prediction_router(Arc::new(service));

    let response = router
        .oneshot(post_json(PREDICT_PATH, reference_payload().to_string()))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["success"], json!(true));
    assert_eq!(payload["prediction"], json!("Good"));
    assert_eq!(payload["classIndex"], json!(0));
    assert_eq!(payload["details"]["risk_threshold_used"], json!(POOR_THRESHOLD));
    assert!(payload.get("error").is_none());

    let probabilities = &payload["details"]["probabilities"];
    let total: f64 = ["Good", "Poor", "Standard"]
        .iter()
        .map(|key| probabilities[*key].as_f64().expect("probability present"))
        .sum();
    assert!((total - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn versioned_route_serves_the_same_handler() {
    let (service, _) =
        service_with(StubModel::returning(classifier_outputs([-2.0, 1.5, 0.0])), None);
    let router = prediction_router(Arc::new(service));

    let response = router
        .oneshot(post_json(PREDICT_V1_PATH, reference_payload().to_string()))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["prediction"], json!("Poor"));
    assert_eq!(payload["classIndex"], json!(1));
}

#[tokio::test]
async fn empty_body_is_missing_input() {
    let (service, model) =
        service_with(StubModel::returning(classifier_outputs([0.0, 0.0, 0.0])), None);
    let service = Arc::new(service);

    for body in ["", "  \n", "null"] {
        let response = predict_handler(State(Arc::clone(&service)), Bytes::from(body))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body:?}");
        let payload = read_json_body(response).await;
        assert_eq!(
            payload,
            json!({ "success": false, "error": "No data provided" })
        );
    }
    assert!(model.last_row().is_none());
}

#[tokio::test]
async fn malformed_body_is_a_client_error() {
    let (service, _) =
        service_with(StubModel::returning(classifier_outputs([0.0, 0.0, 0.0])), None);
    let router = prediction_router(Arc::new(service));

    let response = router
        .oneshot(post_json(PREDICT_PATH, "{\"Annual_Income\": "))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], json!("Invalid request body"));
}

#[tokio::test]
async fn model_failure_is_a_generic_server_error() {
    let (service, _) = service_with(
        StubModel::failing(ModelError::Inference("input shape [1, 14]".to_string())),
        None,
    );
    let router = prediction_router(Arc::new(service));

    let response = router
        .oneshot(post_json(PREDICT_PATH, reference_payload().to_string()))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload: Value = read_json_body(response).await;
    assert_eq!(
        payload,
        json!({ "success": false, "error": "Internal Server Error" })
    );
}

#[tokio::test]
async fn invalid_scores_are_not_reported_as_poor() {
    let (service, _) = service_with(
        StubModel::returning(vec![
            crate::scoring::ModelOutput::opaque("label"),
            crate::scoring::ModelOutput::opaque("probabilities"),
        ]),
        None,
    );
    let router = prediction_router(Arc::new(service));

    let response = router
        .oneshot(post_json(PREDICT_PATH, reference_payload().to_string()))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert_eq!(payload["success"], json!(false));
    assert!(payload.get("prediction").is_none());
}

#[test]
fn parse_record_rejects_non_objects() {
    assert_eq!(parse_record(b"[1, 2]"), Err(RequestError::InvalidBody));
    assert_eq!(parse_record(b"42"), Err(RequestError::InvalidBody));
    assert_eq!(parse_record(b"true"), Err(RequestError::InvalidBody));
    assert_eq!(parse_record(b"\"Good\""), Err(RequestError::InvalidBody));
    assert!(parse_record(b"{}").is_ok());
}

#[test]
fn parse_record_treats_blank_scalars_as_missing() {
    for body in ["false", "0", "0.0", "\"\""] {
        assert_eq!(
            parse_record(body.as_bytes()),
            Err(RequestError::MissingInput),
            "body {body:?}"
        );
    }
}
