// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use mcp_query_client::query::{
    DataSource, Query, SubmissionController, SubmissionState, BACKEND_UNAVAILABLE_MESSAGE,
};
use mcp_query_client::ClientConfig;
use serde_json::json;

use super::fake_backend::{unused_origin, vehicle_result, FakeBackend, Reply};

fn controller_for(origin: String, fallback_url: String) -> SubmissionController {
    let config = ClientConfig {
        origin,
        fallback_url,
        ..ClientConfig::default()
    };
    SubmissionController::from_config(&config).expect("Failed to build controller")
}

fn query(text: &str) -> Query {
    Query::new(text).unwrap()
}

#[tokio::test]
async fn test_primary_success_never_contacts_fallback() {
    let primary = FakeBackend::start(Reply::Json(vehicle_result())).await;
    let fallback = FakeBackend::start(Reply::Json(vehicle_result())).await;
    let controller = controller_for(primary.origin(), fallback.query_url());

    let state = controller
        .submit(query("  What Tesla models are available? "))
        .await;

    match state {
        SubmissionState::Succeeded(result) => {
            assert_eq!(result.source, DataSource::GcpBigquery);
            assert_eq!(result.confidence, 0.92);
        }
        other => panic!("expected success, got {:?}", other),
    }
    assert_eq!(primary.queries(), ["What Tesla models are available?"]);
    assert_eq!(fallback.hits(), 0);
}

#[tokio::test]
async fn test_proxy_error_falls_back_once() {
    let primary = FakeBackend::start(Reply::Status(
        500,
        "Proxy error: Could not proxy request /api/query from localhost:3000 to http://localhost:8000/ (ECONNREFUSED).",
    ))
    .await;
    let fallback = FakeBackend::start(Reply::Json(vehicle_result())).await;
    let controller = controller_for(primary.origin(), fallback.query_url());

    let state = controller.submit(query("What Tesla models are available?")).await;

    assert!(matches!(state, SubmissionState::Succeeded(_)));
    assert_eq!(primary.hits(), 1);
    assert_eq!(fallback.hits(), 1);
    assert_eq!(fallback.queries(), ["What Tesla models are available?"]);
}

#[tokio::test]
async fn test_html_response_falls_back() {
    let primary = FakeBackend::start(Reply::Html).await;
    let fallback = FakeBackend::start(Reply::Json(vehicle_result())).await;
    let controller = controller_for(primary.origin(), fallback.query_url());

    let state = controller.submit(query("Show me Texas tax information")).await;

    assert!(matches!(state, SubmissionState::Succeeded(_)));
    assert_eq!(fallback.hits(), 1);
}

#[tokio::test]
async fn test_bad_gateway_falls_back() {
    let primary = FakeBackend::start(Reply::Status(502, "upstream unavailable")).await;
    let fallback = FakeBackend::start(Reply::Json(vehicle_result())).await;
    let controller = controller_for(primary.origin(), fallback.query_url());

    let state = controller.submit(query("Compare Colorado tax rates")).await;

    assert!(matches!(state, SubmissionState::Succeeded(_)));
    assert_eq!(fallback.hits(), 1);
}

#[tokio::test]
async fn test_loosely_typed_answer_is_not_retried() {
    let primary = FakeBackend::start(Reply::Json(json!({
        "status": "success",
        "source": null,
        "query": 7,
        "data": [{"a": 1}]
    })))
    .await;
    let fallback = FakeBackend::start(Reply::Status(500, "boom")).await;
    let controller = controller_for(primary.origin(), fallback.query_url());

    let state = controller.submit(query("test")).await;

    match state {
        SubmissionState::Succeeded(result) => {
            assert_eq!(result.source, DataSource::default());
            assert_eq!(result.query.as_deref(), Some("7"));
        }
        other => panic!("expected success, got {:?}", other),
    }
    assert_eq!(primary.hits(), 1);
    assert_eq!(fallback.hits(), 0);
}

#[tokio::test]
async fn test_not_found_is_reported_without_fallback() {
    let primary = FakeBackend::start(Reply::Status(404, "missing")).await;
    let fallback = FakeBackend::start(Reply::Json(vehicle_result())).await;
    let controller = controller_for(primary.origin(), fallback.query_url());

    let state = controller.submit(query("test")).await;

    assert_eq!(
        state,
        SubmissionState::Failed("Network error: HTTP 404: Not Found".to_string())
    );
    assert_eq!(fallback.hits(), 0);
}

#[tokio::test]
async fn test_backend_error_detail_is_not_mistaken_for_proxy_failure() {
    // A genuine backend error whose text happens to mention a proxy
    let primary = FakeBackend::start(Reply::Status(
        500,
        r#"{"detail":"Query error: Proxy error in upstream table"}"#,
    ))
    .await;
    let fallback = FakeBackend::start(Reply::Json(vehicle_result())).await;
    let controller = controller_for(primary.origin(), fallback.query_url());

    let state = controller.submit(query("test")).await;

    assert_eq!(
        state,
        SubmissionState::Failed("Network error: HTTP 500: Internal Server Error".to_string())
    );
    assert_eq!(fallback.hits(), 0);
}

#[tokio::test]
async fn test_unreachable_primary_is_not_retried() {
    let fallback = FakeBackend::start(Reply::Json(vehicle_result())).await;
    let controller = controller_for(unused_origin(), fallback.query_url());

    let state = controller.submit(query("test")).await;

    match state {
        SubmissionState::Failed(message) => assert!(message.starts_with("Network error: ")),
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(fallback.hits(), 0);
}

#[tokio::test]
async fn test_both_endpoints_failing_reports_unavailable() {
    let primary = FakeBackend::start(Reply::Status(503, "maintenance")).await;
    let fallback = FakeBackend::start(Reply::Status(500, "boom")).await;
    let controller = controller_for(primary.origin(), fallback.query_url());

    let state = controller.submit(query("test")).await;

    assert_eq!(
        state,
        SubmissionState::Failed(BACKEND_UNAVAILABLE_MESSAGE.to_string())
    );
    assert_eq!(primary.hits(), 1);
    assert_eq!(fallback.hits(), 1);
}

#[tokio::test]
async fn test_unreachable_fallback_reports_unavailable() {
    let primary = FakeBackend::start(Reply::Html).await;
    let controller = controller_for(primary.origin(), format!("{}/api/query", unused_origin()));

    let state = controller.submit(query("test")).await;

    assert_eq!(
        state,
        SubmissionState::Failed(BACKEND_UNAVAILABLE_MESSAGE.to_string())
    );
}

#[tokio::test]
async fn test_controller_state_follows_submission() {
    let primary = FakeBackend::start(Reply::Json(vehicle_result())).await;
    let controller = controller_for(primary.origin(), format!("{}/api/query", unused_origin()));
    assert_eq!(controller.state(), SubmissionState::Idle);

    let state = controller.submit(query("test")).await;

    assert!(!controller.is_pending());
    assert_eq!(controller.state(), state);
    assert_eq!(controller.subscribe().borrow().generation, 1);
}
