// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use mcp_query_client::query::{check_health, QueryError};
use mcp_query_client::ClientConfig;
use url::Url;

use super::fake_backend::{unused_origin, vehicle_result, FakeBackend, Reply};

#[tokio::test]
async fn test_health_check_reports_ready_backend() {
    let backend = FakeBackend::start(Reply::Json(vehicle_result())).await;
    let config = ClientConfig {
        origin: backend.origin(),
        fallback_url: backend.query_url(),
        ..ClientConfig::default()
    };

    for url in config.health_endpoints().unwrap() {
        let health = check_health(&url, Some(5000)).await.unwrap();
        assert!(health.is_healthy());
    }
    assert_eq!(backend.hits(), 0);
}

#[tokio::test]
async fn test_health_check_unreachable() {
    let url = Url::parse(&format!("{}/api/health", unused_origin())).unwrap();
    let result = check_health(&url, None).await;
    assert!(matches!(result, Err(QueryError::Transport { .. })));
}
