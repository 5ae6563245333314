// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Backend health check

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::endpoint::{classify_status, map_transport_error};
use super::types::QueryError;

/// Body returned by the backend's health route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub orchestrator_ready: bool,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy" && self.orchestrator_ready
    }
}

/// Check a health route
pub async fn check_health(
    url: &Url,
    timeout_ms: Option<u64>,
) -> Result<HealthStatus, QueryError> {
    let mut builder = Client::builder();
    if let Some(ms) = timeout_ms {
        builder = builder.timeout(Duration::from_millis(ms));
    }
    let client = builder.build().map_err(|e| QueryError::InvalidEndpoint {
        reason: format!("failed to create HTTP client: {}", e),
    })?;

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| map_transport_error(e, timeout_ms))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| map_transport_error(e, timeout_ms))?;

    if !status.is_success() {
        return Err(classify_status(status, &body));
    }

    serde_json::from_str(&body).map_err(|e| QueryError::MalformedResponse {
        message: e.to_string(),
    })
}
