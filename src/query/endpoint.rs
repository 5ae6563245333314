// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Query endpoint trait and its HTTP implementation
//!
//! The endpoint is the transport boundary: it turns raw HTTP failures into
//! typed [`QueryError`] kinds so the controller can decide on fallback
//! without looking at message text.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::types::{Query, QueryError, QueryRequest, QueryResult};

/// Marker the development proxy puts at the start of its error bodies
const PROXY_ERROR_PREFIX: &str = "Proxy error";

/// Trait for anything that can answer a query
#[async_trait]
pub trait QueryEndpoint: Send + Sync {
    /// Submit a query and parse the backend's result document
    async fn submit(&self, query: &Query) -> Result<QueryResult, QueryError>;

    /// Endpoint name for logging
    fn name(&self) -> &str;

    /// Address the endpoint posts to
    fn url(&self) -> &str;
}

/// Query endpoint reached over HTTP
pub struct HttpEndpoint {
    name: String,
    url: Url,
    client: Client,
    timeout_ms: Option<u64>,
}

impl HttpEndpoint {
    /// Create a new HTTP endpoint
    ///
    /// # Arguments
    /// * `name` - Label used in log lines
    /// * `url` - Absolute address of the query route
    /// * `timeout_ms` - Optional per-attempt timeout; `None` waits indefinitely
    pub fn new(
        name: impl Into<String>,
        url: Url,
        timeout_ms: Option<u64>,
    ) -> Result<Self, QueryError> {
        let mut builder = Client::builder();
        if let Some(ms) = timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let client = builder.build().map_err(|e| QueryError::InvalidEndpoint {
            reason: format!("failed to create HTTP client: {}", e),
        })?;

        Ok(Self {
            name: name.into(),
            url,
            client,
            timeout_ms,
        })
    }

}

#[async_trait]
impl QueryEndpoint for HttpEndpoint {
    async fn submit(&self, query: &Query) -> Result<QueryResult, QueryError> {
        debug!("POST {} ({})", self.url, self.name);

        let response = self
            .client
            .post(self.url.clone())
            .json(&QueryRequest::from(query))
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.timeout_ms))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| map_transport_error(e, self.timeout_ms))?;

        if !status.is_success() {
            return Err(classify_status(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| QueryError::MalformedResponse {
            message: e.to_string(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn url(&self) -> &str {
        self.url.as_str()
    }
}

/// Map a failed send or body read, reporting configured timeouts as such
pub(crate) fn map_transport_error(error: reqwest::Error, timeout_ms: Option<u64>) -> QueryError {
    match timeout_ms {
        Some(timeout_ms) if error.is_timeout() => QueryError::Timeout { timeout_ms },
        _ => QueryError::Transport {
            message: error.to_string(),
        },
    }
}

/// Classify a non-success response
///
/// Gateway statuses, and server errors whose body carries the proxy marker,
/// become [`QueryError::Gateway`]; everything else is a plain HTTP error.
pub(crate) fn classify_status(status: StatusCode, body: &str) -> QueryError {
    let status_text = status.canonical_reason().unwrap_or("").to_string();
    let body = body.trim_start();

    let proxy_body = status.is_server_error() && body.starts_with(PROXY_ERROR_PREFIX);
    let gateway_status = matches!(
        status,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
    );

    if proxy_body || gateway_status {
        let message = if proxy_body {
            body.lines().next().unwrap_or_default().to_string()
        } else {
            status_text
        };
        return QueryError::Gateway {
            status: status.as_u16(),
            message,
        };
    }

    QueryError::Http {
        status: status.as_u16(),
        status_text,
    }
}
