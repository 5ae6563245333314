// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for the query client

use std::env;
use url::Url;

use crate::query::QueryError;
use crate::render::HeaderStrategy;

/// Route served by the backend for health checks
const HEALTH_PATH: &str = "/api/health";

/// Configuration for the query client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin the primary path is resolved against
    pub origin: String,
    /// Relative path of the primary query route
    pub primary_path: String,
    /// Absolute address of the direct backend query route
    pub fallback_url: String,
    /// Per-attempt timeout in milliseconds; `None` waits indefinitely
    pub request_timeout_ms: Option<u64>,
    /// How table headers are derived from result rows
    pub header_strategy: HeaderStrategy,
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            origin: env::var("QUERY_API_ORIGIN").unwrap_or(defaults.origin),
            primary_path: env::var("QUERY_API_PATH").unwrap_or(defaults.primary_path),
            fallback_url: env::var("QUERY_FALLBACK_URL").unwrap_or(defaults.fallback_url),
            request_timeout_ms: env::var("QUERY_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok()),
            header_strategy: env::var("QUERY_HEADER_STRATEGY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.header_strategy),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        Url::parse(&self.origin).map_err(|e| format!("Invalid origin '{}': {}", self.origin, e))?;
        if !self.primary_path.starts_with('/') {
            return Err(format!(
                "Primary path must be relative to the origin and start with '/': {}",
                self.primary_path
            ));
        }
        Url::parse(&self.fallback_url)
            .map_err(|e| format!("Invalid fallback URL '{}': {}", self.fallback_url, e))?;
        if self.request_timeout_ms == Some(0) {
            return Err("Request timeout must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Primary query route resolved against the origin
    pub fn primary_endpoint(&self) -> Result<Url, QueryError> {
        join(&self.origin, &self.primary_path)
    }

    /// Direct backend query route
    pub fn fallback_endpoint(&self) -> Result<Url, QueryError> {
        Url::parse(&self.fallback_url).map_err(|e| QueryError::InvalidEndpoint {
            reason: format!("{}: {}", self.fallback_url, e),
        })
    }

    /// Health routes for the origin and the direct backend, in that order
    pub fn health_endpoints(&self) -> Result<[Url; 2], QueryError> {
        Ok([
            join(&self.origin, HEALTH_PATH)?,
            join(&self.fallback_url, HEALTH_PATH)?,
        ])
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:3000".to_string(),
            primary_path: "/api/query".to_string(),
            fallback_url: "http://localhost:8000/api/query".to_string(),
            request_timeout_ms: None,
            header_strategy: HeaderStrategy::FirstRow,
        }
    }
}

fn join(base: &str, path: &str) -> Result<Url, QueryError> {
    Url::parse(base)
        .and_then(|url| url.join(path))
        .map_err(|e| QueryError::InvalidEndpoint {
            reason: format!("{} + {}: {}", base, path, e),
        })
}
