// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for query dispatch

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// User-facing text shown when neither endpoint could answer
pub const BACKEND_UNAVAILABLE_MESSAGE: &str =
    "Backend not available. Please ensure the backend server is running.";

/// A single result row; column order follows the backend's key order
pub type Row = Map<String, Value>;

/// A trimmed, non-empty question destined for the routing backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Query(String);

impl Query {
    /// Build a query from raw user text, trimming surrounding whitespace
    pub fn new(raw: &str) -> Result<Self, QueryError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(QueryError::EmptyQuery);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Request body sent to both endpoints
#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
    pub query: &'a str,
}

impl<'a> From<&'a Query> for QueryRequest<'a> {
    fn from(query: &'a Query) -> Self {
        Self {
            query: query.as_str(),
        }
    }
}

/// Outcome reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Success,
    Error,
    /// Anything else the backend sends; rendered like a success
    #[serde(other)]
    Unknown,
}

/// Data source the backend routed the question to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataSource {
    /// Electric vehicle data in GCP BigQuery
    GcpBigquery,
    /// State tax data in AWS S3 Tables
    AwsS3Tables,
    /// Both sources, returned as separate tables
    MultiSource,
    Other(String),
}

impl DataSource {
    /// Wire name used by the backend
    pub fn as_str(&self) -> &str {
        match self {
            Self::GcpBigquery => "gcp_bigquery",
            Self::AwsS3Tables => "aws_s3_tables",
            Self::MultiSource => "multi_source",
            Self::Other(name) => name,
        }
    }

    /// Human-readable label for this source
    pub fn label(&self) -> &'static str {
        match self {
            Self::GcpBigquery => "BigQuery (EV Data)",
            Self::AwsS3Tables => "S3 Tables (Tax Data)",
            Self::MultiSource => "Multi-Source (Both)",
            Self::Other(_) => "Data Source",
        }
    }
}

impl Default for DataSource {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for DataSource {
    fn from(value: String) -> Self {
        match value.as_str() {
            "gcp_bigquery" => Self::GcpBigquery,
            "aws_s3_tables" => Self::AwsS3Tables,
            "multi_source" => Self::MultiSource,
            _ => Self::Other(value),
        }
    }
}

impl From<DataSource> for String {
    fn from(value: DataSource) -> Self {
        value.as_str().to_string()
    }
}

/// Per-source tables of a multi-source result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SplitData {
    #[serde(default, deserialize_with = "lenient_rows")]
    pub tax_data: Vec<Row>,
    #[serde(default, deserialize_with = "lenient_rows")]
    pub ev_data: Vec<Row>,
}

/// Result payload; its shape depends on the routing outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultData {
    /// Single-source result: one flat table
    Rows(Vec<Row>),
    /// Multi-source result: `tax_data` and `ev_data` tables
    Split(SplitData),
    /// Payload of no recognised shape; rendered as "no data"
    Other(Value),
}

impl From<Value> for ResultData {
    fn from(value: Value) -> Self {
        match value {
            rows @ Value::Array(_) => Self::Rows(object_rows(rows)),
            Value::Object(mut map) => Self::Split(SplitData {
                tax_data: object_rows(map.remove("tax_data").unwrap_or_default()),
                ev_data: object_rows(map.remove("ev_data").unwrap_or_default()),
            }),
            other => Self::Other(other),
        }
    }
}

impl<'de> Deserialize<'de> for ResultData {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from)
    }
}

/// Parsed response from the query endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub status: ResultStatus,
    #[serde(default, deserialize_with = "lenient_source")]
    pub source: DataSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResultData>,
    /// Routing confidence in `0.0..=1.0`
    #[serde(default, deserialize_with = "lenient_confidence")]
    pub confidence: f64,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub reason: Option<String>,
    /// Echo of the submitted question
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub query: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<String>,
}

impl QueryResult {
    pub fn is_error(&self) -> bool {
        self.status == ResultStatus::Error
    }
}

// Non-numeric confidence values count as zero
fn lenient_confidence<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_f64().unwrap_or(0.0))
}

// A missing or non-string source falls back to the generic label
fn lenient_source<'de, D>(deserializer: D) -> Result<DataSource, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(name) => Ok(DataSource::from(name)),
        _ => Ok(DataSource::default()),
    }
}

// Strings are kept as-is, null is absent, anything else keeps its JSON text
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}

// Null or non-list tables are empty; rows that are not objects are skipped
fn lenient_rows<'de, D>(deserializer: D) -> Result<Vec<Row>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(object_rows)
}

fn object_rows(value: Value) -> Vec<Row> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(row) => Some(row),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Errors that can occur while submitting a query
#[derive(Debug, Error)]
pub enum QueryError {
    /// Query text was empty after trimming
    #[error("Query must not be empty")]
    EmptyQuery,

    /// Non-success HTTP status from an endpoint
    #[error("HTTP {status}: {status_text}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase for the status
        status_text: String,
    },

    /// A proxy or gateway in front of the backend failed
    #[error("Proxy error (HTTP {status}): {message}")]
    Gateway {
        /// HTTP status code reported by the gateway
        status: u16,
        /// Gateway error message
        message: String,
    },

    /// Response body was not a valid result document
    #[error("Malformed response: {message}")]
    MalformedResponse {
        /// Parser error message
        message: String,
    },

    /// Connection-level failure
    #[error("{message}")]
    Transport {
        /// Transport error message
        message: String,
    },

    /// Attempt exceeded the configured timeout
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// Both the primary and fallback endpoints failed
    #[error("{}", BACKEND_UNAVAILABLE_MESSAGE)]
    BackendUnavailable,

    /// Endpoint address could not be used
    #[error("Invalid endpoint: {reason}")]
    InvalidEndpoint {
        /// Reason the endpoint is invalid
        reason: String,
    },
}

impl QueryError {
    /// Whether a failed primary attempt should be retried against the fallback
    ///
    /// Only gateway failures and unparseable bodies qualify; both are the
    /// signatures of a misconfigured local development proxy.
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(self, Self::Gateway { .. } | Self::MalformedResponse { .. })
    }

    /// Text shown to the user for a terminal failure
    pub fn user_message(&self) -> String {
        match self {
            Self::BackendUnavailable => BACKEND_UNAVAILABLE_MESSAGE.to_string(),
            other => format!("Network error: {}", other),
        }
    }
}
