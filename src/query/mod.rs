// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Query dispatch
//!
//! Submits questions to the routing backend:
//! - Primary endpoint on the client's origin
//! - Single fallback attempt against the direct backend address when the
//!   primary fails with a gateway or malformed-response error
//! - Generation-guarded submission state so only the latest outcome is kept

pub mod controller;
pub mod endpoint;
pub mod health;
pub mod types;

// Re-export commonly used types
pub use controller::{StateSnapshot, SubmissionController, SubmissionState};
pub use endpoint::{HttpEndpoint, QueryEndpoint};
pub use health::{check_health, HealthStatus};
pub use types::{
    DataSource, Query, QueryError, QueryResult, ResultData, ResultStatus, Row, SplitData,
    BACKEND_UNAVAILABLE_MESSAGE,
};
