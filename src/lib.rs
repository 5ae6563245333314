// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod cli;
pub mod config;
pub mod input;
pub mod query;
pub mod render;

// Re-export main types
pub use config::ClientConfig;
pub use query::{
    DataSource, Query, QueryError, QueryResult, SubmissionController, SubmissionState,
};
pub use render::{render, HeaderStrategy, RenderedResult};
