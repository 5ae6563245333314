// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Query submission controller
//!
//! Owns the single submission state cell and runs the dispatch protocol:
//! one attempt against the primary endpoint, and at most one attempt against
//! the fallback when the primary failure is fallback-eligible.
//!
//! Every `submit` call takes a generation number. A completion is applied
//! only while its generation is still the latest issued, so a late response
//! from an earlier submission can never overwrite a newer one.

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::endpoint::{HttpEndpoint, QueryEndpoint};
use super::types::{Query, QueryError, QueryResult};
use crate::config::ClientConfig;

/// Lifecycle of the current submission
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Pending,
    Succeeded(QueryResult),
    /// Terminal failure with a display string
    Failed(String),
}

impl SubmissionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }
}

/// State cell contents together with the generation that wrote them
#[derive(Debug, Clone, Default)]
pub struct StateSnapshot {
    pub generation: u64,
    pub state: SubmissionState,
}

/// Dispatches queries and tracks the latest submission's state
pub struct SubmissionController {
    primary: Box<dyn QueryEndpoint>,
    fallback: Box<dyn QueryEndpoint>,
    state: watch::Sender<StateSnapshot>,
}

impl SubmissionController {
    /// Create a controller over explicit endpoints
    pub fn new(primary: Box<dyn QueryEndpoint>, fallback: Box<dyn QueryEndpoint>) -> Self {
        let (state, _) = watch::channel(StateSnapshot::default());
        Self {
            primary,
            fallback,
            state,
        }
    }

    /// Create a controller with HTTP endpoints from configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self, QueryError> {
        config
            .validate()
            .map_err(|reason| QueryError::InvalidEndpoint { reason })?;

        let primary = HttpEndpoint::new(
            "primary",
            config.primary_endpoint()?,
            config.request_timeout_ms,
        )?;
        let fallback = HttpEndpoint::new(
            "fallback",
            config.fallback_endpoint()?,
            config.request_timeout_ms,
        )?;
        debug!(
            "Query endpoints: primary {}, fallback {}",
            primary.url(),
            fallback.url()
        );

        Ok(Self::new(Box::new(primary), Box::new(fallback)))
    }

    /// Submit a query and wait for its terminal state
    ///
    /// The state cell moves to `Pending` before any network activity. The
    /// returned state is this call's own outcome; it is written to the cell
    /// only if no newer submission started in the meantime.
    pub async fn submit(&self, query: Query) -> SubmissionState {
        let generation = self.begin();

        let outcome = match self.dispatch(&query).await {
            Ok(result) => SubmissionState::Succeeded(result),
            Err(e) => SubmissionState::Failed(e.user_message()),
        };

        self.complete(generation, outcome.clone());
        outcome
    }

    /// Current contents of the state cell
    pub fn state(&self) -> SubmissionState {
        self.state.borrow().state.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().state.is_pending()
    }

    /// Watch state transitions as they are applied
    pub fn subscribe(&self) -> watch::Receiver<StateSnapshot> {
        self.state.subscribe()
    }

    fn begin(&self) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|snapshot| {
            snapshot.generation += 1;
            snapshot.state = SubmissionState::Pending;
            generation = snapshot.generation;
        });
        generation
    }

    fn complete(&self, generation: u64, outcome: SubmissionState) {
        let applied = self.state.send_if_modified(|snapshot| {
            if snapshot.generation != generation {
                return false;
            }
            snapshot.state = outcome;
            true
        });

        if !applied {
            debug!("Discarding stale completion for submission {}", generation);
        }
    }

    async fn dispatch(&self, query: &Query) -> Result<QueryResult, QueryError> {
        debug!("Submitting query to {}: {}", self.primary.name(), query);

        let primary_error = match self.primary.submit(query).await {
            Ok(result) => {
                info!("Query answered by {} endpoint", self.primary.name());
                return Ok(result);
            }
            Err(e) => e,
        };

        if !primary_error.is_fallback_eligible() {
            warn!(
                "Query failed on {} endpoint: {}",
                self.primary.name(),
                primary_error
            );
            return Err(primary_error);
        }

        warn!(
            "{} endpoint failed ({}), retrying against {}",
            self.primary.name(),
            primary_error,
            self.fallback.url()
        );

        match self.fallback.submit(query).await {
            Ok(result) => {
                info!("Query answered by {} endpoint", self.fallback.name());
                Ok(result)
            }
            Err(e) => {
                warn!("{} endpoint failed: {}", self.fallback.name(), e);
                Err(QueryError::BackendUnavailable)
            }
        }
    }
}
