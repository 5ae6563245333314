// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! In-process stand-in for the routing backend

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// How the fake answers `POST /api/query`
#[derive(Clone)]
pub enum Reply {
    /// 200 with a JSON body
    Json(Value),
    /// Given status with a plain-text body
    Status(u16, &'static str),
    /// 200 with an HTML page, as a dev server does for unknown routes
    Html,
}

#[derive(Clone)]
struct BackendState {
    reply: Reply,
    hits: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<String>>>,
}

pub struct FakeBackend {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl FakeBackend {
    pub async fn start(reply: Reply) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Failed to read local addr");

        let hits = Arc::new(AtomicUsize::new(0));
        let queries = Arc::new(Mutex::new(Vec::new()));
        let state = BackendState {
            reply,
            hits: hits.clone(),
            queries: queries.clone(),
        };

        let app = Router::new()
            .route("/api/query", post(query_handler))
            .route("/api/health", get(health_handler))
            .with_state(state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Fake backend failed");
        });

        Self {
            addr,
            hits,
            queries,
        }
    }

    pub fn origin(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn query_url(&self) -> String {
        format!("http://{}/api/query", self.addr)
    }

    /// Number of query requests received
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Query texts received, in arrival order
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

/// Address with nothing listening on it
pub fn unused_origin() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn vehicle_result() -> Value {
    json!({
        "status": "success",
        "query": "What Tesla models are available?",
        "source": "gcp_bigquery",
        "confidence": 0.92,
        "reason": "Query mentions electric vehicle keywords",
        "data": [
            {"Make": "TESLA", "Model": "MODEL 3", "Electric_Range": 358},
            {"Make": "TESLA", "Model": "MODEL Y", "Electric_Range": 330}
        ]
    })
}

async fn query_handler(State(state): State<BackendState>, Json(body): Json<Value>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if let Some(query) = body.get("query").and_then(Value::as_str) {
        state.queries.lock().unwrap().push(query.to_string());
    }

    match state.reply {
        Reply::Json(value) => Json(value).into_response(),
        Reply::Status(code, text) => {
            let status = StatusCode::from_u16(code).unwrap();
            (status, text).into_response()
        }
        Reply::Html => (
            [(header::CONTENT_TYPE, "text/html")],
            "<!DOCTYPE html><html><body><div id=\"root\"></div></body></html>",
        )
            .into_response(),
    }
}

async fn health_handler() -> Json<Value> {
    Json(json!({"status": "healthy", "orchestrator_ready": true}))
}
