//! Liveness and readiness probes.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `ok`, or `not_ready: <reason>`.
    pub status: String,
    pub service: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes_loaded: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edges_loaded: Option<usize>,
    /// Road source the graph was built from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// RFC 3339 time the graph finished loading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<String>,
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            nodes_loaded: None,
            edges_loaded: None,
            source: None,
            loaded_at: None,
        }
    }

    pub fn ready(service: &str, version: &str, state: &AppState) -> Self {
        Self {
            nodes_loaded: Some(state.graph().node_count()),
            edges_loaded: Some(state.graph().stats().edges),
            source: Some(state.source().to_string()),
            loaded_at: Some(state.loaded_at().to_rfc3339()),
            ..Self::alive(service, version)
        }
    }

    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {reason}"),
            ..Self::alive(service, version)
        }
    }
}

/// `GET /health/live`: the process is up.
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// `GET /health/ready`: a non-empty graph is loaded.
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    if state.graph().is_empty() {
        let status = HealthStatus::not_ready(service, version, "graph has no nodes");
        return (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response();
    }

    (StatusCode::OK, Json(HealthStatus::ready(service, version, &state))).into_response()
}
