//! HTTP surface for routefinder.
//!
//! Handlers stay thin: they validate query strings, hand the work to
//! `routefinder-lib` on the blocking pool, and format the result. Errors are
//! RFC 9457 [`ProblemDetails`] bodies.
//!
//! # Endpoints
//!
//! - `GET /route?src=lon,lat&dst=lon,lat&mode=&alg=&max_paths=&max_depth=&max_weight=`
//! - `GET /compare?src=lon,lat&dst=lon,lat`
//! - `GET /health/live`, `GET /health/ready`

#![deny(warnings)]

pub mod config;
mod handlers;
mod health;
pub mod logging;
mod problem;
mod request;
mod response;
mod state;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::ServiceConfig;
pub use handlers::{compare_handler, route_handler};
pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use problem::{
    from_lib_error, ProblemDetails, PROBLEM_INTERNAL_ERROR, PROBLEM_INVALID_REQUEST,
    PROBLEM_SERVICE_UNAVAILABLE,
};
pub use request::{CompareParams, CompareQuery, RouteParams, RouteQuery, Validate};
pub use response::{ApiResponse, CompareResponse, RouteResponse, ServiceResponse, SnappedPoint};
pub use state::{AppState, AppStateError};

/// Assemble the service router over a loaded state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/route", get(route_handler))
        .route("/compare", get(compare_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
