//! `/route` and `/compare` handlers.
//!
//! Searches run on the blocking pool under the configured timeout. A query
//! that overruns is abandoned and reported as 503; its worker finishes in
//! the background.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{rejection::QueryRejection, Query, State};
use tracing::{error, info, warn};

use routefinder_lib::{compare_routes, plan_route, RouteRequest, RouteSummary};

use crate::problem::{from_lib_error, ProblemDetails};
use crate::request::{CompareParams, CompareQuery, RouteParams, RouteQuery, Validate};
use crate::response::{ApiResponse, CompareResponse, RouteResponse, ServiceResponse, SnappedPoint};
use crate::state::AppState;

/// Failure inside a query job, before it is turned into a problem response.
enum JobError {
    Lib(routefinder_lib::Error),
    NoNearbyNode,
}

impl From<routefinder_lib::Error> for JobError {
    fn from(err: routefinder_lib::Error) -> Self {
        JobError::Lib(err)
    }
}

pub async fn route_handler(
    State(state): State<AppState>,
    query: Result<Query<RouteQuery>, QueryRejection>,
) -> ApiResponse<RouteResponse> {
    let request_id = generate_request_id();
    let params = match parse_query(query, &request_id) {
        Ok(params) => params,
        Err(problem) => return ApiResponse::Error(*problem),
    };

    info!(
        request_id = %request_id,
        mode = %params.mode,
        algorithm = ?params.algorithm,
        "handling route request"
    );

    match run_query(&state, &request_id, move |state| plan(state, &params)).await {
        Ok(response) => {
            info!(
                request_id = %request_id,
                paths = response.summary.count,
                status = ?response.summary.status,
                "route computed"
            );
            ApiResponse::Success(ServiceResponse::new(response))
        }
        Err(problem) => ApiResponse::Error(*problem),
    }
}

pub async fn compare_handler(
    State(state): State<AppState>,
    query: Result<Query<CompareQuery>, QueryRejection>,
) -> ApiResponse<CompareResponse> {
    let request_id = generate_request_id();
    let params = match parse_query(query, &request_id) {
        Ok(params) => params,
        Err(problem) => return ApiResponse::Error(*problem),
    };

    info!(request_id = %request_id, "handling compare request");

    match run_query(&state, &request_id, move |state| compare(state, params)).await {
        Ok(response) => ApiResponse::Success(ServiceResponse::new(response)),
        Err(problem) => ApiResponse::Error(*problem),
    }
}

fn parse_query<Q: Validate>(
    query: Result<Query<Q>, QueryRejection>,
    request_id: &str,
) -> Result<Q::Validated, Box<ProblemDetails>> {
    let Query(query) = query
        .map_err(|rejection| Box::new(ProblemDetails::bad_request(rejection.body_text(), request_id)))?;
    query.validate(request_id)
}

fn snap_pair(
    state: &AppState,
    src: [f64; 2],
    dst: [f64; 2],
) -> Result<(SnappedPoint, SnappedPoint), JobError> {
    let src = state.snap(src).ok_or(JobError::NoNearbyNode)?;
    let dst = state.snap(dst).ok_or(JobError::NoNearbyNode)?;
    Ok((src, dst))
}

fn plan(state: &AppState, params: &RouteParams) -> Result<RouteResponse, JobError> {
    let (src, dst) = snap_pair(state, params.src, params.dst)?;

    let mut request = RouteRequest::new(src.node, dst.node, params.mode)
        .with_max_paths(params.max_paths)
        .with_max_depth(params.max_depth);
    if let Some(algorithm) = &params.algorithm {
        request = request.with_algorithm(algorithm.as_str());
    }
    if let Some(max_weight) = params.max_weight {
        request = request.with_max_weight(max_weight);
    }

    let plan = plan_route(state.graph(), &request)?;
    Ok(RouteResponse {
        src,
        dst,
        summary: RouteSummary::from_plan(state.graph(), &plan),
    })
}

fn compare(state: &AppState, params: CompareParams) -> Result<CompareResponse, JobError> {
    let (src, dst) = snap_pair(state, params.src, params.dst)?;
    let plans = compare_routes(state.graph(), src.node, dst.node)?;
    Ok(CompareResponse {
        src,
        dst,
        results: plans
            .iter()
            .map(|plan| RouteSummary::from_plan(state.graph(), plan))
            .collect(),
    })
}

/// Run `job` on the blocking pool, bounded by the state's query timeout.
async fn run_query<T, F>(
    state: &AppState,
    request_id: &str,
    job: F,
) -> Result<T, Box<ProblemDetails>>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> Result<T, JobError> + Send + 'static,
{
    let worker_state = state.clone();
    let task = tokio::task::spawn_blocking(move || job(&worker_state));

    match tokio::time::timeout(state.query_timeout(), task).await {
        Ok(Ok(Ok(value))) => Ok(value),
        Ok(Ok(Err(JobError::Lib(err)))) => {
            if err.is_invalid_input() {
                warn!(request_id = %request_id, error = %err, "rejected query");
            } else {
                error!(request_id = %request_id, error = %err, "query failed");
            }
            Err(Box::new(from_lib_error(&err, request_id)))
        }
        Ok(Ok(Err(JobError::NoNearbyNode))) => Err(Box::new(ProblemDetails::bad_request(
            "nearest node not found",
            request_id,
        ))),
        Ok(Err(join_error)) => {
            error!(request_id = %request_id, error = %join_error, "query task failed");
            Err(Box::new(ProblemDetails::internal_error(
                "query task failed",
                request_id,
            )))
        }
        Err(_) => {
            warn!(
                request_id = %request_id,
                timeout_ms = state.query_timeout().as_millis() as u64,
                "query timed out"
            );
            Err(Box::new(ProblemDetails::service_unavailable(
                format!(
                    "query exceeded {} ms; try a tighter max_paths or max_depth",
                    state.query_timeout().as_millis()
                ),
                request_id,
            )))
        }
    }
}

fn generate_request_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    format!("req-{nanos:x}")
}
