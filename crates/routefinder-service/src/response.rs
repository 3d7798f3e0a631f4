//! Success payloads.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use routefinder_lib::{NodeId, RouteSummary};

use crate::problem::ProblemDetails;

/// Successful body with its content type inlined, mirroring [`ProblemDetails`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceResponse<T> {
    #[serde(flatten)]
    pub data: T,
    pub content_type: String,
}

impl<T> ServiceResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            content_type: "application/json".to_string(),
        }
    }
}

impl<T: Serialize> IntoResponse for ServiceResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Either a success body or an RFC 9457 problem.
#[derive(Debug)]
pub enum ApiResponse<T> {
    Success(ServiceResponse<T>),
    Error(ProblemDetails),
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self {
            ApiResponse::Success(body) => body.into_response(),
            ApiResponse::Error(problem) => problem.into_response(),
        }
    }
}

/// A query coordinate and the node it snapped to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnappedPoint {
    pub query: [f64; 2],
    pub node: NodeId,
    pub lonlat: [f64; 2],
    /// Metres between the query and the node.
    pub snap_distance: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteResponse {
    pub src: SnappedPoint,
    pub dst: SnappedPoint,
    #[serde(flatten)]
    pub summary: RouteSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompareResponse {
    pub src: SnappedPoint,
    pub dst: SnappedPoint,
    pub results: Vec<RouteSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize)]
    struct Payload {
        hops: usize,
    }

    #[test]
    fn payload_is_flattened() {
        let json = serde_json::to_string(&ServiceResponse::new(Payload { hops: 3 })).unwrap();
        assert!(json.contains("\"hops\":3"));
        assert!(json.contains("\"content_type\":\"application/json\""));
        assert!(!json.contains("\"data\""));
    }
}
