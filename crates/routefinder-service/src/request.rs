//! Query-string types and their validation.

use serde::{Deserialize, Serialize};

use routefinder_lib::path::{DEFAULT_ENUMERATION_MAX_DEPTH, DEFAULT_MAX_PATHS};
use routefinder_lib::{parse_lonlat, RouteMode};

use crate::problem::ProblemDetails;

/// Turns a raw request into its checked form or a 400 problem.
pub trait Validate {
    type Validated;

    /// `request_id` fills the `instance` member of any returned problem.
    fn validate(&self, request_id: &str) -> Result<Self::Validated, Box<ProblemDetails>>;
}

/// `GET /route` query parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteQuery {
    /// Start as `lon,lat`.
    pub src: Option<String>,
    /// Destination as `lon,lat`.
    pub dst: Option<String>,
    pub mode: Option<String>,
    pub alg: Option<String>,
    pub max_paths: Option<usize>,
    pub max_depth: Option<usize>,
    pub max_weight: Option<f64>,
}

/// `GET /compare` query parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompareQuery {
    pub src: Option<String>,
    pub dst: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteParams {
    pub src: [f64; 2],
    pub dst: [f64; 2],
    pub mode: RouteMode,
    pub algorithm: Option<String>,
    pub max_paths: usize,
    pub max_depth: usize,
    pub max_weight: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompareParams {
    pub src: [f64; 2],
    pub dst: [f64; 2],
}

fn endpoints(
    src: Option<&str>,
    dst: Option<&str>,
    request_id: &str,
) -> Result<([f64; 2], [f64; 2]), Box<ProblemDetails>> {
    let (Some(src), Some(dst)) = (non_empty(src), non_empty(dst)) else {
        return Err(Box::new(ProblemDetails::bad_request(
            "src and dst are required as lon,lat",
            request_id,
        )));
    };
    let parse = |field: &str, value: &str| {
        parse_lonlat(value).map_err(|err| {
            Box::new(ProblemDetails::bad_request(
                format!("bad {field}: {err}"),
                request_id,
            ))
        })
    };
    Ok((parse("src", src)?, parse("dst", dst)?))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

impl Validate for RouteQuery {
    type Validated = RouteParams;

    fn validate(&self, request_id: &str) -> Result<RouteParams, Box<ProblemDetails>> {
        let (src, dst) = endpoints(self.src.as_deref(), self.dst.as_deref(), request_id)?;

        let mode = match non_empty(self.mode.as_deref()) {
            Some(raw) => raw.parse::<RouteMode>().map_err(|err| {
                Box::new(ProblemDetails::bad_request(err.to_string(), request_id))
            })?,
            None => RouteMode::default(),
        };

        let max_paths = self.max_paths.unwrap_or(DEFAULT_MAX_PATHS);
        if max_paths == 0 {
            return Err(Box::new(ProblemDetails::bad_request(
                "max_paths must be at least 1",
                request_id,
            )));
        }
        let max_depth = self.max_depth.unwrap_or(DEFAULT_ENUMERATION_MAX_DEPTH);
        if max_depth == 0 {
            return Err(Box::new(ProblemDetails::bad_request(
                "max_depth must be at least 1",
                request_id,
            )));
        }
        if let Some(weight) = self.max_weight {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Box::new(ProblemDetails::bad_request(
                    "max_weight must be a non-negative number",
                    request_id,
                )));
            }
        }

        Ok(RouteParams {
            src,
            dst,
            mode,
            algorithm: non_empty(self.alg.as_deref()).map(str::to_string),
            max_paths,
            max_depth,
            max_weight: self.max_weight,
        })
    }
}

impl Validate for CompareQuery {
    type Validated = CompareParams;

    fn validate(&self, request_id: &str) -> Result<CompareParams, Box<ProblemDetails>> {
        let (src, dst) = endpoints(self.src.as_deref(), self.dst.as_deref(), request_id)?;
        Ok(CompareParams { src, dst })
    }
}
