//! Route planning over a built [`Graph`].
//!
//! This module provides:
//! - [`RouteMode`] - what the caller optimises for (distance, hops, alternatives)
//! - [`RouteAlgorithm`] - the closed set of single-path searches
//! - [`resolve_algorithm`] - maps a mode plus a free-form algorithm name onto a
//!   [`PlanStrategy`], reporting substitutions as a note instead of failing
//! - [`plan_route`] and [`compare_routes`] - the entry points used by the CLI
//!   and HTTP service
//!
//! # Example
//!
//! ```ignore
//! use routefinder_lib::{plan_route, RouteMode, RouteRequest};
//!
//! let request = RouteRequest::new(start, goal, RouteMode::All).with_max_paths(5);
//! let plan = plan_route(&graph, &request)?;
//! println!("{} alternatives via {}", plan.paths.len(), plan.strategy);
//! ```

mod planner;

pub use planner::{
    select_planner, BfsPlanner, DfsPlanner, DijkstraPlanner, PlannerOutcome, RoutePlanner,
};

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId};
use crate::path::{
    enumerate_paths, shortest_weighted, EnumerationLimits, SafeSearchLimits, SearchStatus,
    WeightedPath,
};

/// Multiple of the shortest distance used to bound enumeration when the
/// caller gives no explicit weight limit.
pub const DETOUR_FACTOR: f64 = 1.5;

/// Paths collected per comparison.
pub const COMPARE_MAX_PATHS: usize = 20;

/// Depth bound used by comparison enumeration.
pub const COMPARE_MAX_DEPTH: usize = 300;

/// What a route query optimises for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RouteMode {
    /// Minimum total weight.
    #[default]
    Shortest,
    /// Fewest edges.
    MinSteps,
    /// Several alternative paths.
    All,
}

impl fmt::Display for RouteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RouteMode::Shortest => "shortest",
            RouteMode::MinSteps => "minsteps",
            RouteMode::All => "all",
        };
        f.write_str(value)
    }
}

impl FromStr for RouteMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shortest" => Ok(RouteMode::Shortest),
            "minsteps" => Ok(RouteMode::MinSteps),
            "all" => Ok(RouteMode::All),
            other => Err(Error::invalid(
                "mode",
                format!("unknown mode '{other}'; expected shortest, minsteps or all"),
            )),
        }
    }
}

/// Supported single-path search algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteAlgorithm {
    /// Breadth-first search (fewest edges).
    Bfs,
    /// Dijkstra's algorithm (minimum weight).
    Dijkstra,
    /// Bounded depth-first search (any path).
    Dfs,
}

impl RouteAlgorithm {
    /// Parse a lowercase algorithm name, returning `None` when unrecognised.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "bfs" => Some(RouteAlgorithm::Bfs),
            "dijkstra" => Some(RouteAlgorithm::Dijkstra),
            "dfs" => Some(RouteAlgorithm::Dfs),
            _ => None,
        }
    }

    /// Display label used in responses.
    pub fn label(self) -> &'static str {
        match self {
            RouteAlgorithm::Bfs => "BFS",
            RouteAlgorithm::Dijkstra => "Dijkstra",
            RouteAlgorithm::Dfs => "DFS",
        }
    }
}

impl fmt::Display for RouteAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RouteAlgorithm::Bfs => "bfs",
            RouteAlgorithm::Dijkstra => "dijkstra",
            RouteAlgorithm::Dfs => "dfs",
        };
        f.write_str(value)
    }
}

/// How a plan is produced: one search, or alternative-path enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStrategy {
    Search(RouteAlgorithm),
    Enumerate,
}

impl fmt::Display for PlanStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanStrategy::Search(algorithm) => f.write_str(algorithm.label()),
            PlanStrategy::Enumerate => f.write_str("DFS_enumerate"),
        }
    }
}

impl Serialize for PlanStrategy {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Strategy chosen for a query, with an explanation when it differs from
/// what the mode would normally use or from what was asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmChoice {
    pub strategy: PlanStrategy,
    pub note: Option<String>,
}

/// Resolve the strategy for `mode` given an optional algorithm name.
///
/// Names are case-insensitive and an empty name counts as absent. Unknown
/// names fall back to the mode's default and say so in the note.
pub fn resolve_algorithm(mode: RouteMode, requested: Option<&str>) -> AlgorithmChoice {
    let requested = requested
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty());

    let choose = |algorithm: RouteAlgorithm, note: Option<String>| AlgorithmChoice {
        strategy: PlanStrategy::Search(algorithm),
        note,
    };

    match mode {
        RouteMode::All => {
            let note = requested
                .filter(|name| name != "dfs")
                .map(|name| format!("'{name}' requested, using DFS enumeration for finding multiple paths."));
            AlgorithmChoice {
                strategy: PlanStrategy::Enumerate,
                note,
            }
        }
        RouteMode::MinSteps => match requested.as_deref().map(|n| (n, RouteAlgorithm::parse(n))) {
            None | Some((_, Some(RouteAlgorithm::Bfs))) => choose(RouteAlgorithm::Bfs, None),
            Some((_, Some(RouteAlgorithm::Dijkstra))) => choose(
                RouteAlgorithm::Dijkstra,
                Some(
                    "Using Dijkstra for weighted shortest path; BFS typically finds fewest edges."
                        .to_string(),
                ),
            ),
            Some((_, Some(RouteAlgorithm::Dfs))) => choose(
                RouteAlgorithm::Dfs,
                Some("Using DFS; does not guarantee fewest edges.".to_string()),
            ),
            Some((name, None)) => choose(
                RouteAlgorithm::Bfs,
                Some(format!("Unknown algorithm '{name}'; defaulted to BFS.")),
            ),
        },
        RouteMode::Shortest => match requested.as_deref().map(|n| (n, RouteAlgorithm::parse(n))) {
            None | Some((_, Some(RouteAlgorithm::Dijkstra))) => {
                choose(RouteAlgorithm::Dijkstra, None)
            }
            Some((_, Some(RouteAlgorithm::Bfs))) => choose(
                RouteAlgorithm::Bfs,
                Some("BFS minimizes edges, not necessarily distance.".to_string()),
            ),
            Some((_, Some(RouteAlgorithm::Dfs))) => choose(
                RouteAlgorithm::Dfs,
                Some("DFS does not guarantee shortest distance.".to_string()),
            ),
            Some((name, None)) => choose(
                RouteAlgorithm::Dijkstra,
                Some(format!("Unknown algorithm '{name}'; defaulted to Dijkstra.")),
            ),
        },
    }
}

/// High-level route planning request.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub start: NodeId,
    pub goal: NodeId,
    pub mode: RouteMode,
    /// Free-form algorithm name, resolved by [`resolve_algorithm`].
    pub algorithm: Option<String>,
    /// Limits for mode `all`. A missing weight bound means "derive from the
    /// shortest distance".
    pub enumeration: EnumerationLimits,
    /// Limits for the bounded depth-first planner.
    pub safe_search: SafeSearchLimits,
}

impl RouteRequest {
    pub fn new(start: NodeId, goal: NodeId, mode: RouteMode) -> Self {
        Self {
            start,
            goal,
            mode,
            algorithm: None,
            enumeration: EnumerationLimits::default(),
            safe_search: SafeSearchLimits::default(),
        }
    }

    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = Some(algorithm.into());
        self
    }

    pub fn with_max_paths(mut self, max_paths: usize) -> Self {
        self.enumeration.max_paths = max_paths;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.enumeration.max_depth = max_depth;
        self
    }

    pub fn with_max_weight(mut self, max_weight: f64) -> Self {
        self.enumeration.max_total_weight = Some(max_weight);
        self
    }
}

/// Planned route returned by the library.
#[derive(Debug, Clone, Serialize)]
pub struct RoutePlan {
    pub mode: RouteMode,
    pub strategy: PlanStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub start: NodeId,
    pub goal: NodeId,
    /// Empty when no path was found.
    pub paths: Vec<WeightedPath>,
    pub status: SearchStatus,
    /// Weight bound enumeration ran with, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_bound: Option<f64>,
}

impl RoutePlan {
    pub fn is_found(&self) -> bool {
        !self.paths.is_empty()
    }

    /// Lightest path in the plan.
    pub fn best(&self) -> Option<&WeightedPath> {
        self.paths.iter().min_by(|a, b| a.weight.total_cmp(&b.weight))
    }
}

/// Plan a route for the request.
pub fn plan_route(graph: &Graph, request: &RouteRequest) -> Result<RoutePlan> {
    graph.check_node(request.start)?;
    graph.check_node(request.goal)?;

    let choice = resolve_algorithm(request.mode, request.algorithm.as_deref());
    if let Some(note) = &choice.note {
        warn!(mode = %request.mode, strategy = %choice.strategy, "{note}");
    }
    let plan = match choice.strategy {
        PlanStrategy::Search(algorithm) => {
            let planner = select_planner(algorithm, request.safe_search);
            let outcome = planner.find_path(graph, request.start, request.goal)?;
            RoutePlan {
                mode: request.mode,
                strategy: choice.strategy,
                note: choice.note,
                start: request.start,
                goal: request.goal,
                paths: outcome.path.into_iter().collect(),
                status: outcome.status,
                weight_bound: None,
            }
        }
        PlanStrategy::Enumerate => {
            let (paths, status, weight_bound) =
                enumerate_bounded(graph, request.start, request.goal, request.enumeration)?;
            RoutePlan {
                mode: request.mode,
                strategy: choice.strategy,
                note: choice.note,
                start: request.start,
                goal: request.goal,
                paths,
                status,
                weight_bound,
            }
        }
    };

    debug!(
        mode = %plan.mode,
        strategy = %plan.strategy,
        start = plan.start,
        goal = plan.goal,
        paths = plan.paths.len(),
        status = ?plan.status,
        "route planned"
    );
    Ok(plan)
}

/// Enumerate alternatives, bounding by the detour factor when no explicit
/// weight limit is set.
fn enumerate_bounded(
    graph: &Graph,
    start: NodeId,
    goal: NodeId,
    mut limits: EnumerationLimits,
) -> Result<(Vec<WeightedPath>, SearchStatus, Option<f64>)> {
    if limits.max_total_weight.is_none() {
        let baseline = WeightedPath::distance_or_infinity(
            shortest_weighted(graph, start, goal)?.as_ref(),
        );
        if baseline.is_finite() {
            limits.max_total_weight = Some(baseline * DETOUR_FACTOR);
        }
    }
    let enumeration = enumerate_paths(graph, start, goal, &limits)?;
    Ok((enumeration.paths, enumeration.status, limits.max_total_weight))
}

/// Run the shortest, fewest-edges and alternatives plans side by side.
pub fn compare_routes(graph: &Graph, start: NodeId, goal: NodeId) -> Result<Vec<RoutePlan>> {
    let shortest = plan_route(graph, &RouteRequest::new(start, goal, RouteMode::Shortest))?;
    let minsteps = plan_route(graph, &RouteRequest::new(start, goal, RouteMode::MinSteps))?;
    let all = plan_route(
        graph,
        &RouteRequest::new(start, goal, RouteMode::All)
            .with_max_paths(COMPARE_MAX_PATHS)
            .with_max_depth(COMPARE_MAX_DEPTH),
    )?;
    Ok(vec![shortest, minsteps, all])
}
