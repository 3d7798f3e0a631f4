//! Route planning strategies implementing the Strategy pattern.
//!
//! Each single-path search algorithm is wrapped in a [`RoutePlanner`] so the
//! orchestrator in [`super::plan_route`] can dispatch on a closed
//! [`RouteAlgorithm`] without matching on search functions directly.

use crate::error::Result;
use crate::graph::{Graph, NodeId};
use crate::path::{
    bounded_dfs, fewest_edges, shortest_weighted, SafeSearchLimits, SearchStatus, WeightedPath,
};

use super::RouteAlgorithm;

/// Result of a single-path planner.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerOutcome {
    pub path: Option<WeightedPath>,
    pub status: SearchStatus,
}

impl PlannerOutcome {
    fn complete(path: Option<WeightedPath>) -> Self {
        Self {
            path,
            status: SearchStatus::Complete,
        }
    }
}

/// Trait for single-path planning strategies.
pub trait RoutePlanner: Send + Sync {
    /// The algorithm identifier for this planner.
    fn algorithm(&self) -> RouteAlgorithm;

    /// Execute the search on the given graph.
    fn find_path(&self, graph: &Graph, start: NodeId, goal: NodeId) -> Result<PlannerOutcome>;
}

/// Breadth-first search planner.
///
/// Finds the path with the fewest edges; its weight is whatever those edges
/// add up to.
#[derive(Debug, Clone, Default)]
pub struct BfsPlanner;

impl RoutePlanner for BfsPlanner {
    fn algorithm(&self) -> RouteAlgorithm {
        RouteAlgorithm::Bfs
    }

    fn find_path(&self, graph: &Graph, start: NodeId, goal: NodeId) -> Result<PlannerOutcome> {
        let path = fewest_edges(graph, start, goal)?;
        Ok(PlannerOutcome::complete(path.and_then(|nodes| weigh(graph, nodes))))
    }
}

/// Dijkstra planner for the minimum total weight.
#[derive(Debug, Clone, Default)]
pub struct DijkstraPlanner;

impl RoutePlanner for DijkstraPlanner {
    fn algorithm(&self) -> RouteAlgorithm {
        RouteAlgorithm::Dijkstra
    }

    fn find_path(&self, graph: &Graph, start: NodeId, goal: NodeId) -> Result<PlannerOutcome> {
        Ok(PlannerOutcome::complete(shortest_weighted(
            graph, start, goal,
        )?))
    }
}

/// Bounded depth-first planner. Returns the first path it meets.
#[derive(Debug, Clone, Default)]
pub struct DfsPlanner {
    limits: SafeSearchLimits,
}

impl DfsPlanner {
    pub fn new(limits: SafeSearchLimits) -> Self {
        Self { limits }
    }
}

impl RoutePlanner for DfsPlanner {
    fn algorithm(&self) -> RouteAlgorithm {
        RouteAlgorithm::Dfs
    }

    fn find_path(&self, graph: &Graph, start: NodeId, goal: NodeId) -> Result<PlannerOutcome> {
        let search = bounded_dfs(graph, start, goal, &self.limits)?;
        Ok(PlannerOutcome {
            path: search.path.and_then(|nodes| weigh(graph, nodes)),
            status: search.status,
        })
    }
}

fn weigh(graph: &Graph, nodes: Vec<NodeId>) -> Option<WeightedPath> {
    let weight = graph.path_weight(&nodes)?;
    Some(WeightedPath { nodes, weight })
}

/// Select the planner for an algorithm.
pub fn select_planner(algorithm: RouteAlgorithm, limits: SafeSearchLimits) -> Box<dyn RoutePlanner> {
    match algorithm {
        RouteAlgorithm::Bfs => Box::new(BfsPlanner),
        RouteAlgorithm::Dijkstra => Box::new(DijkstraPlanner),
        RouteAlgorithm::Dfs => Box::new(DfsPlanner::new(limits)),
    }
}
