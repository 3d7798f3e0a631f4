use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId};

/// Default ceiling on stack entries examined by [`bounded_dfs`].
pub const DEFAULT_MAX_NODES: usize = 1_000_000;
/// Default path length, in nodes, beyond which [`bounded_dfs`] prunes.
pub const DEFAULT_SAFE_MAX_DEPTH: usize = 5_000;
/// Default number of paths collected by [`enumerate_paths`].
pub const DEFAULT_MAX_PATHS: usize = 50;
/// Default path length, in nodes, beyond which [`enumerate_paths`] prunes.
pub const DEFAULT_ENUMERATION_MAX_DEPTH: usize = 500;
/// Default ceiling on stack pops performed by [`enumerate_paths`].
pub const DEFAULT_MAX_ITERATIONS: usize = 5_000_000;

/// Whether a bounded search ran to its natural end or was cut short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    /// The search found its answer or exhausted the space within its bounds.
    Complete,
    /// A node or iteration ceiling stopped the search; results may be partial.
    LimitReached,
}

impl SearchStatus {
    pub fn is_partial(self) -> bool {
        self == SearchStatus::LimitReached
    }
}

/// A path together with its total edge weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedPath {
    pub nodes: Vec<NodeId>,
    pub weight: f64,
}

impl WeightedPath {
    /// Number of edges traversed.
    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Weight of an optional path, treating a missing path as infinitely far.
    pub fn distance_or_infinity(path: Option<&WeightedPath>) -> f64 {
        path.map_or(f64::INFINITY, |p| p.weight)
    }
}

/// Ceilings for [`bounded_dfs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeSearchLimits {
    pub max_nodes: usize,
    pub max_depth: usize,
}

impl Default for SafeSearchLimits {
    fn default() -> Self {
        Self {
            max_nodes: DEFAULT_MAX_NODES,
            max_depth: DEFAULT_SAFE_MAX_DEPTH,
        }
    }
}

impl SafeSearchLimits {
    pub fn validate(&self) -> Result<()> {
        require_positive("max_nodes", self.max_nodes)?;
        require_positive("max_depth", self.max_depth)
    }
}

/// Ceilings and bounds for [`enumerate_paths`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnumerationLimits {
    pub max_paths: usize,
    pub max_depth: usize,
    /// Paths heavier than this are pruned while extending.
    pub max_total_weight: Option<f64>,
    pub max_iterations: usize,
}

impl Default for EnumerationLimits {
    fn default() -> Self {
        Self {
            max_paths: DEFAULT_MAX_PATHS,
            max_depth: DEFAULT_ENUMERATION_MAX_DEPTH,
            max_total_weight: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl EnumerationLimits {
    pub fn validate(&self) -> Result<()> {
        require_positive("max_paths", self.max_paths)?;
        require_positive("max_depth", self.max_depth)?;
        require_positive("max_iterations", self.max_iterations)?;
        if let Some(bound) = self.max_total_weight {
            if !bound.is_finite() || bound < 0.0 {
                return Err(Error::invalid(
                    "max_total_weight",
                    format!("must be a non-negative finite number, got {bound}"),
                ));
            }
        }
        Ok(())
    }
}

fn require_positive(name: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(Error::invalid(name, "must be greater than zero"));
    }
    Ok(())
}

/// Outcome of [`bounded_dfs`].
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedSearch {
    pub path: Option<Vec<NodeId>>,
    pub status: SearchStatus,
}

/// Outcome of [`enumerate_paths`].
#[derive(Debug, Clone, PartialEq)]
pub struct Enumeration {
    pub paths: Vec<WeightedPath>,
    pub status: SearchStatus,
}

fn check_endpoints(graph: &Graph, start: NodeId, goal: NodeId) -> Result<()> {
    graph.check_node(start)?;
    graph.check_node(goal)
}

/// Breadth-first search for the path with the fewest edges.
pub fn fewest_edges(graph: &Graph, start: NodeId, goal: NodeId) -> Result<Option<Vec<NodeId>>> {
    check_endpoints(graph, start, goal)?;
    if start == goal {
        return Ok(Some(vec![start]));
    }

    let mut parents: HashMap<NodeId, Option<NodeId>> = HashMap::new();
    let mut queue = VecDeque::new();

    parents.insert(start, None);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for edge in graph.neighbours(current) {
            let next = edge.target;
            if parents.contains_key(&next) {
                continue;
            }

            parents.insert(next, Some(current));
            if next == goal {
                return Ok(Some(reconstruct_path(&parents, start, goal)));
            }
            queue.push_back(next);
        }
    }

    debug!(start, goal, visited = parents.len(), "fewest-edges search found no path");
    Ok(None)
}

/// Dijkstra's algorithm for the minimum total weight path.
pub fn shortest_weighted(
    graph: &Graph,
    start: NodeId,
    goal: NodeId,
) -> Result<Option<WeightedPath>> {
    check_endpoints(graph, start, goal)?;
    if start == goal {
        return Ok(Some(WeightedPath {
            nodes: vec![start],
            weight: 0.0,
        }));
    }

    let mut distances: HashMap<NodeId, f64> = HashMap::new();
    let mut parents: HashMap<NodeId, Option<NodeId>> = HashMap::new();
    let mut queue = BinaryHeap::new();

    distances.insert(start, 0.0);
    parents.insert(start, None);
    queue.push(QueueEntry::new(start, 0.0));

    while let Some(entry) = queue.pop() {
        let current_distance = match distances.get(&entry.node) {
            Some(distance) if *distance < entry.cost.0 => continue,
            Some(distance) => *distance,
            None => continue,
        };

        if entry.node == goal {
            return Ok(Some(WeightedPath {
                nodes: reconstruct_path(&parents, start, goal),
                weight: current_distance,
            }));
        }

        for edge in graph.neighbours(entry.node) {
            let next = edge.target;
            let next_cost = current_distance + edge.weight;
            if next_cost < *distances.get(&next).unwrap_or(&f64::INFINITY) {
                distances.insert(next, next_cost);
                parents.insert(next, Some(entry.node));
                queue.push(QueueEntry::new(next, next_cost));
            }
        }
    }

    debug!(start, goal, settled = distances.len(), "shortest-weighted search found no path");
    Ok(None)
}

/// Depth-first search returning the first path found within hard ceilings.
///
/// Offers no optimality guarantee. Exceeding `max_nodes` abandons the whole
/// search and reports [`SearchStatus::LimitReached`].
pub fn bounded_dfs(
    graph: &Graph,
    start: NodeId,
    goal: NodeId,
    limits: &SafeSearchLimits,
) -> Result<BoundedSearch> {
    check_endpoints(graph, start, goal)?;
    limits.validate()?;

    let mut found = None;
    let status = DepthFirst {
        graph,
        goal,
        max_depth: limits.max_depth,
        max_weight: None,
        max_pops: limits.max_nodes,
    }
    .run(start, |path, _| {
        found = Some(path.to_vec());
        Visit::Stop
    });

    if status.is_partial() {
        warn!(start, goal, max_nodes = limits.max_nodes, "bounded search hit its node ceiling");
        found = None;
    }
    Ok(BoundedSearch {
        path: found,
        status,
    })
}

/// Collect up to `max_paths` simple paths from `start` to `goal`.
///
/// Paths come back in depth-first discovery order, not sorted by weight.
/// Hitting `max_iterations` returns what was collected so far with
/// [`SearchStatus::LimitReached`].
pub fn enumerate_paths(
    graph: &Graph,
    start: NodeId,
    goal: NodeId,
    limits: &EnumerationLimits,
) -> Result<Enumeration> {
    check_endpoints(graph, start, goal)?;
    limits.validate()?;

    let mut paths = Vec::new();
    let status = DepthFirst {
        graph,
        goal,
        max_depth: limits.max_depth,
        max_weight: limits.max_total_weight,
        max_pops: limits.max_iterations,
    }
    .run(start, |path, weight| {
        paths.push(WeightedPath {
            nodes: path.to_vec(),
            weight,
        });
        if paths.len() >= limits.max_paths {
            Visit::Stop
        } else {
            Visit::Continue
        }
    });

    if status.is_partial() {
        warn!(
            start,
            goal,
            collected = paths.len(),
            max_iterations = limits.max_iterations,
            "path enumeration hit its iteration ceiling"
        );
    }
    Ok(Enumeration { paths, status })
}

enum Visit {
    Continue,
    Stop,
}

/// Shared depth-first walker for the bounded searches.
///
/// Explores in the order an explicit LIFO stack of `(node, path)` entries
/// would, but keeps a single path buffer with one neighbour cursor per level
/// instead of a copy of the path per entry. Every entry that stack would pop
/// counts toward `max_pops`.
struct DepthFirst<'g> {
    graph: &'g Graph,
    goal: NodeId,
    max_depth: usize,
    max_weight: Option<f64>,
    max_pops: usize,
}

impl DepthFirst<'_> {
    fn run<F>(&self, start: NodeId, mut on_goal: F) -> SearchStatus
    where
        F: FnMut(&[NodeId], f64) -> Visit,
    {
        let mut pops = 1usize;
        if pops > self.max_pops || self.max_depth == 0 {
            return SearchStatus::Complete;
        }
        if start == self.goal {
            on_goal(&[start], 0.0);
            return SearchStatus::Complete;
        }

        let mut path = vec![start];
        let mut weights = vec![0.0f64];
        let mut on_path = HashSet::from([start]);
        // Remaining neighbours per level, consumed from the back.
        let mut cursors = vec![self.graph.neighbours(start).len()];

        while let Some(cursor) = cursors.last_mut() {
            if *cursor == 0 {
                cursors.pop();
                weights.pop();
                if let Some(node) = path.pop() {
                    on_path.remove(&node);
                }
                continue;
            }
            *cursor -= 1;
            let index = *cursor;

            let (Some(&current), Some(&acc)) = (path.last(), weights.last()) else {
                break;
            };
            let edge = &self.graph.neighbours(current)[index];
            let next = edge.target;
            if on_path.contains(&next) {
                continue;
            }
            let weight = acc + edge.weight;
            if self.max_weight.is_some_and(|bound| weight > bound) {
                continue;
            }

            pops += 1;
            if pops > self.max_pops {
                return SearchStatus::LimitReached;
            }
            if path.len() + 1 > self.max_depth {
                continue;
            }

            path.push(next);
            if next == self.goal {
                let visit = on_goal(&path, weight);
                path.pop();
                if let Visit::Stop = visit {
                    return SearchStatus::Complete;
                }
                continue;
            }

            weights.push(weight);
            on_path.insert(next);
            cursors.push(self.graph.neighbours(next).len());
        }

        SearchStatus::Complete
    }
}

fn reconstruct_path(
    parents: &HashMap<NodeId, Option<NodeId>>,
    start: NodeId,
    goal: NodeId,
) -> Vec<NodeId> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(node) = current {
        path.push(node);
        if node == start {
            break;
        }
        current = parents.get(&node).copied().flatten();
    }
    path.reverse();
    path
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: NodeId,
    cost: FloatOrd,
}

impl QueueEntry {
    fn new(node: NodeId, cost: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{BuildOptions, GraphBuilder};

    /// Build a graph from `(from, to, weight)` triples over nodes laid out on
    /// a line, so node ids follow first appearance.
    fn graph_from(node_count: u32, edges: &[(u32, u32, f64)]) -> Graph {
        let mut builder = GraphBuilder::new(&BuildOptions::default()).unwrap();
        for id in 0..node_count {
            builder.get_or_create_node(f64::from(id) * 10.0, 0.0);
        }
        for &(a, b, w) in edges {
            builder
                .add_edge([f64::from(a) * 10.0, 0.0], [f64::from(b) * 10.0, 0.0], w, false, None)
                .unwrap();
        }
        builder.finish()
    }

    const A: NodeId = 0;
    const B: NodeId = 1;
    const C: NodeId = 2;
    const D: NodeId = 3;

    #[test]
    fn queue_entry_orders_by_lowest_cost_then_node() {
        let mut heap = BinaryHeap::new();
        heap.push(QueueEntry::new(5, 3.0));
        heap.push(QueueEntry::new(2, 1.0));
        heap.push(QueueEntry::new(1, 1.0));
        heap.push(QueueEntry::new(9, 0.5));
        let order: Vec<_> = std::iter::from_fn(|| heap.pop().map(|e| e.node)).collect();
        assert_eq!(order, vec![9, 1, 2, 5]);
    }

    #[test]
    fn dfs_explores_most_recently_pushed_first() {
        // 0 links to 1 then 2; both reach 3. A LIFO stack pops 2 first.
        let graph = graph_from(4, &[(A, B, 1.0), (A, C, 1.0), (B, D, 1.0), (C, D, 1.0)]);
        let result = bounded_dfs(&graph, A, D, &SafeSearchLimits::default()).unwrap();
        assert_eq!(result.path, Some(vec![A, C, D]));

        let all = enumerate_paths(&graph, A, D, &EnumerationLimits::default()).unwrap();
        let order: Vec<_> = all.paths.iter().map(|p| p.nodes.clone()).collect();
        assert_eq!(order, vec![vec![A, C, D], vec![A, B, D]]);
    }

    #[test]
    fn bounded_dfs_node_ceiling_aborts_search() {
        let graph = graph_from(4, &[(A, B, 1.0), (B, C, 1.0), (C, D, 1.0)]);
        let limits = SafeSearchLimits {
            max_nodes: 2,
            max_depth: 10,
        };
        let result = bounded_dfs(&graph, A, D, &limits).unwrap();
        assert_eq!(result.path, None);
        assert_eq!(result.status, SearchStatus::LimitReached);

        let limits = SafeSearchLimits {
            max_nodes: 4,
            max_depth: 10,
        };
        let result = bounded_dfs(&graph, A, D, &limits).unwrap();
        assert_eq!(result.path, Some(vec![A, B, C, D]));
        assert_eq!(result.status, SearchStatus::Complete);
    }

    #[test]
    fn bounded_dfs_depth_prunes_without_aborting() {
        // Long branch 0-1-2-3 and short branch 0-3 explored second.
        let graph = graph_from(4, &[(A, D, 1.0), (A, B, 1.0), (B, C, 1.0), (C, D, 1.0)]);
        let limits = SafeSearchLimits {
            max_nodes: 100,
            max_depth: 2,
        };
        let result = bounded_dfs(&graph, A, D, &limits).unwrap();
        assert_eq!(result.path, Some(vec![A, D]));
        assert_eq!(result.status, SearchStatus::Complete);
    }

    #[test]
    fn enumeration_iteration_ceiling_returns_partial() {
        let graph = graph_from(4, &[(A, B, 1.0), (B, D, 1.0), (A, C, 1.0), (C, D, 1.0)]);
        let limits = EnumerationLimits {
            max_iterations: 3,
            ..EnumerationLimits::default()
        };
        let result = enumerate_paths(&graph, A, D, &limits).unwrap();
        assert_eq!(result.status, SearchStatus::LimitReached);
        assert_eq!(result.paths.len(), 1);
    }

    #[test]
    fn zero_weight_bound_is_honoured() {
        let graph = graph_from(2, &[(A, B, 1.0)]);
        let limits = EnumerationLimits {
            max_total_weight: Some(0.0),
            ..EnumerationLimits::default()
        };
        let result = enumerate_paths(&graph, A, B, &limits).unwrap();
        assert!(result.paths.is_empty());
        assert_eq!(result.status, SearchStatus::Complete);
    }

    #[test]
    fn invalid_limits_are_rejected() {
        let graph = graph_from(2, &[(A, B, 1.0)]);
        let err = bounded_dfs(
            &graph,
            A,
            B,
            &SafeSearchLimits {
                max_nodes: 0,
                max_depth: 1,
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "max_nodes", .. }));

        let err = enumerate_paths(
            &graph,
            A,
            B,
            &EnumerationLimits {
                max_total_weight: Some(-1.0),
                ..EnumerationLimits::default()
            },
        )
        .unwrap_err();
        assert!(err.is_invalid_input());

        let err = enumerate_paths(
            &graph,
            A,
            B,
            &EnumerationLimits {
                max_total_weight: Some(f64::NAN),
                ..EnumerationLimits::default()
            },
        )
        .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn unknown_endpoints_fail_fast() {
        let graph = graph_from(2, &[(A, B, 1.0)]);
        assert!(matches!(
            fewest_edges(&graph, A, 42),
            Err(Error::UnknownNode { id: 42, .. })
        ));
        assert!(shortest_weighted(&graph, 42, A).is_err());
        assert!(bounded_dfs(&graph, 42, A, &SafeSearchLimits::default()).is_err());
        assert!(enumerate_paths(&graph, A, 42, &EnumerationLimits::default()).is_err());
    }

    #[test]
    fn distance_or_infinity() {
        assert_eq!(WeightedPath::distance_or_infinity(None), f64::INFINITY);
        let path = WeightedPath {
            nodes: vec![A, B],
            weight: 2.5,
        };
        assert_eq!(WeightedPath::distance_or_infinity(Some(&path)), 2.5);
        assert_eq!(path.hops(), 1);
    }

    #[test]
    fn dijkstra_skips_stale_entries() {
        // B is first reached at cost 10 then improved to 2 through C.
        let graph = graph_from(4, &[(A, B, 10.0), (A, C, 1.0), (C, B, 1.0), (B, D, 1.0)]);
        let path = shortest_weighted(&graph, A, D).unwrap().unwrap();
        assert_eq!(path.nodes, vec![A, C, B, D]);
        assert_eq!(path.weight, 3.0);
    }
}
