use std::fmt::Write;

use serde::Serialize;

use crate::graph::{Graph, NodeId};
use crate::path::{SearchStatus, WeightedPath};
use crate::routing::{PlanStrategy, RouteMode, RoutePlan};

/// Message carried by summaries of plans that found nothing.
pub const NO_PATH_FOUND: &str = "no path found";

/// Translate a node sequence into `[lon, lat]` pairs.
///
/// Nodes outside the graph are skipped.
pub fn render_path(graph: &Graph, nodes: &[NodeId]) -> Vec<[f64; 2]> {
    nodes.iter().filter_map(|node| graph.lonlat(*node)).collect()
}

/// Road names along a path, with consecutive repeats collapsed.
pub fn road_names(graph: &Graph, nodes: &[NodeId]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for pair in nodes.windows(2) {
        let name = graph
            .edge(pair[0], pair[1])
            .and_then(|edge| edge.meta.as_ref())
            .and_then(|meta| meta.name.as_deref());
        if let Some(name) = name {
            if names.last().map(String::as_str) != Some(name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

fn round_mm(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// A path ready for presentation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RenderedPath {
    /// `[lon, lat]` pairs from start to goal.
    pub path: Vec<[f64; 2]>,
    /// Total weight in metres, rounded to the millimetre.
    pub weight: f64,
    pub hops: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roads: Vec<String>,
}

impl RenderedPath {
    pub fn from_path(graph: &Graph, path: &WeightedPath) -> Self {
        Self {
            path: render_path(graph, &path.nodes),
            weight: round_mm(path.weight),
            hops: path.hops(),
            roads: road_names(graph, &path.nodes),
        }
    }
}

/// Structured representation of a [`RoutePlan`] that the CLI and service serialise.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteSummary {
    pub mode: RouteMode,
    pub algorithm: PlanStrategy,
    pub status: SearchStatus,
    pub count: usize,
    pub paths: Vec<RenderedPath>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl RouteSummary {
    pub fn from_plan(graph: &Graph, plan: &RoutePlan) -> Self {
        let paths: Vec<RenderedPath> = plan
            .paths
            .iter()
            .map(|path| RenderedPath::from_path(graph, path))
            .collect();
        Self {
            mode: plan.mode,
            algorithm: plan.strategy,
            status: plan.status,
            count: paths.len(),
            error: paths.is_empty().then_some(NO_PATH_FOUND),
            paths,
            max_weight: plan.weight_bound.map(round_mm),
            note: plan.note.clone(),
        }
    }

    /// Plain-text rendering used by the CLI.
    pub fn render_plain(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "{} via {}: {} path(s){}",
            self.mode,
            self.algorithm,
            self.count,
            if self.status.is_partial() {
                " (search limit reached, results may be partial)"
            } else {
                ""
            }
        );
        if let Some(note) = &self.note {
            let _ = writeln!(buffer, "note: {note}");
        }
        if let Some(bound) = self.max_weight {
            let _ = writeln!(buffer, "weight bound: {bound:.3} m");
        }
        if let Some(error) = self.error {
            let _ = writeln!(buffer, "{error}");
        }

        for (index, path) in self.paths.iter().enumerate() {
            let _ = writeln!(
                buffer,
                "{:>3}: {:.3} m, {} hops",
                index + 1,
                path.weight,
                path.hops
            );
            if !path.roads.is_empty() {
                let _ = writeln!(buffer, "     via {}", path.roads.join(" -> "));
            }
            if matches!(self.algorithm, PlanStrategy::Search(_)) {
                for [lon, lat] in &path.path {
                    let _ = writeln!(buffer, "     {lon:.6},{lat:.6}");
                }
            }
        }
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_graph;
    use crate::graph::{BuildOptions, EdgeMeta};
    use crate::routing::{plan_route, RouteRequest};
    use crate::source::{MemorySource, Segment};

    fn named_road() -> Graph {
        let mut source = MemorySource::planar(vec![
            Segment::new(vec![[0.0, 0.0], [1000.0, 0.0], [2000.0, 0.0]]).with_meta(EdgeMeta {
                name: Some("Peace Avenue".into()),
                class: Some("primary".into()),
            }),
            Segment::new(vec![[2000.0, 0.0], [2000.0, 500.0]]).with_meta(EdgeMeta {
                name: Some("Chinggis Avenue".into()),
                class: None,
            }),
        ]);
        build_graph(&mut source, &BuildOptions::default()).unwrap()
    }

    #[test]
    fn road_names_collapse_repeats() {
        let graph = named_road();
        assert_eq!(
            road_names(&graph, &[0, 1, 2, 3]),
            vec!["Peace Avenue".to_string(), "Chinggis Avenue".to_string()]
        );
    }

    #[test]
    fn render_path_yields_lonlat() {
        let graph = named_road();
        let coords = render_path(&graph, &[0, 3]);
        assert_eq!(coords.len(), 2);
        assert!(coords[0][0].abs() < 1e-12);
        assert!(coords[1][0] > 0.0 && coords[1][1] > 0.0);
    }

    #[test]
    fn summary_reports_missing_path() {
        let mut source = MemorySource::planar(vec![
            Segment::new(vec![[0.0, 0.0], [1.0, 0.0]]),
            Segment::new(vec![[10.0, 0.0], [11.0, 0.0]]),
        ]);
        let graph = build_graph(&mut source, &BuildOptions::default()).unwrap();
        let plan = plan_route(&graph, &RouteRequest::new(0, 3, RouteMode::Shortest)).unwrap();
        let summary = RouteSummary::from_plan(&graph, &plan);
        assert_eq!(summary.error, Some(NO_PATH_FOUND));
        assert_eq!(summary.count, 0);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["error"], "no path found");
        assert_eq!(json["algorithm"], "Dijkstra");
        assert_eq!(json["mode"], "shortest");
    }

    #[test]
    fn summary_renders_text() {
        let graph = named_road();
        let plan = plan_route(&graph, &RouteRequest::new(0, 3, RouteMode::Shortest)).unwrap();
        let summary = RouteSummary::from_plan(&graph, &plan);
        assert_eq!(summary.paths[0].weight, 2500.0);
        let text = summary.render_plain();
        assert!(text.starts_with("shortest via Dijkstra: 1 path(s)"));
        assert!(text.contains("2500.000 m, 3 hops"));
        assert!(text.contains("via Peace Avenue -> Chinggis Avenue"));
    }
}
