//! `routefinder route` and `routefinder compare`.

use anyhow::{Context, Result};
use clap::Args;

use routefinder_lib::path::{DEFAULT_ENUMERATION_MAX_DEPTH, DEFAULT_MAX_PATHS};
use routefinder_lib::{
    compare_routes, plan_route, NodeIndex, RouteMode, RouteRequest, RouteSummary,
};

use crate::commands::{parse_point, snap, GraphArgs};
use crate::output::{emit, CompareReport, Endpoint, OutputFormat, RouteReport};

/// Start and destination coordinates shared by `route` and `compare`.
#[derive(Args, Debug, Clone)]
pub struct EndpointArgs {
    /// Start coordinate as `lon,lat`.
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    pub from: [f64; 2],

    /// Destination coordinate as `lon,lat`.
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    pub to: [f64; 2],
}

#[derive(Args, Debug, Clone)]
pub struct RouteArgs {
    #[command(flatten)]
    pub endpoints: EndpointArgs,

    /// shortest, minsteps or all.
    #[arg(long, default_value_t = RouteMode::Shortest, value_parser = parse_mode)]
    pub mode: RouteMode,

    /// Search algorithm override: bfs, dijkstra or dfs.
    #[arg(long = "alg")]
    pub algorithm: Option<String>,

    /// Upper bound on alternatives returned in `all` mode.
    #[arg(long, default_value_t = DEFAULT_MAX_PATHS)]
    pub max_paths: usize,

    /// Longest alternative considered in `all` mode, in nodes.
    #[arg(long, default_value_t = DEFAULT_ENUMERATION_MAX_DEPTH)]
    pub max_depth: usize,

    /// Weight bound for `all` mode, in metres. Defaults to 1.5 times the
    /// shortest distance.
    #[arg(long)]
    pub max_weight: Option<f64>,
}

fn parse_mode(value: &str) -> std::result::Result<RouteMode, String> {
    value.parse::<RouteMode>().map_err(|err| err.to_string())
}

struct SnappedPair {
    from: Endpoint,
    to: Endpoint,
}

fn snap_pair(
    graph: &routefinder_lib::Graph,
    endpoints: &EndpointArgs,
) -> Result<SnappedPair> {
    let index = NodeIndex::build(graph);
    let from = snap(graph, &index, endpoints.from).context("failed to snap --from")?;
    let to = snap(graph, &index, endpoints.to).context("failed to snap --to")?;
    Ok(SnappedPair { from, to })
}

pub fn handle_route(graph_args: &GraphArgs, args: &RouteArgs, format: OutputFormat) -> Result<()> {
    let loaded = graph_args.load()?;
    let graph = &loaded.graph;
    let SnappedPair { from, to } = snap_pair(graph, &args.endpoints)?;

    let mut request = RouteRequest::new(from.node, to.node, args.mode)
        .with_max_paths(args.max_paths)
        .with_max_depth(args.max_depth);
    if let Some(algorithm) = &args.algorithm {
        request = request.with_algorithm(algorithm.as_str());
    }
    if let Some(max_weight) = args.max_weight {
        request = request.with_max_weight(max_weight);
    }

    let plan = plan_route(graph, &request).context("route planning failed")?;
    let report = RouteReport {
        from,
        to,
        summary: RouteSummary::from_plan(graph, &plan),
    };
    emit(format, &report)
}

pub fn handle_compare(
    graph_args: &GraphArgs,
    args: &EndpointArgs,
    format: OutputFormat,
) -> Result<()> {
    let loaded = graph_args.load()?;
    let graph = &loaded.graph;
    let SnappedPair { from, to } = snap_pair(graph, args)?;

    let plans = compare_routes(graph, from.node, to.node).context("route comparison failed")?;
    let report = CompareReport {
        from,
        to,
        results: plans
            .iter()
            .map(|plan| RouteSummary::from_plan(graph, plan))
            .collect(),
    };
    emit(format, &report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parser_rejects_unknown_modes() {
        assert_eq!(parse_mode("minsteps").unwrap(), RouteMode::MinSteps);
        let err = parse_mode("scenic").unwrap_err();
        assert!(err.contains("unknown mode 'scenic'"));
    }
}
