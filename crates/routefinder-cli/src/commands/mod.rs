//! Subcommand handlers.
//!
//! Each module handles one subcommand; `main.rs` parses arguments and
//! dispatches here.

pub mod nearest;
pub mod route;
pub mod stats;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use tracing::info;

use routefinder_lib::{
    build_graph, load_source, parse_lonlat, resolve_crs, resolve_source_path, BuildOptions, Graph,
    NodeIndex, DEFAULT_SNAP_TOLERANCE,
};

use crate::output::Endpoint;

/// Options selecting and building the road graph, shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GraphArgs {
    /// GeoJSON or CSV road source. Falls back to `ROUTEFINDER_SOURCE`.
    #[arg(long, global = true)]
    pub source: Option<PathBuf>,

    /// CRS of CSV sources, e.g. EPSG:4326. Falls back to `ROUTEFINDER_CRS`.
    #[arg(long, global = true)]
    pub crs: Option<String>,

    /// Grid size, in metres, used to merge nearby coordinates into one node.
    #[arg(long, global = true, default_value_t = DEFAULT_SNAP_TOLERANCE)]
    pub snap_tolerance: f64,

    /// Honour `oneway` attributes instead of treating every road as two-way.
    #[arg(long, global = true)]
    pub respect_oneway: bool,
}

impl GraphArgs {
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            snap_tolerance: self.snap_tolerance,
            respect_oneway: self.respect_oneway,
        }
    }

    /// Resolve, read and build the graph.
    pub fn load(&self) -> Result<LoadedGraph> {
        let path = resolve_source_path(self.source.as_deref())
            .context("failed to locate the road source")?;
        let crs = resolve_crs(self.crs.as_deref()).context("invalid --crs value")?;
        let mut source = load_source(&path, crs)
            .with_context(|| format!("failed to read road source {}", path.display()))?;
        let graph = build_graph(source.as_mut(), &self.build_options())
            .with_context(|| format!("failed to build graph from {}", path.display()))?;
        info!(
            path = %path.display(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "graph loaded"
        );
        Ok(LoadedGraph { path, graph })
    }
}

/// A built graph and the file it came from.
pub struct LoadedGraph {
    pub path: PathBuf,
    pub graph: Graph,
}

impl LoadedGraph {
    pub fn source_name(&self) -> String {
        self.path.display().to_string()
    }
}

/// `clap` value parser for `lon,lat` arguments.
pub fn parse_point(value: &str) -> std::result::Result<[f64; 2], String> {
    parse_lonlat(value).map_err(|err| err.to_string())
}

/// Snap a query coordinate onto its nearest graph node.
pub fn snap(graph: &Graph, index: &NodeIndex, query: [f64; 2]) -> Result<Endpoint> {
    let nearest = index
        .nearest_lonlat(query[0], query[1])
        .ok_or_else(|| anyhow!("no graph node near {},{}", query[0], query[1]))?;
    let lonlat = graph
        .lonlat(nearest.node)
        .ok_or_else(|| anyhow!("node {} missing from graph", nearest.node))?;
    Ok(Endpoint {
        query,
        node: nearest.node,
        lonlat,
        snap_distance: nearest.distance,
    })
}
