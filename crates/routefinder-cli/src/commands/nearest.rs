//! `routefinder nearest`: snap a coordinate onto the graph.

use anyhow::Result;
use clap::Args;

use routefinder_lib::NodeIndex;

use crate::commands::{parse_point, snap, GraphArgs};
use crate::output::{emit, NearestReport, OutputFormat};

#[derive(Args, Debug, Clone)]
pub struct NearestArgs {
    /// Query coordinate as `lon,lat`.
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    pub at: [f64; 2],
}

pub fn handle_nearest(
    graph_args: &GraphArgs,
    args: &NearestArgs,
    format: OutputFormat,
) -> Result<()> {
    let loaded = graph_args.load()?;
    let index = NodeIndex::build(&loaded.graph);
    let endpoint = snap(&loaded.graph, &index, args.at)?;
    let degree = loaded.graph.neighbours(endpoint.node).len();
    emit(format, &NearestReport { endpoint, degree })
}
