//! `routefinder stats`: build the graph and report its shape.

use anyhow::Result;

use crate::commands::GraphArgs;
use crate::output::{emit, OutputFormat, StatsReport};

pub fn handle_stats(graph_args: &GraphArgs, format: OutputFormat) -> Result<()> {
    let loaded = graph_args.load()?;
    let report = StatsReport {
        source: loaded.source_name(),
        snap_tolerance: loaded.graph.snap_tolerance(),
        respect_oneway: graph_args.respect_oneway,
        stats: *loaded.graph.stats(),
    };
    emit(format, &report)
}
