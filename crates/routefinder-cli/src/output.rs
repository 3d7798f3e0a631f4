//! Output formatting for CLI reports.
//!
//! Every subcommand produces a serialisable report. `--format json` prints it
//! as pretty JSON, `--format text` through [`TextRender`].

use std::fmt::Write as _;
use std::io::{self, Write};

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

use routefinder_lib::{BuildStats, NodeId, RouteSummary};

use crate::terminal::ColorPalette;

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Human-readable rendering of a report.
pub trait TextRender {
    fn render_text(&self, palette: &ColorPalette) -> String;
}

/// Write `report` to stdout in the requested format.
pub fn emit<T: Serialize + TextRender>(format: OutputFormat, report: &T) -> Result<()> {
    let rendered = match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(report)?;
            json.push('\n');
            json
        }
        OutputFormat::Text => report.render_text(&ColorPalette::detect()),
    };
    let mut stdout = io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// A query coordinate and the graph node it snapped to.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Endpoint {
    pub query: [f64; 2],
    pub node: NodeId,
    pub lonlat: [f64; 2],
    /// Distance between the query and the node, in metres.
    pub snap_distance: f64,
}

impl Endpoint {
    fn describe(&self) -> String {
        format!(
            "{:.6},{:.6} -> node {} at {:.6},{:.6} ({:.1} m away)",
            self.query[0],
            self.query[1],
            self.node,
            self.lonlat[0],
            self.lonlat[1],
            self.snap_distance
        )
    }
}

/// Result of `routefinder route`.
#[derive(Debug, Clone, Serialize)]
pub struct RouteReport {
    pub from: Endpoint,
    pub to: Endpoint,
    #[serde(flatten)]
    pub summary: RouteSummary,
}

impl TextRender for RouteReport {
    fn render_text(&self, palette: &ColorPalette) -> String {
        let mut buffer = String::new();
        let _ = writeln!(buffer, "{}from:{} {}", palette.muted, palette.reset, self.from.describe());
        let _ = writeln!(buffer, "{}to:{}   {}", palette.muted, palette.reset, self.to.describe());
        buffer.push_str(&render_summary(&self.summary, palette));
        buffer
    }
}

/// Result of `routefinder compare`.
#[derive(Debug, Clone, Serialize)]
pub struct CompareReport {
    pub from: Endpoint,
    pub to: Endpoint,
    pub results: Vec<RouteSummary>,
}

impl TextRender for CompareReport {
    fn render_text(&self, palette: &ColorPalette) -> String {
        let mut buffer = String::new();
        let _ = writeln!(buffer, "{}from:{} {}", palette.muted, palette.reset, self.from.describe());
        let _ = writeln!(buffer, "{}to:{}   {}", palette.muted, palette.reset, self.to.describe());
        for summary in &self.results {
            buffer.push('\n');
            buffer.push_str(&render_summary(summary, palette));
        }
        buffer
    }
}

fn render_summary(summary: &RouteSummary, palette: &ColorPalette) -> String {
    let mut buffer = String::new();
    let mut lines = summary.render_plain();
    if summary.error.is_some() {
        lines = lines.replacen(
            routefinder_lib::NO_PATH_FOUND,
            &format!("{}{}{}", palette.error, routefinder_lib::NO_PATH_FOUND, palette.reset),
            1,
        );
    }
    for (index, line) in lines.lines().enumerate() {
        if index == 0 {
            let _ = writeln!(buffer, "{}{}{}", palette.heading, line, palette.reset);
        } else if line.starts_with("note:") {
            let _ = writeln!(buffer, "{}{}{}", palette.warning, line, palette.reset);
        } else {
            let _ = writeln!(buffer, "{line}");
        }
    }
    buffer
}

/// Result of `routefinder stats`.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub source: String,
    pub snap_tolerance: f64,
    pub respect_oneway: bool,
    #[serde(flatten)]
    pub stats: BuildStats,
}

impl TextRender for StatsReport {
    fn render_text(&self, palette: &ColorPalette) -> String {
        let mut buffer = String::new();
        let _ = writeln!(buffer, "{}Graph built from {}{}", palette.heading, self.source, palette.reset);
        let rows = [
            ("nodes", self.stats.nodes.to_string()),
            ("edges", self.stats.edges.to_string()),
            ("adjacency entries", self.stats.adjacency_entries.to_string()),
            ("segments", self.stats.segments.to_string()),
            ("skipped segments", self.stats.skipped_segments.to_string()),
            ("degenerate pairs", self.stats.degenerate_pairs.to_string()),
            ("snap tolerance", format!("{} m", self.snap_tolerance)),
            ("one-way respected", self.respect_oneway.to_string()),
        ];
        for (label, value) in rows {
            let _ = writeln!(buffer, "  {label:<18} {value}");
        }
        buffer
    }
}

/// Result of `routefinder nearest`.
#[derive(Debug, Clone, Serialize)]
pub struct NearestReport {
    #[serde(flatten)]
    pub endpoint: Endpoint,
    /// Number of outgoing edges at the node.
    pub degree: usize,
}

impl TextRender for NearestReport {
    fn render_text(&self, _palette: &ColorPalette) -> String {
        format!("{} degree {}\n", self.endpoint.describe(), self.degree)
    }
}
