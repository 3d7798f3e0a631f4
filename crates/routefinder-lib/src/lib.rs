//! Routefinder library entry points.
//!
//! This crate turns road line segments into a weighted graph and answers
//! point-to-point queries over it with four searches: fewest edges, shortest
//! weighted path, bounded depth-first search and alternative-path
//! enumeration. Higher-level consumers (CLI, HTTP service) should only depend
//! on the functions exported here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod error;
pub mod graph;
pub mod output;
pub mod path;
pub mod projection;
pub mod routing;
pub mod source;
pub mod spatial;

pub use error::{Error, Result};
pub use graph::{
    build_graph, BuildOptions, BuildStats, CoordinateIndex, Edge, EdgeMeta, Graph, GraphBuilder,
    NodeId, DEFAULT_SNAP_TOLERANCE,
};
pub use output::{render_path, RenderedPath, RouteSummary, NO_PATH_FOUND};
pub use path::{
    bounded_dfs, enumerate_paths, fewest_edges, shortest_weighted, BoundedSearch, Enumeration,
    EnumerationLimits, SafeSearchLimits, SearchStatus, WeightedPath,
};
pub use projection::{parse_lonlat, Crs};
pub use routing::{
    compare_routes, plan_route, resolve_algorithm, AlgorithmChoice, PlanStrategy, RouteAlgorithm,
    RouteMode, RoutePlan, RouteRequest,
};
pub use source::{
    load_source, resolve_crs, resolve_source_path, CsvSegmentSource, Direction, GeoJsonSource,
    MemorySource, Segment, SegmentSource,
};
pub use spatial::{NearestNode, NodeIndex};
