//! Shared application state for axum handlers.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::info;

use routefinder_lib::{build_graph, load_source, Error as LibError, Graph, NodeIndex};

use crate::config::ServiceConfig;
use crate::response::SnappedPoint;

#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    #[error("failed to load road graph: {0}")]
    Graph(#[from] LibError),

    #[error("invalid value '{value}' for {name}")]
    InvalidSetting { name: &'static str, value: String },
}

/// Graph, spatial index and query settings, loaded once at startup.
///
/// Cheap to clone; handlers receive it through axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    graph: Graph,
    index: NodeIndex,
    source: String,
    query_timeout: Duration,
    loaded_at: DateTime<Utc>,
}

impl AppState {
    pub fn load(config: &ServiceConfig) -> Result<Self, AppStateError> {
        info!(path = %config.source.display(), "loading road graph");
        let mut source = load_source(&config.source, config.crs)?;
        let graph = build_graph(source.as_mut(), &config.build)?;
        Ok(Self::from_graph(
            graph,
            config.source.display().to_string(),
            config.query_timeout,
        ))
    }

    pub fn from_graph(graph: Graph, source: impl Into<String>, query_timeout: Duration) -> Self {
        let index = NodeIndex::build(&graph);
        info!(
            nodes = graph.node_count(),
            adjacency_entries = graph.edge_count(),
            "application state ready"
        );
        Self {
            inner: Arc::new(AppStateInner {
                graph,
                index,
                source: source.into(),
                query_timeout,
                loaded_at: Utc::now(),
            }),
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.inner.graph
    }

    pub fn source(&self) -> &str {
        &self.inner.source
    }

    pub fn query_timeout(&self) -> Duration {
        self.inner.query_timeout
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.inner.loaded_at
    }

    /// Snap a `[lon, lat]` query onto the nearest graph node.
    pub fn snap(&self, query: [f64; 2]) -> Option<SnappedPoint> {
        let nearest = self.inner.index.nearest_lonlat(query[0], query[1])?;
        let lonlat = self.inner.graph.lonlat(nearest.node)?;
        Some(SnappedPoint {
            query,
            node: nearest.node,
            lonlat,
            snap_distance: nearest.distance,
        })
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("source", &self.inner.source)
            .field("nodes", &self.inner.graph.node_count())
            .field("query_timeout", &self.inner.query_timeout)
            .finish()
    }
}
