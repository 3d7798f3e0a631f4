use std::path::PathBuf;

use thiserror::Error;

use crate::graph::NodeId;

/// Convenient result alias for the routefinder library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Geometry source could not be located at the resolved path.
    #[error("geometry source not found at {path}")]
    SourceNotFound { path: PathBuf },

    /// No source path was given and the environment did not provide one.
    #[error("no geometry source configured; pass --source or set {env_var}")]
    SourceNotConfigured { env_var: &'static str },

    /// Raised when the geometry source cannot be interpreted.
    #[error("malformed geometry source: {message}")]
    MalformedSource { message: String },

    /// Raised when a source does not declare a coordinate reference system.
    #[error("geometry source has no coordinate reference system defined")]
    MissingCrs,

    /// Raised when a source declares a coordinate reference system we cannot project.
    #[error("unsupported coordinate reference system: {name}")]
    UnsupportedCrs { name: String },

    /// Raised when a source yielded no usable edge.
    #[error("geometry source produced an empty graph")]
    EmptyGraph,

    /// Raised when a query references a node identifier outside the graph.
    #[error("node {id} is not present in the graph ({node_count} nodes)")]
    UnknownNode { id: NodeId, node_count: usize },

    /// Raised when a search or build parameter is out of range.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for CSV parsing errors.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedSource {
            message: message.into(),
        }
    }

    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Whether this error stems from caller input rather than the graph source.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Error::UnknownNode { .. } | Error::InvalidParameter { .. }
        )
    }
}
