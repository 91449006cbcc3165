//! Crate-level error types.

use std::fmt;

/// Errors produced by the tubemesh crate.
///
/// Configuration rejections leave the generator untouched; the previous
/// valid mesh stays in place.
#[derive(Debug)]
pub enum TubeError {
    /// A cross-section needs at least three edges.
    InvalidEdgeCount {
        /// The rejected edge count.
        requested: usize,
    },
    /// The change would push the mesh over the hard vertex ceiling.
    VertexBudgetExceeded {
        /// Name of the property whose change was rejected.
        property: &'static str,
        /// Vertex count the change would have produced.
        requested: usize,
        /// The ceiling.
        limit: usize,
    },
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Generic I/O failure.
    Io(std::io::Error),
}

impl fmt::Display for TubeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEdgeCount { requested } => write!(
                f,
                "edge count {requested} rejected: a tube needs at least \
                 three edges"
            ),
            Self::VertexBudgetExceeded {
                property,
                requested,
                limit,
            } => write!(
                f,
                "{property} change rejected: {requested} vertices exceeds \
                 the {limit} vertex limit"
            ),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for TubeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TubeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
