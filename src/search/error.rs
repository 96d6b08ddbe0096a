//! Errors surfaced by [`Solver`](super::Solver).
//!
//! A lost claim race or an exhausted frontier are not errors; both are
//! ordinary search outcomes. Only misconfiguration and a maze that cannot be
//! searched at all are reported here.

use crate::maze::Vertex;

/// The error type for building a solver or starting a search.
#[derive(Debug)]
pub enum SolveError {
    /// The maze has no vertices.
    EmptyMaze,
    /// The maze's start vertex is not below its vertex count.
    StartOutOfRange {
        /// The reported start.
        start: Vertex,
        /// The reported vertex count.
        vertex_count: usize,
    },
    /// A configuration value failed validation.
    InvalidConfig(String),
    /// A configuration document could not be parsed.
    Config(serde_json::Error),
    /// The dedicated worker pool could not be created.
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl core::fmt::Display for SolveError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EmptyMaze => f.write_str("maze has no vertices"),
            Self::StartOutOfRange { start, vertex_count } => {
                write!(f, "start vertex {start} is out of range for {vertex_count} vertices")
            }
            Self::InvalidConfig(msg) => write!(f, "invalid solver configuration: {msg}"),
            Self::Config(err) => write!(f, "malformed solver configuration: {err}"),
            Self::ThreadPool(err) => write!(f, "failed to build worker pool: {err}"),
        }
    }
}

impl std::error::Error for SolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::ThreadPool(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rayon::ThreadPoolBuildError> for SolveError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(err)
    }
}
