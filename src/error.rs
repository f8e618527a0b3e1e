//! Error types shared by the graph builders, the DIMACS reader and the simulator.

use thiserror::Error;

/// Errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A builder was invoked before the structure it derives from exists.
    #[error("{operation} requires {dependency}")]
    MissingDependency {
        operation: &'static str,
        dependency: &'static str,
    },

    /// The requested file encoding isn't supported.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// CSR arrays are structurally inconsistent (lengths, ranges or symmetry).
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// Simulation parameters don't fit the topology.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A graph file couldn't be parsed.
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// I/O failure while reading or writing a graph file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The simulation didn't terminate within the allotted number of steps.
    #[error("simulation did not end after {limit} steps (global iteration {glob_iter})")]
    StepLimit { limit: usize, glob_iter: usize },
}

/// Convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn missing(operation: &'static str, dependency: &'static str) -> Self {
        tracing::warn!(operation, dependency, "missing dependency");
        Self::MissingDependency {
            operation,
            dependency,
        }
    }
}
