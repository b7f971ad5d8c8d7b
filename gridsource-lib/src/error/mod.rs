//! Error types

mod config;
mod fetch;

pub use config::*;
pub use fetch::*;

/// Errors returned by data source hook methods.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The data source was misconfigured.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A hook referenced a column index that does not exist.
    #[error("Unknown column {index} (grid has {len} columns)")]
    UnknownColumn {
        /// The requested column index.
        index: usize,
        /// Number of configured columns.
        len: usize,
    },
}

impl Error {
    /// Creates a new unknown column error.
    pub fn unknown_column(index: usize, len: usize) -> Self {
        Self::UnknownColumn { index, len }
    }
}
