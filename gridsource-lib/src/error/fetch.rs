//! Fetch error types

use std::sync::Arc;

/// Errors reported by an asynchronous read.
///
/// A failed read never reaches the caller of `refresh`; it is logged and
/// handed to the data source's error callback, if one is installed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// The read was rejected with a message.
    #[error("Read failed: {0}")]
    Rejected(String),

    /// The read failed with an underlying error.
    #[error("Read failed: {0}")]
    Source(Arc<dyn std::error::Error + Send + Sync>),
}

impl FetchError {
    /// Creates a rejection with the given reason.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }

    /// Wraps an underlying error.
    pub fn from_source(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Source(Arc::new(err))
    }

    /// Returns the rejection reason as text.
    pub fn reason(&self) -> String {
        match self {
            Self::Rejected(reason) => reason.clone(),
            Self::Source(err) => err.to_string(),
        }
    }
}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        Self::from_source(err)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::from_source(err)
    }
}
