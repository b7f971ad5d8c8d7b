//! Configuration error types

/// Errors raised while configuring a data source.
///
/// These are fatal and surface at construction time rather than on first
/// use.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No read function was supplied to the builder.
    #[error("A read function is required to build a data source")]
    MissingReadFunction,

    /// Options could not be parsed.
    #[error("Invalid data source options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}
