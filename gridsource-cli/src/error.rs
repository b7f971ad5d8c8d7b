use std::path::PathBuf;

use gridsource_lib::error::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid row data: {0}")]
    Rows(#[from] serde_json::Error),

    #[error("Failed to write output: {0}")]
    Output(#[source] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] gridsource_lib::error::Error),

    #[error("Invalid filter '{0}', expected FIELD=TEXT")]
    InvalidFilter(String),

    #[error("Invalid sort '{0}', expected FIELD[:asc|desc]")]
    InvalidSort(String),

    #[error("Field '{0}' is sorted more than once")]
    DuplicateSort(String),

    #[error("Failed to initialize logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}

impl CliError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
