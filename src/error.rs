//! Error types for the logging facade

use thiserror::Error;

/// Errors produced while configuring the logger or rendering a record
#[derive(Debug, Error)]
pub enum LogError {
    /// The string is not one of the levels accepted as a minimum threshold
    #[error("log conf only allow [info, debug, warn], please check your configure (got {0:?})")]
    InvalidThreshold(String),

    /// A record could not be serialized by the JSON formatter
    #[error("failed to serialize log record: {0}")]
    Serialize(#[from] serde_json::Error),
}
