/// Errors produced while building a log backend or writing a record.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("unrecognized log format \"{format}\"")]
    InvalidFormat { format: String },

    #[error("unrecognized log level \"{level}\"")]
    InvalidLevel { level: String },

    #[error("failed to write log record: {0}")]
    Write(#[from] std::io::Error),

    #[error("failed to encode log record: {0}")]
    Encode(#[from] serde_json::Error),
}
