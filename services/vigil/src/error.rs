//! Error types for the vigil service

/// Errors that can occur in the vigil service
#[derive(Debug, thiserror::Error)]
pub enum VigilError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for vigil operations
pub type Result<T> = std::result::Result<T, VigilError>;
