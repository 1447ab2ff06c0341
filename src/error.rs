//! Error types for ERP gateway operations.

use thiserror::Error;

/// Errors that can occur while talking to the ERP query gateway.
///
/// The lookup and cache helpers never produce these themselves; they hand
/// back whatever error the underlying client raised.
#[derive(Debug, Error)]
pub enum ErpError {
    /// Configuration is missing or incomplete.
    #[error("ERP configuration required: {0}")]
    ConfigMissing(String),

    /// A caller-supplied argument could not be used.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// API request failed.
    #[error("ERP API error: {message}")]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// Rate limited.
    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },
}

impl ErpError {
    /// HTTP status code of a failed API call, if there was one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ErpError::ApiError { status_code, .. } => *status_code,
            ErpError::RateLimited { .. } => Some(429),
            ErpError::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for ERP gateway operations.
pub type Result<T> = core::result::Result<T, ErpError>;
