use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// Errors raised while loading a data source. Any of these aborts the whole
/// load; nothing from a failed load is ever published.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The source could not be opened, stat'ed or queried
    #[error("Source unavailable: {origin}: {reason}")]
    SourceUnavailable { origin: String, reason: String },

    /// A row failed to parse
    #[error("Malformed record in {origin} at row {row}, field `{field}`: {reason}")]
    MalformedRecord {
        origin: String,
        row: usize,
        field: &'static str,
        reason: String,
    },
}

impl LoadError {
    pub fn unavailable(origin: impl Into<String>, reason: impl ToString) -> Self {
        LoadError::SourceUnavailable {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, LoadError::MalformedRecord { .. })
    }
}

/// Errors raised by the query engine for bad caller input
#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueryError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Source loading errors
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Bad filter or projection input
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request validation errors
    #[error("{0}")]
    Validation(String),

    /// A configured capability is not available (e.g. no history source)
    #[error("{0}")]
    Unavailable(String),

    /// JSON encoding errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV encoding errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic error with message
    #[error("{0}")]
    Message(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Check if error was caused by caller input
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::Query(_) | AppError::Validation(_))
    }

    /// Get HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Query(_) | AppError::Validation(_) => 400,
            AppError::Unavailable(_) => 503,
            _ => 500,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, self.to_string()).into_response()
    }
}
