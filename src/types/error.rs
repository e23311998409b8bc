//! Error types for the rewards service
//!
//! Every fallible operation in the crate returns [`RewardsError`]. Routes turn
//! it into a JSON error body with [`RewardsError::status_code`] and
//! [`RewardsError::code`].

use hyper::StatusCode;

/// Main error type for rewards operations
#[derive(Debug, thiserror::Error)]
pub enum RewardsError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Treasury error: {0}")]
    Treasury(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RewardsError {
    /// Convert error to HTTP status code
    ///
    /// Storage, treasury and configuration failures all surface as 500.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Treasury(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code for JSON bodies
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Database(_) => "DB_ERROR",
            Self::Treasury(_) => "TREASURY_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Message safe to return to clients
    ///
    /// Internal failures are logged in full but only summarised on the wire.
    pub fn public_message(&self) -> String {
        match self {
            Self::Database(_) => "Database error".to_string(),
            Self::Treasury(_) => "Treasury balance unavailable".to_string(),
            Self::Internal(_) | Self::Config(_) => "Internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for RewardsError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Serialization of our own responses; malformed request bodies are mapped
/// to `BadRequest` at the call site.
impl From<serde_json::Error> for RewardsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {}", err))
    }
}

impl From<mongodb::error::Error> for RewardsError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<reqwest::Error> for RewardsError {
    fn from(err: reqwest::Error) -> Self {
        Self::Treasury(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for RewardsError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Unauthorized(format!("JWT error: {}", err))
    }
}

/// Result type alias for rewards operations
pub type Result<T> = std::result::Result<T, RewardsError>;
