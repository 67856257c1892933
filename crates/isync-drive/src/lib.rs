//! isync Drive - HTTP adapter for the drive web service
//!
//! Provides an async client for the session-authenticated JSON drive API
//! and the [`IRemoteDrive`](isync_core::ports::IRemoteDrive) implementation
//! built on it.
//!
//! ## Modules
//!
//! - [`client`] - Typed HTTP client for the drive endpoints
//! - [`provider`] - `HttpDrive`, the remote drive port adapter

pub mod client;
pub mod provider;

use isync_core::domain::errors::DriveError;
use reqwest::StatusCode;
use thiserror::Error;

pub use client::DriveClient;
pub use provider::HttpDrive;

/// Errors that can occur when communicating with the drive web service
#[derive(Debug, Error)]
pub enum ApiError {
    /// The session token is missing, invalid or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The session may not access the requested resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A server-side error occurred (5xx)
    #[error("Server error: {0}")]
    ServerError(String),

    /// Any other non-success status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The configured base URL cannot address the API
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Classifies a non-success status
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
            StatusCode::FORBIDDEN => ApiError::Forbidden(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            s if s.is_server_error() => ApiError::ServerError(format!("{s}: {message}")),
            s => ApiError::UnexpectedStatus {
                status: s.as_u16(),
                message,
            },
        }
    }
}

impl From<ApiError> for DriveError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized(_) | ApiError::Forbidden(_) => {
                DriveError::AuthExpired(err.to_string())
            }
            other => DriveError::Unavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, "x"),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, "x"),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, "x"),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "x"),
            ApiError::ServerError(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, "x"),
            ApiError::UnexpectedStatus { status: 429, .. }
        ));
    }

    #[test]
    fn test_drive_error_mapping() {
        let auth: DriveError = ApiError::Unauthorized("expired".into()).into();
        assert!(auth.is_auth_expired());

        let forbidden: DriveError = ApiError::Forbidden("nope".into()).into();
        assert!(forbidden.is_auth_expired());

        let server: DriveError = ApiError::ServerError("503".into()).into();
        assert!(matches!(server, DriveError::Unavailable(_)));

        let missing: DriveError = ApiError::NotFound("gone".into()).into();
        assert!(matches!(missing, DriveError::Unavailable(_)));
    }
}
