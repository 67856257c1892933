//! Domain error types
//!
//! Errors raised by domain value construction and by the remote drive port.

use thiserror::Error;

/// Errors that can occur while building domain values
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A relative sync path is empty, has an empty segment or a dot segment
    #[error("Invalid sync path: {0}")]
    InvalidSyncPath(String),

    /// A single path segment is empty or contains a separator
    #[error("Invalid path segment: {0}")]
    InvalidSegment(String),
}

/// Errors surfaced by a remote drive adapter
///
/// "Not found" is never an error at this boundary: lookups return `None`
/// for missing children and `root()` returns `None` for a missing root.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriveError {
    /// Transport failure, unexpected status or malformed response
    #[error("Remote unavailable: {0}")]
    Unavailable(String),

    /// The session is no longer valid and must be re-established
    #[error("Remote session expired: {0}")]
    AuthExpired(String),
}

impl DriveError {
    /// Returns true if the error requires re-authentication
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, DriveError::AuthExpired(_))
    }
}

impl From<std::io::Error> for DriveError {
    fn from(err: std::io::Error) -> Self {
        DriveError::Unavailable(err.to_string())
    }
}
