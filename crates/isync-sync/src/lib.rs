//! isync Sync - Remote-to-local mirror engine
//!
//! Provides:
//! - Depth-first enumeration of the remote tree with ignored containers pruned
//! - A persisted listing cache so the walk can be skipped on later runs
//! - Size-based mirroring of every listed file into a local directory
//!
//! ## Modules
//!
//! - [`walker`] - Tree walker producing the flat path listing and its stats
//! - [`listing_cache`] - Line-oriented store for the last complete listing
//! - [`mirror`] - Mirror orchestrator resolving and downloading each path
//! - [`service`] - Entry point sequencing validation, walk, cache and mirror

pub mod listing_cache;
pub mod mirror;
pub mod service;
pub mod walker;

#[cfg(test)]
mod testing;

use isync_core::domain::errors::DriveError;
use thiserror::Error;

pub use listing_cache::{CacheError, ListingCache};
pub use mirror::{MirrorError, MirrorOrchestrator, MirrorReport};
pub use service::{ListingSource, SyncEvent, SyncOutcome, SyncReport, SyncRequest, SyncService};
pub use walker::{Listing, TreeWalker, WalkError};

/// Errors that abort a sync run
///
/// Cancellation by the operator is not an error; it is reported as
/// [`SyncOutcome::Stopped`].
#[derive(Debug, Error)]
pub enum SyncError {
    /// The local target directory is unusable
    #[error("{0}")]
    InvalidTarget(String),

    /// The drive exposes no root container
    #[error("Remote drive has no root folder")]
    RootUnavailable,

    /// Listing failed or the session expired
    #[error("Remote drive error: {0}")]
    Drive(#[from] DriveError),
}

impl SyncError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        1
    }
}

impl From<MirrorError> for SyncError {
    fn from(err: MirrorError) -> Self {
        match err {
            MirrorError::Drive(err) => SyncError::Drive(err),
        }
    }
}
