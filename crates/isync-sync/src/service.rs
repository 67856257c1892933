//! Sync service
//!
//! The [`SyncService`] is the entry point the front end calls. One
//! [`SyncService::run`] performs a complete pass:
//!
//! 1. **Validate** the local target directory
//! 2. **Resolve** the remote root
//! 3. **List** the remote files, either from the listing cache (operator
//!    opt-in) or by walking the tree and saving the result to the cache
//! 4. **Mirror** every listed file into the target directory
//!
//! Presentation is left to the caller: progress is delivered as
//! [`SyncEvent`]s and the result as a [`SyncReport`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use isync_core::domain::{IgnoreList, SyncPath, SyncStats};
use isync_core::ports::IRemoteDrive;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::listing_cache::ListingCache;
use crate::mirror::{MirrorOrchestrator, MirrorReport};
use crate::walker::{TreeWalker, WalkError};
use crate::SyncError;

/// Parameters of one sync run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    /// Local directory receiving the mirror
    pub target_dir: PathBuf,
    /// Re-download files even when the local size matches
    pub update_mode: bool,
    /// Restore the listing from the cache instead of walking, if possible
    pub use_cached_listing: bool,
}

impl SyncRequest {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
            update_mode: false,
            use_cached_listing: false,
        }
    }
}

/// Where the path listing of a run came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingSource {
    Walked,
    Cached,
}

/// Result of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    pub listing_source: ListingSource,
    /// Number of paths in the listing
    pub files_found: usize,
    /// Walk statistics; `None` when the listing came from the cache
    pub stats: Option<SyncStats>,
    pub mirror: MirrorReport,
    pub update_mode: bool,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    Completed(SyncReport),
    /// Cancelled by the operator
    Stopped,
}

impl SyncOutcome {
    /// Process exit status for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            SyncOutcome::Completed(_) => 0,
            SyncOutcome::Stopped => 130,
        }
    }
}

/// Progress notifications emitted during a run
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// The listing was restored from the cache
    ListingRestored { files: usize },
    /// A file was discovered during the walk
    WalkProgress(SyncStats),
    /// The walk finished
    WalkCompleted(SyncStats),
    /// A path is about to be mirrored
    MirrorProgress {
        done: usize,
        total: usize,
        path: SyncPath,
    },
}

/// Sequences target validation, listing and mirroring
pub struct SyncService {
    drive: Arc<dyn IRemoteDrive>,
    ignore: IgnoreList,
    cache: ListingCache,
    verbose: bool,
    cancel: CancellationToken,
}

impl SyncService {
    pub fn new(drive: Arc<dyn IRemoteDrive>, ignore: IgnoreList, cache: ListingCache) -> Self {
        Self {
            drive,
            ignore,
            cache,
            verbose: false,
            cancel: CancellationToken::new(),
        }
    }

    /// Logs per-container listing times during the walk
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cache(&self) -> &ListingCache {
        &self.cache
    }

    /// Runs a complete sync pass
    pub async fn run(&self, request: &SyncRequest) -> Result<SyncOutcome, SyncError> {
        self.run_with_observer(request, |_| {}).await
    }

    /// Runs a complete sync pass, reporting progress to `observer`
    ///
    /// # Errors
    /// - [`SyncError::InvalidTarget`] before any remote call is made
    /// - [`SyncError::RootUnavailable`] if the drive has no root
    /// - [`SyncError::Drive`] if a listing fails or the session expires
    #[tracing::instrument(skip(self, observer), fields(dir = %request.target_dir.display()))]
    pub async fn run_with_observer<F>(
        &self,
        request: &SyncRequest,
        mut observer: F,
    ) -> Result<SyncOutcome, SyncError>
    where
        F: FnMut(SyncEvent) + Send,
    {
        validate_target(&request.target_dir).await?;

        let root = self.drive.root().await?.ok_or(SyncError::RootUnavailable)?;

        let cached = if request.use_cached_listing {
            self.cache.load().await
        } else {
            Vec::new()
        };

        let (paths, stats, listing_source) = if cached.is_empty() {
            let walker = TreeWalker::new(Arc::clone(&self.drive), self.ignore.clone())
                .verbose(self.verbose)
                .with_cancellation(self.cancel.clone());

            let listing = match walker
                .walk_with_progress(&root, |stats| {
                    observer(SyncEvent::WalkProgress(stats.clone()))
                })
                .await
            {
                Ok(listing) => listing,
                Err(WalkError::Interrupted) => {
                    warn!("Stopping!");
                    return Ok(SyncOutcome::Stopped);
                }
                Err(WalkError::Drive(err)) => return Err(SyncError::Drive(err)),
            };

            info!(
                files = listing.stats.files_found,
                size_gb = listing.stats.size_gb,
                "Walk complete"
            );
            observer(SyncEvent::WalkCompleted(listing.stats.clone()));

            if let Err(err) = self.cache.save(&listing.paths).await {
                warn!(%err, "Could not save file list cache");
            }
            (listing.paths, Some(listing.stats), ListingSource::Walked)
        } else {
            info!(files = cached.len(), "Using cached file list");
            observer(SyncEvent::ListingRestored {
                files: cached.len(),
            });
            (cached, None, ListingSource::Cached)
        };

        let mirror = MirrorOrchestrator::new(Arc::clone(&self.drive), &request.target_dir)
            .update_mode(request.update_mode)
            .with_cancellation(self.cancel.clone())
            .sync_with_progress(&paths, &root, |done, total, path| {
                observer(SyncEvent::MirrorProgress {
                    done,
                    total,
                    path: path.clone(),
                })
            })
            .await?;

        if mirror.interrupted {
            warn!("Stopping!");
            return Ok(SyncOutcome::Stopped);
        }

        Ok(SyncOutcome::Completed(SyncReport {
            listing_source,
            files_found: paths.len(),
            stats,
            mirror,
            update_mode: request.update_mode,
        }))
    }
}

/// Checks that `dir` can receive the mirror
///
/// # Errors
/// Returns [`SyncError::InvalidTarget`] if `dir` is empty, the filesystem
/// root, or not an existing directory
pub async fn validate_target(dir: &Path) -> Result<(), SyncError> {
    if dir.as_os_str().is_empty() {
        return Err(SyncError::InvalidTarget(
            "No sync directory specified".to_string(),
        ));
    }
    if dir == Path::new("/") {
        return Err(SyncError::InvalidTarget("Cannot sync to root".to_string()));
    }
    match tokio::fs::metadata(dir).await {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        _ => Err(SyncError::InvalidTarget(
            "Sync path does not exist or is not a directory".to_string(),
        )),
    }
}
