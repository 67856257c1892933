//! Remote tree walker
//!
//! The [`TreeWalker`] enumerates every file under a root container as a flat
//! list of slash-delimited [`SyncPath`]s, in depth-first pre-order.
//!
//! ## Traversal rules
//!
//! - Children are visited in the order the drive returns them
//! - A container whose bare name is in the [`IgnoreList`] is skipped together
//!   with its whole subtree, at any depth, and contributes nothing to the stats
//! - Folders and app libraries are traversed the same way
//!
//! The walk keeps an explicit work stack instead of recursing, pushing each
//! listing in reverse so that popping yields the recursive visiting order.

use std::sync::Arc;
use std::time::Instant;

use isync_core::domain::{DriveError, IgnoreList, RemoteNode, SyncPath, SyncStats};
use isync_core::ports::IRemoteDrive;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that end a walk
#[derive(Debug, Error)]
pub enum WalkError {
    /// The walk was cancelled before it completed
    #[error("Walk interrupted")]
    Interrupted,

    /// A container listing failed
    #[error("Remote listing failed: {0}")]
    Drive(#[from] DriveError),
}

/// Result of a complete walk
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    /// Every discovered file, in traversal order
    pub paths: Vec<SyncPath>,
    /// Counters accumulated during the walk
    pub stats: SyncStats,
}

/// Pending traversal step
enum Work {
    File { path: SyncPath, size: u64 },
    Container { node: RemoteNode, path: Option<SyncPath> },
}

/// Depth-first walker over the remote tree
pub struct TreeWalker {
    drive: Arc<dyn IRemoteDrive>,
    ignore: IgnoreList,
    verbose: bool,
    cancel: CancellationToken,
}

impl TreeWalker {
    pub fn new(drive: Arc<dyn IRemoteDrive>, ignore: IgnoreList) -> Self {
        Self {
            drive,
            ignore,
            verbose: false,
            cancel: CancellationToken::new(),
        }
    }

    /// Logs the timing of every container listing
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Stops the walk when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Walks the tree under `root`
    pub async fn walk(&self, root: &RemoteNode) -> Result<Listing, WalkError> {
        self.walk_with_progress(root, |_| {}).await
    }

    /// Walks the tree under `root`, calling `on_progress` after every file
    ///
    /// # Errors
    /// Returns [`WalkError::Interrupted`] if cancelled (no partial listing is
    /// ever returned) and [`WalkError::Drive`] if any listing fails.
    #[tracing::instrument(skip(self, root, on_progress), fields(ignored = self.ignore.len()))]
    pub async fn walk_with_progress<F>(
        &self,
        root: &RemoteNode,
        mut on_progress: F,
    ) -> Result<Listing, WalkError>
    where
        F: FnMut(&SyncStats) + Send,
    {
        let mut listing = Listing::default();
        let mut stack = vec![Work::Container {
            node: root.clone(),
            path: None,
        }];

        while let Some(work) = stack.pop() {
            match work {
                Work::File { path, size } => {
                    listing.stats.record_file(size);
                    listing.paths.push(path);
                    on_progress(&listing.stats);
                }
                Work::Container { node, path } => {
                    let started = Instant::now();
                    let children = self.list(&node).await?;
                    let elapsed = started.elapsed();
                    listing.stats.record_listing(elapsed);

                    if self.verbose {
                        info!(
                            "Processing {} ({:.5}s) ({:.5}s)",
                            log_prefix(path.as_ref()),
                            elapsed.as_secs_f64(),
                            listing.stats.traversal_time.as_secs_f64()
                        );
                    }

                    for child in children.into_iter().rev() {
                        if let Some(work) = self.plan_child(path.as_ref(), child) {
                            stack.push(work);
                        }
                    }
                }
            }
        }

        debug!(
            files = listing.stats.files_found,
            bytes = listing.stats.total_bytes,
            "Walk complete"
        );
        Ok(listing)
    }

    /// Lists a container, racing the call against cancellation
    async fn list(&self, container: &RemoteNode) -> Result<Vec<RemoteNode>, WalkError> {
        if self.cancel.is_cancelled() {
            return Err(WalkError::Interrupted);
        }

        let children = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(WalkError::Interrupted),
            result = self.drive.children(container) => result?,
        };

        if self.cancel.is_cancelled() {
            return Err(WalkError::Interrupted);
        }
        Ok(children)
    }

    /// Turns a listed child into a work item, or `None` if it is skipped
    fn plan_child(&self, parent: Option<&SyncPath>, child: RemoteNode) -> Option<Work> {
        if child.is_container() && self.ignore.contains(child.name()) {
            debug!(name = child.name(), "Skipping ignored container");
            return None;
        }

        let joined = match parent {
            Some(parent) => parent.join(child.name()),
            None => SyncPath::new(child.name()),
        };
        let path = match joined {
            Ok(path) => path,
            Err(err) => {
                warn!(name = child.name(), %err, "Skipping node with unusable name");
                return None;
            }
        };

        if child.is_container() {
            Some(Work::Container {
                node: child,
                path: Some(path),
            })
        } else {
            Some(Work::File {
                path,
                size: child.size_or_zero(),
            })
        }
    }
}

/// Path shown in the verbose listing log; empty for the root
fn log_prefix(path: Option<&SyncPath>) -> &str {
    path.map_or("", SyncPath::as_str)
}
