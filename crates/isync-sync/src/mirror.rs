//! Mirror orchestrator
//!
//! The [`MirrorOrchestrator`] takes the path list produced by a walk (or
//! restored from the listing cache) and makes the local target directory
//! contain every listed file.
//!
//! ## Per-path flow
//!
//! 1. Create the local parent directories, even if the file later turns out
//!    to be unresolvable
//! 2. Resolve the remote node by successive name lookups from the root
//! 3. Skip the file if the local length equals the reported remote size
//!    (unless update mode is on)
//! 4. Stream the remote content into the local file
//!
//! Files are processed one at a time in listing order. Failures affecting a
//! single file are collected in the report and the loop moves on; only an
//! expired session ends the run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use isync_core::domain::{DriveError, RemoteNode, SyncPath};
use isync_core::ports::IRemoteDrive;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that abort the mirror
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Remote drive error: {0}")]
    Drive(DriveError),
}

/// Summary of a mirror run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorReport {
    /// Number of paths handed to the mirror
    pub files_total: usize,
    /// Files downloaded and written locally
    pub files_written: usize,
    /// Files skipped because the local size already matched
    pub files_in_sync: usize,
    /// Paths whose remote node could not be resolved
    pub files_unresolved: usize,
    /// Per-file failures, formatted as `path: cause`
    pub errors: Vec<String>,
    /// True if the run was cancelled before every path was processed
    pub interrupted: bool,
}

impl MirrorReport {
    /// True when nothing had to be written and nothing failed
    pub fn is_already_in_sync(&self) -> bool {
        self.files_written == 0 && self.errors.is_empty()
    }
}

/// Outcome of mirroring a single path
#[derive(Debug, PartialEq, Eq)]
enum FileOutcome {
    Written,
    InSync,
    Unresolved,
    Interrupted,
}

/// Failure confined to a single path
#[derive(Debug)]
enum FileFailure {
    Drive(DriveError),
    Local { path: PathBuf, source: std::io::Error },
}

impl std::fmt::Display for FileFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileFailure::Drive(err) => write!(f, "{err}"),
            FileFailure::Local { path, source } => {
                write!(f, "local write to {} failed: {source}", path.display())
            }
        }
    }
}

impl From<DriveError> for FileFailure {
    fn from(err: DriveError) -> Self {
        FileFailure::Drive(err)
    }
}

fn local_failure(path: &Path) -> impl FnOnce(std::io::Error) -> FileFailure + '_ {
    move |source| FileFailure::Local {
        path: path.to_path_buf(),
        source,
    }
}

/// Downloads listed files into a local directory
pub struct MirrorOrchestrator {
    drive: Arc<dyn IRemoteDrive>,
    target_dir: PathBuf,
    update_mode: bool,
    cancel: CancellationToken,
}

impl MirrorOrchestrator {
    pub fn new(drive: Arc<dyn IRemoteDrive>, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            drive,
            target_dir: target_dir.into(),
            update_mode: false,
            cancel: CancellationToken::new(),
        }
    }

    /// Re-download files even when the local size matches
    pub fn update_mode(mut self, update_mode: bool) -> Self {
        self.update_mode = update_mode;
        self
    }

    /// Stops between files (or mid-download) when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Mirrors `paths` relative to the remote `root`
    pub async fn sync(
        &self,
        paths: &[SyncPath],
        root: &RemoteNode,
    ) -> Result<MirrorReport, MirrorError> {
        self.sync_with_progress(paths, root, |_, _, _| {}).await
    }

    /// Mirrors `paths`, calling `on_progress(done, total, path)` before each path
    ///
    /// # Errors
    /// Returns [`MirrorError::Drive`] only when the session has expired;
    /// every other failure is recorded in [`MirrorReport::errors`].
    #[tracing::instrument(skip(self, paths, root, on_progress), fields(dir = %self.target_dir.display(), files = paths.len(), update = self.update_mode))]
    pub async fn sync_with_progress<F>(
        &self,
        paths: &[SyncPath],
        root: &RemoteNode,
        mut on_progress: F,
    ) -> Result<MirrorReport, MirrorError>
    where
        F: FnMut(usize, usize, &SyncPath) + Send,
    {
        let mut report = MirrorReport {
            files_total: paths.len(),
            ..MirrorReport::default()
        };

        for (done, path) in paths.iter().enumerate() {
            if self.cancel.is_cancelled() {
                report.interrupted = true;
                break;
            }
            on_progress(done, paths.len(), path);

            match self.mirror_file(path, root).await {
                Ok(FileOutcome::Written) => report.files_written += 1,
                Ok(FileOutcome::InSync) => report.files_in_sync += 1,
                Ok(FileOutcome::Unresolved) => report.files_unresolved += 1,
                Ok(FileOutcome::Interrupted) => {
                    report.interrupted = true;
                    break;
                }
                Err(FileFailure::Drive(err)) if err.is_auth_expired() => {
                    return Err(MirrorError::Drive(err));
                }
                Err(failure) => {
                    warn!(path = %path, error = %failure, "Failed to mirror file");
                    report.errors.push(format!("{path}: {failure}"));
                }
            }
        }

        info!(
            written = report.files_written,
            in_sync = report.files_in_sync,
            unresolved = report.files_unresolved,
            errors = report.errors.len(),
            interrupted = report.interrupted,
            "Mirror finished"
        );
        Ok(report)
    }

    async fn mirror_file(
        &self,
        path: &SyncPath,
        root: &RemoteNode,
    ) -> Result<FileOutcome, FileFailure> {
        let parents = path.parent_segments();
        if !parents.is_empty() {
            let mut dir = self.target_dir.clone();
            dir.extend(&parents);
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(local_failure(&dir))?;
        }

        let container = self.resolve_container(root, &parents, path).await?;
        let node = match self.drive.lookup(&container, path.file_name()).await? {
            Some(node) if node.is_file() => node,
            Some(_) => {
                warn!(path = %path, "Remote node is not a file, skipping");
                return Ok(FileOutcome::Unresolved);
            }
            None => {
                warn!(path = %path, "Remote file not found, skipping");
                return Ok(FileOutcome::Unresolved);
            }
        };

        let local = path.to_local(&self.target_dir);
        if !self.update_mode && self.is_in_sync(&local, &node).await {
            debug!(path = %path, "Already in sync");
            return Ok(FileOutcome::InSync);
        }

        self.download(&node, &local, path).await
    }

    /// Walks the intermediate segments down from `root`
    ///
    /// A segment that cannot be resolved to a container leaves the previous
    /// container current and resolution carries on from there.
    async fn resolve_container(
        &self,
        root: &RemoteNode,
        parents: &[&str],
        path: &SyncPath,
    ) -> Result<RemoteNode, FileFailure> {
        let mut container = root.clone();
        for segment in parents {
            match self.drive.lookup(&container, segment).await? {
                Some(node) if node.is_container() => container = node,
                _ => {
                    warn!(
                        path = %path,
                        segment = *segment,
                        "Intermediate container not found, resolving from its parent"
                    );
                }
            }
        }
        Ok(container)
    }

    async fn is_in_sync(&self, local: &Path, node: &RemoteNode) -> bool {
        let Some(remote_size) = node.size() else {
            return false;
        };
        match tokio::fs::metadata(local).await {
            Ok(metadata) => metadata.is_file() && metadata.len() == remote_size,
            Err(_) => false,
        }
    }

    async fn download(
        &self,
        node: &RemoteNode,
        local: &Path,
        path: &SyncPath,
    ) -> Result<FileOutcome, FileFailure> {
        let mut stream = self.drive.open(node).await?;
        let mut file = tokio::fs::File::create(local)
            .await
            .map_err(local_failure(local))?;

        let copied = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            result = tokio::io::copy(&mut stream, &mut file) => Some(result),
        };
        file.flush().await.map_err(local_failure(local))?;

        match copied {
            Some(Ok(bytes)) => {
                debug!(path = %path, bytes, "Downloaded");
                Ok(FileOutcome::Written)
            }
            Some(Err(err)) => Err(FileFailure::Drive(DriveError::Unavailable(format!(
                "transfer interrupted: {err}"
            )))),
            None => {
                warn!(path = %path, "Download cancelled, local file left incomplete");
                Ok(FileOutcome::Interrupted)
            }
        }
    }
}
