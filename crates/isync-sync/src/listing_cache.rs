//! Persisted snapshot of the last complete walk
//!
//! The cache file holds one relative path per line, each terminated by `\n`.
//! It is only written after a walk finishes and is replaced atomically via
//! a sibling temporary file, so a reader never sees a partial listing.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use isync_core::domain::SyncPath;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Errors reading or writing the cache file
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cannot read listing cache {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write listing cache {path}: {source}")]
    Unwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Line-oriented store for a walk's path list
#[derive(Debug, Clone)]
pub struct ListingCache {
    path: PathBuf,
}

impl ListingCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the cache file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if a cache file is present
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Replaces the cache content with `paths`
    #[instrument(skip(self, paths), fields(path = %self.path.display(), entries = paths.len()))]
    pub async fn save(&self, paths: &[SyncPath]) -> Result<(), CacheError> {
        let unwritable = |source: std::io::Error| CacheError::Unwritable {
            path: self.path.clone(),
            source,
        };

        let mut content = String::with_capacity(paths.iter().map(|p| p.as_str().len() + 1).sum());
        for path in paths {
            content.push_str(path.as_str());
            content.push('\n');
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(unwritable)?;
            }
        }

        let tmp_path = {
            let mut p = self.path.as_os_str().to_owned();
            p.push(".tmp");
            PathBuf::from(p)
        };

        debug!(?tmp_path, "writing to temporary file");
        tokio::fs::write(&tmp_path, content)
            .await
            .map_err(unwritable)?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(unwritable)?;

        debug!("listing cache saved");
        Ok(())
    }

    /// Reads the cached paths in file order
    ///
    /// Blank lines are dropped and invalid lines are skipped with a warning.
    ///
    /// # Errors
    /// Returns [`CacheError::Unreadable`] if the file is missing or cannot be read
    pub async fn try_load(&self) -> Result<Vec<SyncPath>, CacheError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| CacheError::Unreadable {
                path: self.path.clone(),
                source,
            })?;

        let mut paths = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match SyncPath::new(line) {
                Ok(path) => paths.push(path),
                Err(err) => {
                    warn!(line = index + 1, %err, "Skipping invalid listing cache entry");
                }
            }
        }

        debug!(path = %self.path.display(), entries = paths.len(), "Loaded listing cache");
        Ok(paths)
    }

    /// Reads the cached paths, degrading to an empty list on any failure
    pub async fn load(&self) -> Vec<SyncPath> {
        match self.try_load().await {
            Ok(paths) => paths,
            Err(CacheError::Unreadable { source, .. }) if source.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No cached file list");
                Vec::new()
            }
            Err(err) => {
                warn!(%err, "Ignoring listing cache");
                Vec::new()
            }
        }
    }
}
