//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for domain values.
//! Each newtype ensures data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Separator between segments of a [`SyncPath`]
pub const SEGMENT_SEPARATOR: char = '/';

// ============================================================================
// Path types
// ============================================================================

/// A file path relative to the traversal root, e.g. `"Documents/notes.txt"`
///
/// SyncPath ensures the path is:
/// - Non-empty, with no leading, trailing or doubled `/`
/// - Free of `.` and `..` segments, so it can never address anything
///   outside the local target directory
///
/// Paths are the only identity persisted in the listing cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SyncPath(String);

impl SyncPath {
    /// Create a new SyncPath from its slash-joined form
    ///
    /// # Errors
    /// Returns `DomainError::InvalidSyncPath` if any segment is empty or a dot
    /// segment, or if the path contains a line break (paths are stored one
    /// per line in the listing cache)
    pub fn new(path: impl Into<String>) -> Result<Self, DomainError> {
        let path = path.into();
        if path.is_empty() {
            return Err(DomainError::InvalidSyncPath("path is empty".to_string()));
        }

        for segment in path.split(SEGMENT_SEPARATOR) {
            if segment.is_empty() {
                return Err(DomainError::InvalidSyncPath(format!(
                    "empty segment in: {path}"
                )));
            }
            if segment == "." || segment == ".." {
                return Err(DomainError::InvalidSyncPath(format!(
                    "dot segment in: {path}"
                )));
            }
        }
        if has_line_break(&path) {
            return Err(DomainError::InvalidSyncPath(format!(
                "line break in: {path:?}"
            )));
        }

        Ok(Self(path))
    }

    /// Build a SyncPath from individual segments
    ///
    /// # Errors
    /// Returns error if there are no segments or a segment is invalid
    pub fn from_segments<I, S>(segments: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut joined = String::new();
        for segment in segments {
            let segment = validate_segment(segment.as_ref())?;
            if !joined.is_empty() {
                joined.push(SEGMENT_SEPARATOR);
            }
            joined.push_str(segment);
        }
        Self::new(joined)
    }

    /// Append a child name
    ///
    /// # Errors
    /// Returns error if the name is empty, a dot segment, or contains `/`
    pub fn join(&self, name: &str) -> Result<Self, DomainError> {
        let name = validate_segment(name)?;
        Ok(Self(format!("{}{SEGMENT_SEPARATOR}{name}", self.0)))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the segments in order
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEGMENT_SEPARATOR)
    }

    /// Number of segments (1 for a file directly under the root)
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// The last segment, i.e. the file name
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0
            .rsplit(SEGMENT_SEPARATOR)
            .next()
            .unwrap_or(self.0.as_str())
    }

    /// All segments except the last one (the intermediate container names)
    #[must_use]
    pub fn parent_segments(&self) -> Vec<&str> {
        let mut segments: Vec<&str> = self.segments().collect();
        segments.pop();
        segments
    }

    /// Map this path onto a local directory
    #[must_use]
    pub fn to_local(&self, target_dir: &Path) -> PathBuf {
        let mut out = target_dir.to_path_buf();
        out.extend(self.segments());
        out
    }
}

/// Validate a single name used as a path segment
fn validate_segment(segment: &str) -> Result<&str, DomainError> {
    if segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains(SEGMENT_SEPARATOR)
        || has_line_break(segment)
    {
        return Err(DomainError::InvalidSegment(segment.to_string()));
    }
    Ok(segment)
}

fn has_line_break(text: &str) -> bool {
    text.contains(|c: char| c == '\n' || c == '\r')
}

impl Display for SyncPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SyncPath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SyncPath {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<SyncPath> for String {
    fn from(path: SyncPath) -> Self {
        path.0
    }
}

impl AsRef<str> for SyncPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Remote identifiers
// ============================================================================

/// Adapter-defined handle addressing a node on the remote service
///
/// Only held in memory for the duration of a run; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(String);

impl RemoteId {
    /// Wrap a raw identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RemoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
