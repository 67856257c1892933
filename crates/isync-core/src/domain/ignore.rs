//! Ignored container names
//!
//! The ignore list is a set of bare container names. A container whose name
//! is in the set is pruned from traversal together with its entire subtree,
//! at any depth. Matching is exact and never against full paths.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

/// Set of container names excluded from traversal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreList {
    names: HashSet<String>,
}

impl IgnoreList {
    /// Creates an empty ignore list
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the list from text content, one name per line
    ///
    /// Lines are trimmed; blank lines are dropped.
    pub fn parse(content: &str) -> Self {
        content.lines().collect()
    }

    /// Reads the ignore file at `path`
    ///
    /// A missing file yields an empty list.
    ///
    /// # Errors
    /// Returns any I/O error other than "not found"
    pub fn load(path: &Path) -> std::io::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let list = Self::parse(&content);
                debug!(path = %path.display(), names = list.len(), "Loaded ignore list");
                Ok(list)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No ignore file, nothing is ignored");
                Ok(Self::new())
            }
            Err(err) => Err(err),
        }
    }

    /// Returns true if a container with this name must be skipped
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for IgnoreList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let names = iter
            .into_iter()
            .map(|line| line.as_ref().trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        Self { names }
    }
}
