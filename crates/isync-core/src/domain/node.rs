//! Remote node model
//!
//! A [`RemoteNode`] is a read-only view of one entry in the remote drive:
//! a file or a container. Children are never cached on the node; every
//! traversal step asks the drive port for them.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use super::newtypes::RemoteId;

/// The two kinds of containers exposed by the drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    /// A regular folder
    Folder,
    /// An application library bundle, traversed exactly like a folder
    AppLibrary,
}

/// Node type, reduced to the two cases traversal cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Has children (folder or app library)
    Container(ContainerKind),
    /// Has byte content
    Leaf,
}

impl NodeKind {
    /// Wire tag for a regular folder
    pub const FOLDER_TAG: &'static str = "folder";
    /// Wire tag for an application library bundle
    pub const APP_LIBRARY_TAG: &'static str = "app_library";
    /// Wire tag for a file
    pub const FILE_TAG: &'static str = "file";

    /// Parse the string tag used by the remote service
    ///
    /// Returns `None` for tags the engine does not know how to handle.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            Self::FOLDER_TAG => Some(NodeKind::Container(ContainerKind::Folder)),
            Self::APP_LIBRARY_TAG => Some(NodeKind::Container(ContainerKind::AppLibrary)),
            Self::FILE_TAG => Some(NodeKind::Leaf),
            _ => None,
        }
    }

    /// The string tag used by the remote service
    pub fn as_tag(&self) -> &'static str {
        match self {
            NodeKind::Container(ContainerKind::Folder) => Self::FOLDER_TAG,
            NodeKind::Container(ContainerKind::AppLibrary) => Self::APP_LIBRARY_TAG,
            NodeKind::Leaf => Self::FILE_TAG,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, NodeKind::Container(_))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeKind::Leaf)
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// A node in the remote drive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteNode {
    id: RemoteId,
    name: String,
    kind: NodeKind,
    size: Option<u64>,
}

impl RemoteNode {
    /// Creates a container node
    pub fn container(id: RemoteId, name: impl Into<String>, kind: ContainerKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind: NodeKind::Container(kind),
            size: None,
        }
    }

    /// Creates a file node; `size` is `None` when the service does not report one
    pub fn file(id: RemoteId, name: impl Into<String>, size: Option<u64>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: NodeKind::Leaf,
            size,
        }
    }

    pub fn id(&self) -> &RemoteId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Reported size in bytes, if any
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// Reported size, with an absent size counted as zero
    pub fn size_or_zero(&self) -> u64 {
        self.size.unwrap_or(0)
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    pub fn is_file(&self) -> bool {
        self.kind.is_leaf()
    }
}
