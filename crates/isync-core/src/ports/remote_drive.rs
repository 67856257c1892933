//! Remote drive port (driven/secondary port)
//!
//! This module defines the read-only interface the sync engine uses to
//! explore the remote tree and fetch file content. The HTTP adapter in
//! `isync-drive` implements it against the drive web service; tests use
//! in-memory fakes.
//!
//! ## Design Notes
//!
//! - Errors are typed as [`DriveError`] so the engine can tell an expired
//!   session (abort the run) from a transient failure (skip one file).
//! - "Not found" is not an error here: [`IRemoteDrive::root`] and
//!   [`IRemoteDrive::lookup`] return `None` instead.
//! - Uses `#[async_trait]` for async trait methods.

use tokio::io::AsyncRead;

use crate::domain::errors::DriveError;
use crate::domain::node::RemoteNode;

/// Readable byte stream of a remote file's content
pub type ByteStream = Box<dyn AsyncRead + Send + Unpin>;

/// Port trait for the remote drive
///
/// Implementations never mutate remote state.
#[async_trait::async_trait]
pub trait IRemoteDrive: Send + Sync {
    /// Resolves the traversal root
    ///
    /// # Returns
    /// `None` when the drive exposes no root container
    async fn root(&self) -> Result<Option<RemoteNode>, DriveError>;

    /// Lists the children of a container, in service order
    ///
    /// # Arguments
    /// * `container` - A node for which `is_container()` holds
    async fn children(&self, container: &RemoteNode) -> Result<Vec<RemoteNode>, DriveError>;

    /// Resolves a named child of a container
    ///
    /// The provided implementation scans [`IRemoteDrive::children`] and
    /// returns the first child with a matching name. Adapters with a cheaper
    /// lookup may override it.
    ///
    /// # Returns
    /// `None` if the container has no child with that name
    async fn lookup(
        &self,
        container: &RemoteNode,
        name: &str,
    ) -> Result<Option<RemoteNode>, DriveError> {
        let children = self.children(container).await?;
        Ok(children.into_iter().find(|child| child.name() == name))
    }

    /// Opens a readable stream of a file node's content
    ///
    /// A failure while reading the stream surfaces as an I/O error.
    async fn open(&self, file: &RemoteNode) -> Result<ByteStream, DriveError>;
}
