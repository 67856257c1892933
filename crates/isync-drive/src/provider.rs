//! HttpDrive - IRemoteDrive implementation for the drive web service
//!
//! Wraps the [`DriveClient`] to fulfil the [`IRemoteDrive`] port contract.
//!
//! ## Design Notes
//!
//! - Nodes with a type the engine does not know are dropped from listings
//!   with a debug log; they never reach the walker.
//! - `lookup` keeps the port's default implementation (scan the children);
//!   the service has no by-name endpoint.
//! - [`ApiError`](crate::ApiError) is mapped to `DriveError` at this
//!   boundary: `401`/`403` become `AuthExpired`, everything else
//!   `Unavailable`.

use std::sync::Arc;

use isync_core::domain::{DriveError, RemoteNode};
use isync_core::ports::{ByteStream, IRemoteDrive};
use tracing::debug;

use crate::client::{DriveClient, NodeResponse};

/// Remote drive backed by the HTTP drive API
#[derive(Clone)]
pub struct HttpDrive {
    client: Arc<DriveClient>,
}

impl HttpDrive {
    pub fn new(client: DriveClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Returns a reference to the underlying client
    pub fn client(&self) -> &DriveClient {
        &self.client
    }
}

/// Converts wire nodes, dropping unknown node types
fn known_nodes(items: Vec<NodeResponse>) -> Vec<RemoteNode> {
    items
        .into_iter()
        .filter_map(|item| {
            let (id, kind) = (item.id.clone(), item.kind.clone());
            let node = item.into_node();
            if node.is_none() {
                debug!(%id, %kind, "Dropping node of unknown type");
            }
            node
        })
        .collect()
}

#[async_trait::async_trait]
impl IRemoteDrive for HttpDrive {
    async fn root(&self) -> Result<Option<RemoteNode>, DriveError> {
        let Some(item) = self.client.get_root().await? else {
            debug!("Drive has no root");
            return Ok(None);
        };
        match item.into_node() {
            Some(node) if node.is_container() => Ok(Some(node)),
            _ => Err(DriveError::Unavailable(
                "drive root is not a container".to_string(),
            )),
        }
    }

    async fn children(&self, container: &RemoteNode) -> Result<Vec<RemoteNode>, DriveError> {
        let items = self.client.list_children(container.id()).await?;
        Ok(known_nodes(items))
    }

    async fn open(&self, file: &RemoteNode) -> Result<ByteStream, DriveError> {
        debug!(id = %file.id(), name = file.name(), "HttpDrive::open");
        Ok(self.client.download_stream(file.id()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, name: &str, kind: &str) -> NodeResponse {
        NodeResponse {
            id: id.to_string(),
            name: name.to_string(),
            kind: kind.to_string(),
            size: None,
        }
    }

    #[test]
    fn test_known_nodes_drops_unknown_types_and_keeps_order() {
        let nodes = known_nodes(vec![
            item("1", "b.txt", "file"),
            item("2", "Trash", "trash"),
            item("3", "Docs", "folder"),
            item("4", "Numbers", "app_library"),
        ]);

        let names: Vec<&str> = nodes.iter().map(RemoteNode::name).collect();
        assert_eq!(names, vec!["b.txt", "Docs", "Numbers"]);
    }

    #[test]
    fn test_http_drive_shares_client() {
        let drive = HttpDrive::new(DriveClient::new("http://localhost:1", "token"));
        let copy = drive.clone();
        assert_eq!(copy.client().access_token(), "token");
    }
}
