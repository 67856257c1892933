//! In-memory drive used by the engine tests

use std::collections::HashMap;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::task::{Context, Poll};

use isync_core::domain::{ContainerKind, DriveError, RemoteId, RemoteNode};
use isync_core::ports::{ByteStream, IRemoteDrive};
use tokio::io::{AsyncRead, ReadBuf};
use tokio_util::sync::CancellationToken;

pub(crate) const ROOT_ID: &str = "root";

#[derive(Default)]
struct State {
    nodes: HashMap<String, RemoteNode>,
    children: HashMap<String, Vec<String>>,
    content: HashMap<String, Vec<u8>>,
    listing_failures: HashMap<String, DriveError>,
    open_failures: HashMap<String, DriveError>,
    broken_streams: Vec<String>,
    cancelling_streams: HashMap<String, CancellationToken>,
    has_root: bool,
}

/// Drive whose tree lives in memory
///
/// Node ids double as test handles: `add_*` takes the parent id and the
/// new node's id.
pub(crate) struct FakeDrive {
    state: Mutex<State>,
    cancel_on_listing: Mutex<Option<CancellationToken>>,
    listings: AtomicUsize,
    opens: AtomicUsize,
}

impl FakeDrive {
    pub(crate) fn new() -> Self {
        let mut state = State {
            has_root: true,
            ..State::default()
        };
        let root = RemoteNode::container(RemoteId::new(ROOT_ID), "", ContainerKind::Folder);
        state.nodes.insert(ROOT_ID.to_string(), root);
        state.children.insert(ROOT_ID.to_string(), Vec::new());
        Self {
            state: Mutex::new(state),
            cancel_on_listing: Mutex::new(None),
            listings: AtomicUsize::new(0),
            opens: AtomicUsize::new(0),
        }
    }

    pub(crate) fn without_root() -> Self {
        let drive = Self::new();
        drive.state.lock().unwrap().has_root = false;
        drive
    }

    fn insert(&self, parent: &str, node: RemoteNode) {
        let mut state = self.state.lock().unwrap();
        let id = node.id().as_str().to_string();
        if node.is_container() {
            state.children.entry(id.clone()).or_default();
        }
        state
            .children
            .get_mut(parent)
            .unwrap_or_else(|| panic!("unknown parent {parent}"))
            .push(id.clone());
        state.nodes.insert(id, node);
    }

    pub(crate) fn add_folder(&self, parent: &str, id: &str, name: &str) -> &Self {
        self.insert(
            parent,
            RemoteNode::container(RemoteId::new(id), name, ContainerKind::Folder),
        );
        self
    }

    pub(crate) fn add_app_library(&self, parent: &str, id: &str, name: &str) -> &Self {
        self.insert(
            parent,
            RemoteNode::container(RemoteId::new(id), name, ContainerKind::AppLibrary),
        );
        self
    }

    /// Adds a file whose reported size is the content length
    pub(crate) fn add_file(&self, parent: &str, id: &str, name: &str, content: &[u8]) -> &Self {
        self.add_file_with_size(parent, id, name, content, Some(content.len() as u64))
    }

    pub(crate) fn add_file_with_size(
        &self,
        parent: &str,
        id: &str,
        name: &str,
        content: &[u8],
        size: Option<u64>,
    ) -> &Self {
        self.insert(parent, RemoteNode::file(RemoteId::new(id), name, size));
        self.state
            .lock()
            .unwrap()
            .content
            .insert(id.to_string(), content.to_vec());
        self
    }

    /// Replaces a file's content and reported size
    pub(crate) fn set_content(&self, id: &str, content: &[u8]) {
        let mut state = self.state.lock().unwrap();
        let node = state.nodes.get(id).cloned().expect("unknown file");
        let updated = RemoteNode::file(
            node.id().clone(),
            node.name(),
            Some(content.len() as u64),
        );
        state.nodes.insert(id.to_string(), updated);
        state.content.insert(id.to_string(), content.to_vec());
    }

    pub(crate) fn fail_listing(&self, id: &str, err: DriveError) {
        self.state
            .lock()
            .unwrap()
            .listing_failures
            .insert(id.to_string(), err);
    }

    pub(crate) fn fail_open(&self, id: &str, err: DriveError) {
        self.state
            .lock()
            .unwrap()
            .open_failures
            .insert(id.to_string(), err);
    }

    /// Makes the content stream of `id` fail after opening
    pub(crate) fn break_stream(&self, id: &str) {
        self.state.lock().unwrap().broken_streams.push(id.to_string());
    }

    /// Makes the content stream of `id` cancel `token` on its first read
    /// and then never yield data
    pub(crate) fn cancel_on_read(&self, id: &str, token: CancellationToken) {
        self.state
            .lock()
            .unwrap()
            .cancelling_streams
            .insert(id.to_string(), token);
    }

    /// Cancels `token` during the next listing call
    pub(crate) fn cancel_on_listing(&self, token: CancellationToken) {
        *self.cancel_on_listing.lock().unwrap() = Some(token);
    }

    pub(crate) fn node(&self, id: &str) -> RemoteNode {
        self.state.lock().unwrap().nodes[id].clone()
    }

    pub(crate) fn listings(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }

    pub(crate) fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IRemoteDrive for FakeDrive {
    async fn root(&self) -> Result<Option<RemoteNode>, DriveError> {
        let state = self.state.lock().unwrap();
        Ok(state.has_root.then(|| state.nodes[ROOT_ID].clone()))
    }

    async fn children(&self, container: &RemoteNode) -> Result<Vec<RemoteNode>, DriveError> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = self.cancel_on_listing.lock().unwrap().take() {
            token.cancel();
        }

        let state = self.state.lock().unwrap();
        let id = container.id().as_str();
        if let Some(err) = state.listing_failures.get(id) {
            return Err(err.clone());
        }
        let ids = state
            .children
            .get(id)
            .ok_or_else(|| DriveError::Unavailable(format!("not a container: {id}")))?;
        Ok(ids.iter().map(|child| state.nodes[child].clone()).collect())
    }

    async fn open(&self, file: &RemoteNode) -> Result<ByteStream, DriveError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        let id = file.id().as_str();
        if let Some(err) = state.open_failures.get(id) {
            return Err(err.clone());
        }
        if state.broken_streams.iter().any(|broken| broken == id) {
            return Ok(Box::new(BrokenStream));
        }
        if let Some(token) = state.cancelling_streams.get(id) {
            return Ok(Box::new(CancellingStream {
                token: token.clone(),
            }));
        }
        let content = state
            .content
            .get(id)
            .cloned()
            .ok_or_else(|| DriveError::Unavailable(format!("no content for {id}")))?;
        Ok(Box::new(io::Cursor::new(content)))
    }
}

/// Stream that fails on the first read
struct BrokenStream;

impl AsyncRead for BrokenStream {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "stream reset by peer",
        )))
    }
}

/// Stream that cancels a token when first read and stays pending
struct CancellingStream {
    token: CancellationToken,
}

impl AsyncRead for CancellingStream {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        self.token.cancel();
        Poll::Pending
    }
}
