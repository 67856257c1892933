//! Drive web service client
//!
//! Provides a typed HTTP client for the drive API. Handles the bearer
//! authentication header, JSON deserialization, status classification and
//! endpoint construction.
//!
//! ## Endpoints
//!
//! - `GET /drive/root` - the root container (`404` when the drive has none)
//! - `GET /drive/items/{id}/children` - `{ "items": [node, ...] }`
//! - `GET /drive/items/{id}/content` - raw file bytes
//!
//! ## Usage
//!
//! ```rust,no_run
//! use isync_drive::client::DriveClient;
//!
//! # async fn example() -> Result<(), isync_drive::ApiError> {
//! let client = DriveClient::new("https://drive.example.invalid/api", "session-token");
//! if let Some(root) = client.get_root().await? {
//!     println!("root is {}", root.id);
//! }
//! # Ok(())
//! # }
//! ```

use std::io;
use std::time::Duration;

use futures_util::TryStreamExt;
use isync_core::domain::{NodeKind, RemoteId, RemoteNode};
use isync_core::ports::ByteStream;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use tokio_util::io::StreamReader;
use tracing::debug;
use url::Url;

use crate::ApiError;

/// Default timeout for metadata requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// API response types
// ============================================================================

/// A node as returned by the drive API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NodeResponse {
    pub id: String,
    pub name: String,
    /// Wire tag: `folder`, `app_library` or `file`
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Response from the children endpoint
#[derive(Debug, Deserialize)]
struct ChildrenResponse {
    items: Vec<NodeResponse>,
}

impl NodeResponse {
    /// Converts the wire node into a domain node
    ///
    /// Returns `None` for node types the engine does not handle.
    pub fn into_node(self) -> Option<RemoteNode> {
        match NodeKind::from_tag(&self.kind)? {
            NodeKind::Container(kind) => Some(RemoteNode::container(
                RemoteId::new(self.id),
                self.name,
                kind,
            )),
            NodeKind::Leaf => Some(RemoteNode::file(
                RemoteId::new(self.id),
                self.name,
                self.size,
            )),
        }
    }
}

// ============================================================================
// DriveClient
// ============================================================================

/// HTTP client for drive API calls
///
/// Wraps `reqwest::Client` with the session token and base URL.
pub struct DriveClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for API requests, without a trailing slash
    base_url: String,
    /// Bearer token of the established session
    access_token: String,
    /// Timeout applied to metadata requests (not to content downloads)
    timeout: Duration,
}

impl DriveClient {
    /// Creates a new DriveClient
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the drive API
    /// * `access_token` - Session token sent as a bearer token
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the timeout for metadata requests
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the base URL for API requests
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns a reference to the session token
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the URL of an endpoint from path segments
    ///
    /// Each segment is percent-encoded, so remote ids may contain any character.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Creates an authenticated request builder for the given method and URL
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.access_token)
    }

    /// Sends a metadata request and checks its status
    async fn send_json(&self, url: Url) -> Result<Response, ApiError> {
        let response = self
            .request(Method::GET, url)
            .timeout(self.timeout)
            .send()
            .await?;
        check_status(response).await
    }

    /// Fetches the root container
    ///
    /// # Returns
    /// `None` when the service answers `404`
    pub async fn get_root(&self) -> Result<Option<NodeResponse>, ApiError> {
        debug!("Fetching drive root");
        let url = self.endpoint(&["drive", "root"])?;
        match self.send_json(url).await {
            Ok(response) => Ok(Some(parse_json(response).await?)),
            Err(ApiError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Lists the children of a container, in service order
    pub async fn list_children(&self, id: &RemoteId) -> Result<Vec<NodeResponse>, ApiError> {
        let url = self.endpoint(&["drive", "items", id.as_str(), "children"])?;
        let response = self.send_json(url).await?;
        let children: ChildrenResponse = parse_json(response).await?;
        debug!(id = %id, count = children.items.len(), "Listed children");
        Ok(children.items)
    }

    /// Opens a streaming download of a file's content
    ///
    /// The body is not buffered; read errors surface as I/O errors on the
    /// returned stream.
    pub async fn download_stream(&self, id: &RemoteId) -> Result<ByteStream, ApiError> {
        let url = self.endpoint(&["drive", "items", id.as_str(), "content"])?;
        debug!(id = %id, "Downloading file");
        let response = self.request(Method::GET, url).send().await?;
        let response = check_status(response).await?;

        let body = Box::pin(response.bytes_stream().map_err(io::Error::other));
        Ok(Box::new(StreamReader::new(body)))
    }
}

/// Turns a non-success response into an [`ApiError`]
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    let message = if body.is_empty() {
        format!("GET {url}")
    } else {
        format!("GET {url}: {}", truncate(&body, 200))
    };
    Err(ApiError::from_status(status, message))
}

async fn parse_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
