//! Shared test helpers for drive API integration tests
//!
//! Provides wiremock-based mock server setup for the drive endpoints.
//! Each helper mounts the necessary mock endpoints; `setup_drive_mock`
//! returns an HttpDrive pointing at the mock server.

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use isync_drive::{DriveClient, HttpDrive};

pub const TEST_TOKEN: &str = "test-session-token";

/// Starts a mock server with a root folder and returns a
/// (MockServer, HttpDrive) tuple.
///
/// Pre-configured endpoints:
/// - GET /drive/root → folder `root-001`
pub async fn setup_drive_mock() -> (MockServer, HttpDrive) {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/drive/root"))
        .and(header("authorization", format!("Bearer {TEST_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "root-001",
            "name": "",
            "type": "folder",
            "size": null
        })))
        .mount(&server)
        .await;

    let drive = HttpDrive::new(DriveClient::new(server.uri(), TEST_TOKEN));
    (server, drive)
}

/// Mounts a children listing for a container id.
pub async fn mount_children(server: &MockServer, container_id: &str, items: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/drive/items/{container_id}/children")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": items })),
        )
        .mount(server)
        .await;
}

/// Mounts a file download endpoint for a specific item id.
pub async fn mount_download(server: &MockServer, item_id: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/drive/items/{item_id}/content")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(content.to_vec())
                .append_header("Content-Type", "application/octet-stream"),
        )
        .mount(server)
        .await;
}

/// Mounts a bare status response for any GET on `endpoint`.
pub async fn mount_status(server: &MockServer, endpoint: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
