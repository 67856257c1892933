//! Integration tests for root resolution and container listings

use isync_core::domain::{ContainerKind, DriveError, NodeKind, RemoteId, RemoteNode};
use isync_core::ports::IRemoteDrive;
use isync_drive::{DriveClient, HttpDrive};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use crate::common;

fn folder(id: &str) -> RemoteNode {
    RemoteNode::container(RemoteId::new(id), id, ContainerKind::Folder)
}

// ============================================================================
// Root
// ============================================================================

#[tokio::test]
async fn test_root_resolves_to_container() {
    let (_server, drive) = common::setup_drive_mock().await;

    let root = drive.root().await.expect("root request failed").unwrap();
    assert_eq!(root.id().as_str(), "root-001");
    assert_eq!(root.kind(), NodeKind::Container(ContainerKind::Folder));
}

#[tokio::test]
async fn test_root_not_found_is_absent() {
    let server = MockServer::start().await;
    common::mount_status(&server, "/drive/root", 404).await;
    let drive = HttpDrive::new(DriveClient::new(server.uri(), common::TEST_TOKEN));

    assert!(drive.root().await.unwrap().is_none());
}

#[tokio::test]
async fn test_root_unauthorized_is_auth_expired() {
    let server = MockServer::start().await;
    common::mount_status(&server, "/drive/root", 401).await;
    let drive = HttpDrive::new(DriveClient::new(server.uri(), "stale-token"));

    let err = drive.root().await.unwrap_err();
    assert!(err.is_auth_expired());
}

#[tokio::test]
async fn test_root_that_is_a_file_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/drive/root"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "x", "name": "x", "type": "file", "size": 1
        })))
        .mount(&server)
        .await;
    let drive = HttpDrive::new(DriveClient::new(server.uri(), common::TEST_TOKEN));

    assert!(matches!(
        drive.root().await,
        Err(DriveError::Unavailable(_))
    ));
}

// ============================================================================
// Children
// ============================================================================

#[tokio::test]
async fn test_children_in_service_order_with_unknown_types_dropped() {
    let (server, drive) = common::setup_drive_mock().await;
    common::mount_children(
        &server,
        "root-001",
        serde_json::json!([
            { "id": "f-1", "name": "notes.txt", "type": "file", "size": 50 },
            { "id": "x-1", "name": "Shared link", "type": "shortcut", "size": null },
            { "id": "d-1", "name": "Photos", "type": "folder", "size": null },
            { "id": "a-1", "name": "Keynote", "type": "app_library" },
            { "id": "f-2", "name": "blob.bin", "type": "file", "size": null }
        ]),
    )
    .await;

    let root = drive.root().await.unwrap().unwrap();
    let children = drive.children(&root).await.expect("listing failed");

    let names: Vec<&str> = children.iter().map(RemoteNode::name).collect();
    assert_eq!(names, vec!["notes.txt", "Photos", "Keynote", "blob.bin"]);
    assert_eq!(children[0].size(), Some(50));
    assert!(children[1].is_container());
    assert_eq!(
        children[2].kind(),
        NodeKind::Container(ContainerKind::AppLibrary)
    );
    assert_eq!(children[3].size(), None);
}

#[tokio::test]
async fn test_empty_container() {
    let (server, drive) = common::setup_drive_mock().await;
    common::mount_children(&server, "empty", serde_json::json!([])).await;

    let children = drive.children(&folder("empty")).await.unwrap();
    assert!(children.is_empty());
}

#[tokio::test]
async fn test_children_status_mapping() {
    let (server, drive) = common::setup_drive_mock().await;
    common::mount_status(&server, "/drive/items/expired/children", 401).await;
    common::mount_status(&server, "/drive/items/denied/children", 403).await;
    common::mount_status(&server, "/drive/items/broken/children", 503).await;
    common::mount_status(&server, "/drive/items/throttled/children", 429).await;

    assert!(drive
        .children(&folder("expired"))
        .await
        .unwrap_err()
        .is_auth_expired());
    assert!(drive
        .children(&folder("denied"))
        .await
        .unwrap_err()
        .is_auth_expired());
    assert!(matches!(
        drive.children(&folder("broken")).await,
        Err(DriveError::Unavailable(_))
    ));
    assert!(matches!(
        drive.children(&folder("throttled")).await,
        Err(DriveError::Unavailable(_))
    ));
}

#[tokio::test]
async fn test_malformed_listing_is_unavailable() {
    let (server, drive) = common::setup_drive_mock().await;
    Mock::given(method("GET"))
        .and(path("/drive/items/weird/children"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = drive.children(&folder("weird")).await.unwrap_err();
    assert!(matches!(err, DriveError::Unavailable(msg) if msg.contains("Invalid response")));
}

#[tokio::test]
async fn test_transport_failure_is_unavailable() {
    // Nothing listens on the reserved discard port.
    let drive = HttpDrive::new(DriveClient::new("http://127.0.0.1:9", common::TEST_TOKEN));

    assert!(matches!(
        drive.children(&folder("any")).await,
        Err(DriveError::Unavailable(_))
    ));
}

// ============================================================================
// Lookup
// ============================================================================

#[tokio::test]
async fn test_lookup_by_name() {
    let (server, drive) = common::setup_drive_mock().await;
    common::mount_children(
        &server,
        "root-001",
        serde_json::json!([
            { "id": "d-1", "name": "Documents", "type": "folder" },
            { "id": "f-1", "name": "notes.txt", "type": "file", "size": 5 }
        ]),
    )
    .await;
    let root = drive.root().await.unwrap().unwrap();

    let found = drive.lookup(&root, "notes.txt").await.unwrap().unwrap();
    assert_eq!(found.id().as_str(), "f-1");

    assert!(drive.lookup(&root, "missing.txt").await.unwrap().is_none());
}
