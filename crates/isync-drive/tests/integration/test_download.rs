//! Integration tests for streamed file content

use isync_core::domain::{DriveError, RemoteId, RemoteNode};
use isync_core::ports::IRemoteDrive;
use tokio::io::AsyncReadExt;

use crate::common;

fn file(id: &str, size: usize) -> RemoteNode {
    RemoteNode::file(RemoteId::new(id), format!("{id}.bin"), Some(size as u64))
}

async fn read_all(drive: &impl IRemoteDrive, node: &RemoteNode) -> Vec<u8> {
    let mut stream = drive.open(node).await.expect("open failed");
    let mut data = Vec::new();
    stream
        .read_to_end(&mut data)
        .await
        .expect("stream read failed");
    data
}

#[tokio::test]
async fn test_open_streams_content() {
    let (server, drive) = common::setup_drive_mock().await;

    let content = b"Hello from the drive! This is test content.";
    common::mount_download(&server, "download-001", content).await;

    let data = read_all(&drive, &file("download-001", content.len())).await;
    assert_eq!(data, content);
}

#[tokio::test]
async fn test_open_large_file() {
    let (server, drive) = common::setup_drive_mock().await;

    // 1MB spans many body chunks
    let content: Vec<u8> = (0..1_048_576).map(|i| (i % 256) as u8).collect();
    common::mount_download(&server, "large-001", &content).await;

    let data = read_all(&drive, &file("large-001", content.len())).await;
    assert_eq!(data.len(), 1_048_576);
    assert_eq!(data, content);
}

#[tokio::test]
async fn test_open_empty_file() {
    let (server, drive) = common::setup_drive_mock().await;
    common::mount_download(&server, "empty-001", &[]).await;

    let data = read_all(&drive, &file("empty-001", 0)).await;
    assert!(data.is_empty());
}

#[tokio::test]
async fn test_open_missing_content_is_unavailable() {
    let (_server, drive) = common::setup_drive_mock().await;

    let result = drive.open(&file("gone-001", 3)).await;
    assert!(matches!(result, Err(DriveError::Unavailable(_))));
}

#[tokio::test]
async fn test_open_unauthorized_is_auth_expired() {
    let (server, drive) = common::setup_drive_mock().await;
    common::mount_status(&server, "/drive/items/secret-001/content", 401).await;

    match drive.open(&file("secret-001", 3)).await {
        Err(err) => assert!(err.is_auth_expired()),
        Ok(_) => panic!("expected an auth error"),
    }
}
