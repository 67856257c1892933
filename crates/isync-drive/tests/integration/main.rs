//! Integration tests for isync-drive
//!
//! Uses wiremock to simulate the drive web service and verifies
//! end-to-end behavior of the DriveClient and the HttpDrive adapter.

mod common;

mod test_download;
mod test_listing;
