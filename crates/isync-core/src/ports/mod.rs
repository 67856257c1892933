//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are the interfaces the sync engine depends on, with their
//! implementations living in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IRemoteDrive`] - Read-only access to the remote drive tree

pub mod remote_drive;

pub use remote_drive::{ByteStream, IRemoteDrive};
