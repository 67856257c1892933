//! Domain entities
//!
//! This module contains the core domain types for isync:
//! - Newtypes for validated relative paths and remote identifiers
//! - The remote node model and its closed kind enum
//! - The ignore list of pruned container names
//! - Traversal statistics
//! - Domain-specific error types

pub mod errors;
pub mod ignore;
pub mod newtypes;
pub mod node;
pub mod stats;

// Re-export commonly used types
pub use errors::{DomainError, DriveError};
pub use ignore::IgnoreList;
pub use newtypes::*;
pub use node::{ContainerKind, NodeKind, RemoteNode};
pub use stats::SyncStats;
