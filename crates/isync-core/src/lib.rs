//! isync Core - Domain types and port definitions
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `RemoteNode`, `SyncPath`, `IgnoreList`, `SyncStats`
//! - **Port definitions** - `IRemoteDrive`, implemented by the HTTP adapter
//! - **Configuration** - the YAML config file and its defaults
//!
//! # Architecture
//!
//! The domain module holds plain values with no I/O beyond reading the
//! ignore file. The sync engine in `isync-sync` drives the remote tree
//! exclusively through the ports defined here.

pub mod config;
pub mod domain;
pub mod ports;
