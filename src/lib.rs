//! A Redis-compatible in-memory data store.
//!
//! The crate provides:
//!
//! - A typed key space guarded by a single read/write lock, with lazy expiration
//!   on reads and an optional background sweeper
//! - Append-only streams with strictly increasing entry ids
//! - RDB snapshot loading at startup
//! - Storage and replication configuration, reported through `INFO` and `CONFIG GET`
//!
//! Clients talk to the server over RESP2; each connection runs in its own Tokio task.

pub mod commands;
pub mod config;
pub mod connection;
pub mod expiry;
pub mod input;
pub mod key_value_store;
pub mod rdb;
pub mod resp;
pub mod server;
pub mod stream;
