//! Infrastructure layer for Dialogstore.
//!
//! Contains the implementations of the `DialogRepository` trait defined in
//! `dialogstore-core` (SQLite and in-memory), the versioned schema migration
//! runner, engine selection from configuration, and the config file loader.

pub mod config;
pub mod memory;
pub mod sqlite;
pub mod store;
