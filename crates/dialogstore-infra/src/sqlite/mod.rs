//! SQLite storage layer.
//!
//! Dialog repository backed by SQLite with WAL mode and split read/write
//! connection pools, plus the migration runner that prepares the schema.

pub mod dialog;
pub mod migrate;
pub mod pool;
