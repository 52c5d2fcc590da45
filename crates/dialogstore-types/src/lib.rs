//! Shared domain types for Dialogstore.
//!
//! This crate contains the Dialog entity with its one-shot reply transition,
//! the domain error taxonomy, and the configuration values handed to the
//! storage layer at startup.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod config;
pub mod dialog;
pub mod error;
