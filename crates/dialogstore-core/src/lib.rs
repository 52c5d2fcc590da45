//! Business logic and repository trait definitions for Dialogstore.
//!
//! This crate defines the "port" (repository trait) that the infrastructure
//! layer implements, and the service that enforces dialog invariants on top
//! of it. It depends only on `dialogstore-types` -- never on
//! `dialogstore-infra` or any database/IO crate.

pub mod repository;
pub mod service;
