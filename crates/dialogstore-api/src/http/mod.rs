//! RPC-over-HTTP layer for Dialogstore.
//!
//! Axum-based JSON endpoints, one `POST` route per dialog operation under
//! `/rpc/dialog/`, with a uniform response envelope and stable error codes.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
