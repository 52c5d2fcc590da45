//! Route handlers. Each decodes a request message, calls the dialog service
//! and encodes the result.

pub mod dialog;
pub mod health;
