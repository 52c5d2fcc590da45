//! Observability for Dialogstore: tracing subscriber setup and shutdown.

pub mod tracing_setup;
