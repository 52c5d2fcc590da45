//! Process-local storage, used by the `memory` driver and in tests.

pub mod dialog;
