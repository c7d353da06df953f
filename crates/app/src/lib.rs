//! Capture workflow application library.
//!
//! Exposes the orchestrator, session state, configuration, and the stdio
//! host bridge so integration tests and the binary entrypoint can both
//! access them.

pub mod bridge;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod session;
pub mod store;
