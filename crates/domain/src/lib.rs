//! Pulse Domain - Core types for the smoke-test pipeline
//!
//! This crate defines requests, responses, validation records and run
//! reports. All types here are pure Rust with no I/O dependencies.

pub mod error;
pub mod request;
pub mod response;
pub mod state;
pub mod testing;

pub use error::{DomainError, DomainResult};
pub use request::{HttpMethod, RequestSpec};
pub use response::{ResponseSpec, StatusCode};
pub use state::RunState;
pub use testing::{FailureNotice, RunReport, RunSummary, ScenarioResult, Validation};
