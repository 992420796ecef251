//! Pulse Application - Ports and the run pipeline
//!
//! This crate defines the application layer with:
//! - Port traits (HTTP transport, report sink, clock)
//! - The validator and the fixed scenario plan
//! - The test runner state machine

pub mod error;
pub mod ports;
pub mod runner;
pub mod scenario;
pub mod validator;

pub use error::{ApplicationError, ApplicationResult};
pub use ports::{CancellationReceiver, CancellationToken, Clock, HttpClient, Reporter, TransportError};
pub use runner::{RunnerOptions, TestRunner};
pub use scenario::{RunContext, Scenario, ScenarioPlan};
pub use validator::{Predicate, PredicateError, Validator};
