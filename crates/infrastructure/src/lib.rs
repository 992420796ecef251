//! Pulse Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer.

pub mod adapters;
pub mod reporting;

pub use adapters::{HttpClientConfig, ReqwestHttpClient, SystemClock};
pub use reporting::{ConsoleReporter, JsonReporter, StatusBadge};
