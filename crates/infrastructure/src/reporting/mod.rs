//! Terminal reporters.
//!
//! Both reporters implement the `Reporter` port and write to any
//! `std::io::Write`. Write failures are logged, never propagated.

mod console;
mod json;

pub use console::{ConsoleReporter, StatusBadge};
pub use json::JsonReporter;
