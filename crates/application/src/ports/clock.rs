//! Clock port used to stamp run summaries

use chrono::{DateTime, Utc};

/// Port for getting the current wall-clock time.
///
/// Elapsed durations are measured with `Instant`; this only supplies the
/// timestamp recorded in a `RunSummary`, so tests can pin it.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;
}
