//! Run lifecycle state.

use serde::{Deserialize, Serialize};

/// Lifecycle of a test runner.
///
/// - `Idle`: never run, or a previous run was abandoned mid-flight
/// - `Running`: a run is in progress, further triggers are rejected
/// - `Completed`: the last run executed every scenario
/// - `Failed`: the last run stopped early on a transport error or cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// No run in progress and no run finished yet.
    #[default]
    Idle,
    /// A run is in progress.
    Running,
    /// The last run finished every scenario.
    Completed,
    /// The last run stopped early.
    Failed,
}

impl RunState {
    /// Returns true if a run is in progress.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns true if the runner may start a new run from this state.
    #[must_use]
    pub const fn can_start(self) -> bool {
        !self.is_running()
    }
}
