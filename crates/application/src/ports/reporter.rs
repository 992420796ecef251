//! Report sink port

use pulse_domain::{FailureNotice, RunSummary, ScenarioResult};

/// Receives the structured outcome of a run for display.
///
/// Rendering decisions (badges, colors, layout) belong to the implementor.
/// Implementations must not fail the run: output errors are theirs to log.
pub trait Reporter: Send + Sync {
    /// Called once before the first request of a run is sent.
    fn run_started(&self, _scenarios: usize) {}

    /// Publishes the results gathered so far, the summary and, when the run
    /// stopped early, the failure notice.
    fn publish(
        &self,
        results: &[ScenarioResult],
        summary: Option<&RunSummary>,
        failure: Option<&FailureNotice>,
    );
}
