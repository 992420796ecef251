//! Plain-text report output.

use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use pulse_application::ports::Reporter;
use pulse_domain::{FailureNotice, RunSummary, ScenarioResult};

/// Visual class of a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBadge {
    /// 200
    Success,
    /// 201
    Info,
    /// 204
    Neutral,
    /// Anything else
    Danger,
}

impl StatusBadge {
    /// Picks the badge for a status code.
    #[must_use]
    pub const fn for_status(status: u16) -> Self {
        match status {
            200 => Self::Success,
            201 => Self::Info,
            204 => Self::Neutral,
            _ => Self::Danger,
        }
    }

    /// Short label shown next to the status.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Neutral => "neutral",
            Self::Danger => "danger",
        }
    }
}

/// Renders one block per scenario followed by the run summary.
pub struct ConsoleReporter<W: Write + Send> {
    out: Mutex<W>,
}

impl ConsoleReporter<io::Stdout> {
    /// Reporter writing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleReporter<W> {
    /// Reporter writing to `out`.
    pub const fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    /// Renders the report as text.
    #[must_use]
    pub fn render(
        results: &[ScenarioResult],
        summary: Option<&RunSummary>,
        failure: Option<&FailureNotice>,
    ) -> String {
        let mut text = String::new();

        for result in results {
            let status = result.response.status;
            let _ = writeln!(
                text,
                "{}  [HTTP {status} | {}]  {} ms",
                result.name,
                StatusBadge::for_status(status).label(),
                result.response.elapsed_ms(),
            );
            let _ = writeln!(text, "  {} {}", result.method, result.url);
            for validation in &result.validations {
                let mark = if validation.passed { "✓" } else { "✗" };
                let _ = writeln!(text, "  {mark} {}", validation.description);
            }
            text.push('\n');
        }

        if let Some(failure) = failure {
            let _ = writeln!(text, "✗ Error running the tests: {failure}\n");
        }

        if let Some(summary) = summary {
            let _ = writeln!(
                text,
                "Tests completed in {:.2} seconds. Total tests executed: {}.",
                summary.total_elapsed_seconds, summary.total_scenarios,
            );
            let _ = writeln!(
                text,
                "Passed: {}/{}",
                summary.passed_scenarios, summary.total_scenarios
            );
        }

        text
    }
}

/// Line shown while the requests are in flight.
const RUNNING_LINE: &str = "Running tests...";

impl<W: Write + Send> ConsoleReporter<W> {
    fn emit(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
            tracing::error!(error = %e, "failed to write report");
        }
    }
}

impl<W: Write + Send> Reporter for ConsoleReporter<W> {
    fn run_started(&self, _scenarios: usize) {
        self.emit(&format!("{RUNNING_LINE}\n\n"));
    }

    fn publish(
        &self,
        results: &[ScenarioResult],
        summary: Option<&RunSummary>,
        failure: Option<&FailureNotice>,
    ) {
        self.emit(&Self::render(results, summary, failure));
    }
}

impl std::fmt::Display for StatusBadge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use pulse_domain::{HttpMethod, ResponseSpec, Validation};
    use serde_json::json;

    fn result(name: &str, status: u16, validations: Vec<Validation>) -> ScenarioResult {
        let mut response = ResponseSpec::json(status, json!({}));
        response.elapsed = Duration::from_millis(42);
        ScenarioResult {
            name: name.to_string(),
            method: HttpMethod::Get,
            url: "https://api.example.com/users".to_string(),
            response,
            validations,
        }
    }

    #[test]
    fn test_badges_distinguish_status_classes() {
        assert_eq!(StatusBadge::for_status(200), StatusBadge::Success);
        assert_eq!(StatusBadge::for_status(201), StatusBadge::Info);
        assert_eq!(StatusBadge::for_status(204), StatusBadge::Neutral);
        assert_eq!(StatusBadge::for_status(202), StatusBadge::Danger);
        assert_eq!(StatusBadge::for_status(500), StatusBadge::Danger);
    }

    #[test]
    fn test_render_cards_and_summary() {
        let results = vec![result(
            "GET /users",
            200,
            vec![
                Validation::pass("status 200 OK"),
                Validation::fail("response contains users"),
            ],
        )];
        let summary = RunSummary::new(&results, Duration::from_millis(1234), Utc::now());

        let text = ConsoleReporter::<Vec<u8>>::render(&results, Some(&summary), None);

        assert_eq!(
            text,
            "GET /users  [HTTP 200 | success]  42 ms\n\
             \x20 GET https://api.example.com/users\n\
             \x20 ✓ status 200 OK\n\
             \x20 ✗ response contains users\n\
             \n\
             Tests completed in 1.23 seconds. Total tests executed: 1.\n\
             Passed: 0/1\n"
        );
    }

    #[test]
    fn test_publish_writes_failure_notice() {
        let reporter = ConsoleReporter::new(Vec::new());
        let failure = FailureNotice::new("GET /users", "connection refused");
        let summary = RunSummary::new(&[], Duration::ZERO, Utc::now());

        reporter.publish(&[], Some(&summary), Some(&failure));
        let text = String::from_utf8(reporter.into_inner()).unwrap();

        assert!(text.starts_with("✗ Error running the tests: GET /users: connection refused\n"));
        assert!(text.contains("Total tests executed: 0."));
    }

    #[test]
    fn test_running_line_precedes_report() {
        let reporter = ConsoleReporter::new(Vec::new());
        let summary = RunSummary::new(&[], Duration::ZERO, Utc::now());

        reporter.run_started(4);
        reporter.publish(&[], Some(&summary), None);
        let text = String::from_utf8(reporter.into_inner()).unwrap();

        assert!(text.starts_with("Running tests...\n\nTests completed in "));
    }
}
