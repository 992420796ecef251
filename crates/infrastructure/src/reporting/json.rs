//! JSON report output.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use pulse_application::ports::Reporter;
use pulse_domain::{FailureNotice, RunSummary, ScenarioResult};
use serde::Serialize;

#[derive(Serialize)]
struct JsonReport<'a> {
    results: &'a [ScenarioResult],
    summary: Option<&'a RunSummary>,
    failure: Option<&'a FailureNotice>,
}

/// Writes each published report as one pretty-printed JSON document.
pub struct JsonReporter<W: Write + Send> {
    out: Mutex<W>,
}

impl JsonReporter<io::Stdout> {
    /// Reporter writing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> JsonReporter<W> {
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
}

impl<W: Write + Send> Reporter for JsonReporter<W> {
    fn publish(
        &self,
        results: &[ScenarioResult],
        summary: Option<&RunSummary>,
        failure: Option<&FailureNotice>,
    ) {
        let report = JsonReport {
            results,
            summary,
            failure,
        };
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let written = serde_json::to_writer_pretty(&mut *out, &report)
            .map_err(io::Error::from)
            .and_then(|()| writeln!(out))
            .and_then(|()| out.flush());
        if let Err(e) = written {
            tracing::error!(error = %e, "failed to write JSON report");
        }
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
    use serde_json::{Value, json};

    #[test]
    fn test_report_is_valid_json() {
        let results = vec![ScenarioResult {
            name: "GET /users".to_string(),
            method: HttpMethod::Get,
            url: "https://api.example.com/users".to_string(),
            response: ResponseSpec::json(200, json!([{"id": 1}])),
            validations: vec![Validation::pass("status 200 OK")],
        }];
        let summary = RunSummary::new(&results, Duration::from_millis(250), Utc::now());
        let failure = FailureNotice::new("POST /posts", "connection refused");

        let reporter = JsonReporter::new(Vec::new());
        reporter.publish(&results, Some(&summary), Some(&failure));
        let output: Value = serde_json::from_slice(&reporter.into_inner()).unwrap();

        assert_eq!(output["results"][0]["name"], json!("GET /users"));
        assert_eq!(output["results"][0]["method"], json!("GET"));
        assert_eq!(output["results"][0]["response"]["status"], json!(200));
        assert_eq!(output["results"][0]["validations"][0]["passed"], json!(true));
        assert_eq!(output["summary"]["total_scenarios"], json!(1));
        assert_eq!(output["failure"]["message"], json!("connection refused"));
    }

    #[test]
    fn test_missing_summary_and_failure_are_null() {
        let reporter = JsonReporter::new(Vec::new());
        reporter.publish(&[], None, None);
        let output: Value = serde_json::from_slice(&reporter.into_inner()).unwrap();

        assert_eq!(output, json!({"results": [], "summary": null, "failure": null}));
    }
}
