//! Scenario results and run reports.
//!
//! These are the structured values the runner hands to a reporter. They are
//! created once and never modified afterwards.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::request::HttpMethod;
use crate::response::ResponseSpec;
use crate::state::RunState;

/// Outcome of one named check against a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    /// Human-readable description of the check.
    pub description: String,
    /// Whether the check passed.
    pub passed: bool,
}

impl Validation {
    /// Create a passed validation.
    #[must_use]
    pub fn pass(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            passed: true,
        }
    }

    /// Create a failed validation.
    #[must_use]
    pub fn fail(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            passed: false,
        }
    }
}

/// Everything recorded about one executed scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Scenario name, e.g. `GET /users`.
    pub name: String,
    /// Method that was sent.
    pub method: HttpMethod,
    /// URL that was requested.
    pub url: String,
    /// The response received.
    pub response: ResponseSpec,
    /// Check outcomes, in declaration order.
    pub validations: Vec<Validation>,
}

impl ScenarioResult {
    /// Returns true when every validation passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.validations.iter().all(|v| v.passed)
    }

    /// Number of failed validations.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.validations.iter().filter(|v| !v.passed).count()
    }
}

/// Timing and count totals for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Scenarios that actually executed.
    pub total_scenarios: usize,
    /// Scenarios whose validations all passed.
    pub passed_scenarios: usize,
    /// Wall-clock time of the whole run.
    pub total_elapsed_seconds: f64,
    /// When the run started.
    pub started_at: DateTime<Utc>,
}

impl RunSummary {
    /// Computes the summary for the scenarios that completed.
    #[must_use]
    pub fn new(results: &[ScenarioResult], elapsed: Duration, started_at: DateTime<Utc>) -> Self {
        Self {
            total_scenarios: results.len(),
            passed_scenarios: results.iter().filter(|r| r.all_passed()).count(),
            total_elapsed_seconds: elapsed.as_secs_f64(),
            started_at,
        }
    }
}

/// Why a run stopped before executing every scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureNotice {
    /// Name of the scenario that could not complete.
    pub scenario: String,
    /// Error message.
    pub message: String,
}

impl FailureNotice {
    /// Creates a failure notice.
    #[must_use]
    pub fn new(scenario: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FailureNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.scenario, self.message)
    }
}

/// The complete outcome of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Identifier of the run, used in logs.
    pub run_id: Uuid,
    /// Results of the scenarios that completed, in execution order.
    pub results: Vec<ScenarioResult>,
    /// Totals for the run.
    pub summary: RunSummary,
    /// Present when the run stopped early.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureNotice>,
}

impl RunReport {
    /// Terminal state the run ended in.
    #[must_use]
    pub const fn state(&self) -> RunState {
        if self.failure.is_some() {
            RunState::Failed
        } else {
            RunState::Completed
        }
    }

    /// Returns true when the run completed and every validation passed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failure.is_none() && self.results.iter().all(ScenarioResult::all_passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn result(name: &str, validations: Vec<Validation>) -> ScenarioResult {
        ScenarioResult {
            name: name.to_string(),
            method: HttpMethod::Get,
            url: format!("https://api.example.com/{name}"),
            response: ResponseSpec::json(200, json!({})),
            validations,
        }
    }

    #[test]
    fn test_scenario_result_pass_counts() {
        let ok = result("a", vec![Validation::pass("x"), Validation::pass("y")]);
        assert!(ok.all_passed());
        assert_eq!(ok.failed_count(), 0);

        let bad = result("b", vec![Validation::pass("x"), Validation::fail("y")]);
        assert!(!bad.all_passed());
        assert_eq!(bad.failed_count(), 1);
    }

    #[test]
    fn test_summary_counts_completed_scenarios() {
        let results = vec![
            result("a", vec![Validation::pass("x")]),
            result("b", vec![Validation::fail("y")]),
        ];
        let summary = RunSummary::new(&results, Duration::from_millis(1500), Utc::now());

        assert_eq!(summary.total_scenarios, 2);
        assert_eq!(summary.passed_scenarios, 1);
        assert!((summary.total_elapsed_seconds - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_report_state() {
        let summary = RunSummary::new(&[], Duration::ZERO, Utc::now());
        let mut report = RunReport {
            run_id: Uuid::now_v7(),
            results: vec![result("a", vec![Validation::pass("x")])],
            summary,
            failure: None,
        };
        assert_eq!(report.state(), RunState::Completed);
        assert!(report.is_success());

        report.failure = Some(FailureNotice::new("PUT /posts/1", "connection refused"));
        assert_eq!(report.state(), RunState::Failed);
        assert!(!report.is_success());
        assert_eq!(
            report.failure.as_ref().map(ToString::to_string),
            Some("PUT /posts/1: connection refused".to_string())
        );
    }
}
