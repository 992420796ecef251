//! Test runner.
//!
//! Drives the scenario plan strictly in sequence, validates each response
//! and hands the gathered results to the reporter.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use pulse_domain::{DomainError, DomainResult, FailureNotice, RunReport, RunState, RunSummary, ScenarioResult};
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{CancellationReceiver, Clock, HttpClient, Reporter};
use crate::scenario::{RunContext, ScenarioPlan};
use crate::validator::Validator;

/// Message carried by the failure notice of a cancelled run.
pub const CANCELLED_MESSAGE: &str = "run cancelled";

/// Settings that shape a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerOptions {
    base_url: String,
    fallback_id: u64,
}

impl RunnerOptions {
    /// Validates `base_url` and builds the options.
    ///
    /// A trailing slash on the base URL is dropped.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUrl` if the base URL is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str, fallback_id: u64) -> DomainResult<Self> {
        let parsed =
            Url::parse(base_url).map_err(|e| DomainError::InvalidUrl(format!("{e}: {base_url}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DomainError::InvalidUrl(format!(
                "unsupported scheme '{}': {base_url}",
                parsed.scheme()
            )));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            fallback_id,
        })
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Id substituted when the create call yields none.
    #[must_use]
    pub const fn fallback_id(&self) -> u64 {
        self.fallback_id
    }
}

/// Executes the scenario plan.
///
/// One run at a time: triggering a run while another is in progress fails
/// with `ApplicationError::AlreadyRunning`. Finished runners can be run
/// again; every run starts from a fresh context.
pub struct TestRunner<C: HttpClient> {
    client: Arc<C>,
    reporter: Arc<dyn Reporter>,
    clock: Arc<dyn Clock>,
    options: RunnerOptions,
    plan: ScenarioPlan,
    validator: Validator,
    state: Mutex<RunState>,
}

impl<C: HttpClient> TestRunner<C> {
    /// Creates a runner over the standard scenario plan.
    pub fn new(
        client: Arc<C>,
        reporter: Arc<dyn Reporter>,
        clock: Arc<dyn Clock>,
        options: RunnerOptions,
    ) -> Self {
        Self {
            client,
            reporter,
            clock,
            options,
            plan: ScenarioPlan::standard(),
            validator: Validator::new(),
            state: Mutex::new(RunState::Idle),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        *self.lock_state()
    }

    /// Runs every scenario.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::AlreadyRunning` if a run is in progress.
    /// Transport failures do not produce an error: they end the run early
    /// and are reported through `RunReport::failure`.
    pub async fn run(&self) -> ApplicationResult<RunReport> {
        self.execute(None).await
    }

    /// Runs every scenario, checking `cancel` before each one.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::AlreadyRunning` if a run is in progress.
    pub async fn run_with_cancellation(
        &self,
        cancel: &CancellationReceiver,
    ) -> ApplicationResult<RunReport> {
        self.execute(Some(cancel)).await
    }

    async fn execute(&self, cancel: Option<&CancellationReceiver>) -> ApplicationResult<RunReport> {
        let mut guard = self.begin()?;
        let run_id = Uuid::now_v7();
        let span = tracing::info_span!("run", %run_id);

        let report = self.run_plan(run_id, cancel).instrument(span).await;
        guard.finish(report.state());
        Ok(report)
    }

    async fn run_plan(&self, run_id: Uuid, cancel: Option<&CancellationReceiver>) -> RunReport {
        let started_at = self.clock.now();
        let start = Instant::now();
        let mut context = RunContext::new(self.options.base_url(), self.options.fallback_id());
        let mut results = Vec::with_capacity(self.plan.len());
        let mut failure = None;

        tracing::info!(scenarios = self.plan.len(), "run started");
        self.reporter.run_started(self.plan.len());

        for scenario in self.plan.iter() {
            if cancel.is_some_and(CancellationReceiver::is_cancelled) {
                tracing::warn!(scenario = scenario.name(), "run cancelled");
                failure = Some(FailureNotice::new(scenario.name(), CANCELLED_MESSAGE));
                break;
            }

            let request = scenario.build_request(&context);
            let response = match self.client.send(&request).await {
                Ok(response) => response,
                Err(err) => {
                    tracing::error!(
                        scenario = scenario.name(),
                        method = %request.method,
                        url = %request.url,
                        error = %err,
                        "transport error, stopping run"
                    );
                    failure = Some(FailureNotice::new(scenario.name(), err.to_string()));
                    break;
                }
            };

            let validations = self.validator.evaluate(&response, scenario.predicates());
            scenario.capture(&response, &mut context);

            let result = ScenarioResult {
                name: scenario.name().to_string(),
                method: request.method,
                url: request.url,
                response,
                validations,
            };
            tracing::info!(
                scenario = %result.name,
                method = %result.method,
                url = %result.url,
                status = %result.response.status_code(),
                elapsed_ms = result.response.elapsed_ms(),
                failed = result.failed_count(),
                "scenario finished"
            );
            results.push(result);
        }

        let summary = RunSummary::new(&results, start.elapsed(), started_at);
        tracing::info!(
            total = summary.total_scenarios,
            passed = summary.passed_scenarios,
            seconds = summary.total_elapsed_seconds,
            "run finished"
        );

        self.reporter
            .publish(&results, Some(&summary), failure.as_ref());

        RunReport {
            run_id,
            results,
            summary,
            failure,
        }
    }

    fn begin(&self) -> ApplicationResult<RunGuard<'_>> {
        let mut state = self.lock_state();
        if !state.can_start() {
            return Err(ApplicationError::AlreadyRunning);
        }
        *state = RunState::Running;
        Ok(RunGuard {
            state: &self.state,
            outcome: None,
        })
    }

    fn lock_state(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Leaves the runner in its terminal state, or `Idle` when the run future
/// was dropped before finishing.
struct RunGuard<'a> {
    state: &'a Mutex<RunState>,
    outcome: Option<RunState>,
}

impl RunGuard<'_> {
    const fn finish(&mut self, outcome: RunState) {
        self.outcome = Some(outcome);
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = self.outcome.unwrap_or(RunState::Idle);
    }
}
