//! Pulse - REST smoke-test runner.
//!
//! Runs the fixed scenario plan once against the configured API, prints
//! the report and exits with 0 when every scenario passed, 1 when a check
//! failed or the run stopped early, 2 when the configuration is unusable.

mod cli;
mod settings;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use pulse_application::ports::{CancellationToken, Reporter};
use pulse_application::{RunnerOptions, TestRunner};
use pulse_domain::RunReport;
use pulse_infrastructure::{ConsoleReporter, JsonReporter, ReqwestHttpClient, SystemClock};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::settings::{ReportFormat, Settings};

/// Exit status of an interrupted process.
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so the report on stdout stays machine-readable.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(&cli).await {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("pulse: {e:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<RunReport> {
    let settings = Settings::load(cli).context("failed to load configuration")?;
    tracing::debug!(?settings, "configuration loaded");

    let options = RunnerOptions::new(&settings.base_url, settings.fallback_id)
        .context("invalid base URL")?;
    let client = ReqwestHttpClient::new(&settings.http_client_config())
        .context("failed to create HTTP client")?;
    let reporter: Arc<dyn Reporter> = match settings.format {
        ReportFormat::Text => Arc::new(ConsoleReporter::stdout()),
        ReportFormat::Json => Arc::new(JsonReporter::stdout()),
    };

    let runner = TestRunner::new(
        Arc::new(client),
        reporter,
        Arc::new(SystemClock::new()),
        options,
    );

    let (token, cancel) = CancellationToken::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping after the current request");
            token.cancel();
        }
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(EXIT_INTERRUPTED);
        }
    });

    tracing::info!(base_url = %settings.base_url, "starting pulse v{}", env!("CARGO_PKG_VERSION"));
    Ok(runner.run_with_cancellation(&cancel).await?)
}
