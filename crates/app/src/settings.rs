//! Layered configuration.
//!
//! Sources, lowest precedence first: built-in defaults, a TOML file,
//! `PULSE_*` environment variables, command-line flags.

use std::time::Duration;

use clap::ValueEnum;
use config::{Config, ConfigError, Environment, File};
use pulse_infrastructure::HttpClientConfig;
use serde::Deserialize;

use crate::cli::Cli;

/// API targeted when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Config file looked up in the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "pulse";

/// How the report is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Human-readable text
    #[default]
    Text,
    /// One JSON document
    Json,
}

impl ReportFormat {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

/// Resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Base URL of the API under test.
    pub base_url: String,
    /// Per-request timeout; absent means no timeout.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Post id used when the create call returns none.
    pub fallback_id: u64,
    /// User-Agent header.
    pub user_agent: String,
    /// Report format.
    pub format: ReportFormat,
}

impl Settings {
    /// Loads settings for `cli`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is missing (when given explicitly)
    /// or malformed, or if a value has the wrong type.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("fallback_id", 1)?
            .set_default("user_agent", concat!("pulse/", env!("CARGO_PKG_VERSION")))?
            .set_default("format", ReportFormat::Text.as_str())?;

        builder = match &cli.config {
            Some(path) => builder.add_source(File::from(path.as_path()).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        builder
            .add_source(Environment::with_prefix("PULSE").try_parsing(true))
            .set_override_option("base_url", cli.base_url.clone())?
            .set_override_option("timeout_ms", cli.timeout_ms)?
            .set_override_option("fallback_id", cli.fallback_id)?
            .set_override_option("format", cli.format.map(ReportFormat::as_str))?
            .build()?
            .try_deserialize()
    }

    /// Settings for the HTTP adapter.
    #[must_use]
    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            user_agent: self.user_agent.clone(),
            timeout: self.timeout_ms.map(Duration::from_millis),
            no_proxy: false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pulse").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::load(&cli(&[])).unwrap();

        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.timeout_ms, None);
        assert_eq!(settings.fallback_id, 1);
        assert_eq!(settings.format, ReportFormat::Text);
        assert_eq!(settings.http_client_config().timeout, None);
    }

    #[test]
    fn test_flags_override_defaults() {
        let settings = Settings::load(&cli(&[
            "--base-url",
            "http://localhost:3000",
            "--timeout-ms",
            "1500",
            "--format",
            "json",
        ]))
        .unwrap();

        assert_eq!(settings.base_url, "http://localhost:3000");
        assert_eq!(settings.timeout_ms, Some(1500));
        assert_eq!(settings.format, ReportFormat::Json);
        assert_eq!(
            settings.http_client_config().timeout,
            Some(Duration::from_millis(1500))
        );
    }

    #[test]
    fn test_config_file_is_layered_under_flags() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "base_url = \"http://file.example\"\nfallback_id = 42\ntimeout_ms = 900"
        )
        .unwrap();
        let path = file.path().to_string_lossy().into_owned();

        let settings = Settings::load(&cli(&["--config", &path, "--fallback-id", "5"])).unwrap();

        assert_eq!(settings.base_url, "http://file.example");
        assert_eq!(settings.timeout_ms, Some(900));
        assert_eq!(settings.fallback_id, 5);
    }

    #[test]
    fn test_missing_explicit_config_file_is_an_error() {
        let result = Settings::load(&cli(&["--config", "/nonexistent/pulse.toml"]));
        assert!(result.is_err());
    }
}
