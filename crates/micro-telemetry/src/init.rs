//! Telemetry initialisation primitives and logging configuration.
//!
//! # Design
//! - Centralises logging setup with a single entry point per process.
//! - `LOG_LEVEL` picks both verbosity and line layout; `RUST_LOG` still wins
//!   for filtering when set.
//! - Log lines go to stderr; stdout is left to command output.
//! - The alert layer is stacked last so local output is written before a
//!   remote delivery is attempted.

use std::io::{self, IsTerminal};

use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::alert::AlertLayer;
use crate::error::{Result, TelemetryError};
use crate::notifier::Notifier;
use crate::slack::SlackNotifier;

/// Environment variable selecting verbosity and line layout.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Local timestamp with millisecond precision.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Verbosity selected through `LOG_LEVEL`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Informational output and above.
    #[default]
    Info,
    /// Everything down to debug output.
    Debug,
}

impl LogLevel {
    /// Interpret a raw `LOG_LEVEL` value. Anything but `debug` (any case) is `Info`.
    #[must_use]
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(raw) if raw.trim().eq_ignore_ascii_case("debug") => Self::Debug,
            _ => Self::Info,
        }
    }

    /// Directive used when `RUST_LOG` is not provided.
    #[must_use]
    pub const fn as_filter(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }
}

/// Available line layouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// `timestamp LEVEL message`.
    #[default]
    Standard,
    /// Standard layout plus the source file and line of each event.
    Detailed,
}

/// Logging configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Verbosity used when `RUST_LOG` is absent.
    pub level: LogLevel,
    /// Line layout for the fmt layer.
    pub format: LogFormat,
}

impl LoggingConfig {
    /// Debug verbosity always comes with the detailed layout.
    #[must_use]
    pub const fn from_level(level: LogLevel) -> Self {
        let format = match level {
            LogLevel::Info => LogFormat::Standard,
            LogLevel::Debug => LogFormat::Detailed,
        };
        Self { level, format }
    }

    /// Read `LOG_LEVEL` through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self::from_level(LogLevel::from_env_value(lookup(LOG_LEVEL_ENV).as_deref()))
    }
}

/// Install the global subscriber without remote alerting.
///
/// # Errors
///
/// Returns an error if the tracing subscriber cannot be installed (for example,
/// because another subscriber has already been set globally).
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    install(config, None::<AlertLayer<SlackNotifier>>)
}

/// Install the global subscriber with `alerts` stacked on top.
///
/// # Errors
///
/// Returns an error if the tracing subscriber cannot be installed.
pub fn init_logging_with_alerts<N: Notifier>(
    config: &LoggingConfig,
    alerts: AlertLayer<N>,
) -> Result<()> {
    install(config, Some(alerts))
}

fn install<N: Notifier>(config: &LoggingConfig, alerts: Option<AlertLayer<N>>) -> Result<()> {
    let detailed = config.format == LogFormat::Detailed;
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(detailed)
        .with_line_number(detailed)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()));

    tracing_subscriber::registry()
        .with(build_env_filter(config.level.as_filter()))
        .with(fmt_layer)
        .with(alerts)
        .try_init()
        .map_err(|source| TelemetryError::SubscriberInstall { source })
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}
