//! Environment loading and service wiring.
//!
//! # Design
//! - Settings are read through a lookup function so tests never touch the
//!   process environment.
//! - Logging comes up first, so failures in later steps are reported (and
//!   alerted when credentials are present).
//! - The resulting [`AppContext`] is passed explicitly; nothing is stored in
//!   globals apart from the tracing subscriber.

use std::io;

use micro_config::{CONFIG_URL_ENV, ConfigService, DEFAULT_CONFIG_URL};
use micro_telemetry::{
    AlertLayer, AlertSettings, LoggingConfig, init_logging, init_logging_with_alerts,
};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::lifecycle::install_signal_handlers;

/// Everything needed to bring a service up, collected from the environment.
#[derive(Debug, Clone)]
pub struct BootstrapDependencies {
    logging: LoggingConfig,
    alerts: Option<AlertSettings>,
    config_url: String,
}

impl BootstrapDependencies {
    /// Collect settings through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let config_url = lookup(CONFIG_URL_ENV)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CONFIG_URL.to_string());
        Self {
            logging: LoggingConfig::from_lookup(&lookup),
            alerts: AlertSettings::from_lookup(&lookup),
            config_url,
        }
    }

    /// Load `.env` from the working directory if present, then read the
    /// process environment.
    #[must_use]
    pub fn from_env() -> Self {
        // A missing .env file is normal outside development.
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Logging configuration derived from `LOG_LEVEL`.
    #[must_use]
    pub const fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    /// Alert credentials, present only when all three were provided.
    #[must_use]
    pub const fn alerts(&self) -> Option<&AlertSettings> {
        self.alerts.as_ref()
    }

    /// Store connection string.
    #[must_use]
    pub fn config_url(&self) -> &str {
        &self.config_url
    }
}

/// Handles produced by a successful bootstrap.
#[derive(Debug)]
pub struct AppContext {
    config: ConfigService,
    signals: JoinHandle<io::Result<()>>,
}

impl AppContext {
    /// Settings accessor bound to the configured store.
    #[must_use]
    pub const fn config(&self) -> &ConfigService {
        &self.config
    }

    /// Park until a termination signal ends the process.
    ///
    /// # Errors
    ///
    /// Returns an error if the signal listener stops without a signal.
    pub async fn wait_for_shutdown(self) -> AppResult<()> {
        info!("waiting for termination signal");
        match self.signals.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(AppError::signals("signals.listen", source)),
            Err(join) => Err(AppError::signals("signals.join", io::Error::other(join))),
        }
    }
}

/// Bootstrap from the process environment.
///
/// # Errors
///
/// Returns an error if logging, signal handling, or the store cannot be set up.
pub async fn bootstrap() -> AppResult<AppContext> {
    bootstrap_with(BootstrapDependencies::from_env()).await
}

/// Bootstrap sequence that relies entirely on injected dependencies.
///
/// # Errors
///
/// Returns an error if logging, signal handling, or the store cannot be set up.
pub async fn bootstrap_with(dependencies: BootstrapDependencies) -> AppResult<AppContext> {
    let BootstrapDependencies {
        logging,
        alerts,
        config_url,
    } = dependencies;

    let installed = if let Some(settings) = &alerts {
        let layer =
            AlertLayer::slack(settings).map_err(|err| AppError::telemetry("telemetry.alerts", err))?;
        init_logging_with_alerts(&logging, layer)
    } else {
        init_logging(&logging)
    };
    installed.map_err(|err| AppError::telemetry("telemetry.init", err))?;
    debug!(
        level = logging.level.as_filter(),
        alerts = alerts.is_some(),
        "logging initialised"
    );

    let signals =
        install_signal_handlers().map_err(|err| AppError::signals("signals.install", err))?;

    let config = ConfigService::connect(&config_url)
        .await
        .map_err(|err| AppError::config("config_service.connect", err))?;

    Ok(AppContext { config, signals })
}

#[cfg(test)]
mod tests {
    use super::*;
    use micro_telemetry::{LogFormat, LogLevel};
    use micro_test_support::fixtures::env_lookup;

    #[test]
    fn defaults_apply_without_environment() {
        let deps = BootstrapDependencies::from_lookup(env_lookup(&[]));
        assert_eq!(deps.config_url(), DEFAULT_CONFIG_URL);
        assert_eq!(deps.logging(), &LoggingConfig::default());
        assert!(deps.alerts().is_none());
    }

    #[test]
    fn partial_slack_credentials_disable_alerts() {
        let deps = BootstrapDependencies::from_lookup(env_lookup(&[
            ("SLACK_BOT_TOKEN", "xoxb-1"),
            ("SLACK_CHANNEL", "#ops"),
            ("CONFIG_URL", "sqlite://settings.db?mode=rwc"),
        ]));
        assert!(deps.alerts().is_none());
        assert_eq!(deps.config_url(), "sqlite://settings.db?mode=rwc");
    }

    #[test]
    fn full_environment_is_collected() {
        let deps = BootstrapDependencies::from_lookup(env_lookup(&[
            ("LOG_LEVEL", "DEBUG"),
            ("SLACK_BOT_TOKEN", "xoxb-1"),
            ("SLACK_CHANNEL", "#ops"),
            ("SLACK_USERNAME", "billing"),
            ("CONFIG_URL", "postgres://micro@db/settings"),
        ]));
        assert_eq!(deps.logging().level, LogLevel::Debug);
        assert_eq!(deps.logging().format, LogFormat::Detailed);
        let alerts = deps.alerts().expect("complete credentials");
        assert_eq!(alerts.channel, "#ops");
        assert_eq!(alerts.username, "billing");
        assert_eq!(deps.config_url(), "postgres://micro@db/settings");
    }

    #[test]
    fn blank_config_url_falls_back_to_default() {
        let deps = BootstrapDependencies::from_lookup(env_lookup(&[("CONFIG_URL", "  ")]));
        assert_eq!(deps.config_url(), DEFAULT_CONFIG_URL);
    }
}
