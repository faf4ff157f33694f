//! # Design
//!
//! - One error type for bootstrap, signal wiring and CLI commands.
//! - Messages are constant; the failing operation travels as a field.
//! - Sources are kept intact and are not logged where they are wrapped.

use std::io;

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration operations failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: micro_config::ConfigError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: micro_telemetry::TelemetryError,
    },
    /// Signal registration or listening failed.
    #[error("signal handling failed")]
    Signals {
        /// Operation identifier.
        operation: &'static str,
        /// Source IO error.
        source: io::Error,
    },
    /// A command-line value was rejected.
    #[error("invalid argument")]
    InvalidArgument {
        /// Argument name.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Rejected value.
        value: String,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: micro_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: micro_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn signals(operation: &'static str, source: io::Error) -> Self {
        Self::Signals { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn app_error_helpers_build_variants() {
        let config = AppError::config(
            "config_service.get",
            micro_config::ConfigError::MalformedSetting {
                name: "last_run".to_string(),
                value: "bad".to_string(),
                codec: "timestamp",
                source: Box::new(io::Error::other("parse")),
            },
        );
        assert!(matches!(
            config,
            AppError::Config {
                operation: "config_service.get",
                ..
            }
        ));
        assert!(config.source().is_some());

        let signals = AppError::signals("signals.install", io::Error::other("no driver"));
        assert_eq!(signals.to_string(), "signal handling failed");
        assert!(signals.source().is_some());

        let invalid = AppError::InvalidArgument {
            field: "value",
            reason: "malformed_timestamp",
            value: "soon".to_string(),
        };
        assert_eq!(invalid.to_string(), "invalid argument");
    }
}
