//! Error types for configuration operations.

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A stored value could not be decoded as the requested type.
    #[error("malformed setting value")]
    MalformedSetting {
        /// Setting name.
        name: String,
        /// Raw stored value.
        value: String,
        /// Codec that rejected the value.
        codec: &'static str,
        /// Decoder error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The settings store failed.
    #[error("data access failed")]
    DataAccess {
        /// Operation identifier.
        operation: &'static str,
        /// Source data-layer error.
        source: micro_data::DataError,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
