//! Settings accessor over the `config` table.
//!
//! # Design
//! - Values are stored as text; typed access goes through a [`SettingCodec`].
//! - Writes are upserts, so each name maps to at most one row.
//! - A missing setting is not an error; callers pick the fallback.

use std::fmt::Display;

use micro_data::config as data_config;
use sqlx::AnyPool;
use tracing::{debug, instrument};

use crate::codec::{SettingCodec, Text};
use crate::error::{ConfigError, ConfigResult};

/// Environment variable holding the store connection string.
pub const CONFIG_URL_ENV: &str = "CONFIG_URL";

fn data_access(operation: &'static str) -> impl FnOnce(micro_data::DataError) -> ConfigError {
    move |source| ConfigError::DataAccess { operation, source }
}

/// Typed get/set over the shared settings store.
#[derive(Clone, Debug)]
pub struct ConfigService {
    pool: AnyPool,
}

impl ConfigService {
    /// Connect to the store at `url` and make sure the `config` table exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or migrations fail.
    #[instrument(name = "config_service.connect", skip(url))]
    pub async fn connect(url: &str) -> ConfigResult<Self> {
        let pool = micro_data::connect(url)
            .await
            .map_err(data_access("config_service.connect"))?;
        Ok(Self { pool })
    }

    /// Wrap an already migrated pool.
    #[must_use]
    pub const fn from_pool(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// Access the underlying `SQLx` connection pool.
    #[must_use]
    pub const fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Stored string for `name`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup query fails.
    #[instrument(name = "config_service.get", skip(self))]
    pub async fn get(&self, name: &str) -> ConfigResult<Option<String>> {
        let row = data_config::fetch_setting(&self.pool, name)
            .await
            .map_err(data_access("config_service.get"))?;
        Ok(row.map(|row| row.value))
    }

    /// Stored string for `name`, or `default` when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup query fails.
    pub async fn get_or(&self, name: &str, default: impl Into<String>) -> ConfigResult<String> {
        Ok(self.get(name).await?.unwrap_or_else(|| default.into()))
    }

    /// Stored value for `name` decoded with `codec`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup query fails or the stored string is not
    /// a valid encoding for `codec`.
    pub async fn get_with<C: SettingCodec>(
        &self,
        name: &str,
        codec: C,
    ) -> ConfigResult<Option<C::Value>> {
        let Some(raw) = self.get(name).await? else {
            return Ok(None);
        };
        match codec.decode(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(source) => Err(ConfigError::MalformedSetting {
                name: name.to_string(),
                value: raw,
                codec: C::KIND,
                source: Box::new(source),
            }),
        }
    }

    /// Stored value for `name` decoded with `codec`, or `default` when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup query fails or the stored string is not
    /// a valid encoding for `codec`. A malformed value is never replaced by
    /// `default`.
    pub async fn get_with_or<C: SettingCodec>(
        &self,
        name: &str,
        codec: C,
        default: C::Value,
    ) -> ConfigResult<C::Value> {
        Ok(self.get_with(name, codec).await?.unwrap_or(default))
    }

    /// Store the display form of `value` under `name`, replacing any prior value.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    pub async fn set(&self, name: &str, value: impl Display) -> ConfigResult<()> {
        let value = value.to_string();
        self.set_with(name, Text, &value).await
    }

    /// Store `value` encoded with `codec` under `name`, replacing any prior value.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    #[instrument(name = "config_service.set", skip(self, codec, value))]
    pub async fn set_with<C: SettingCodec>(
        &self,
        name: &str,
        codec: C,
        value: &C::Value,
    ) -> ConfigResult<()> {
        let encoded = codec.encode(value);
        data_config::upsert_setting(&self.pool, name, &encoded)
            .await
            .map_err(data_access("config_service.set"))?;
        debug!(codec = C::KIND, "setting stored");
        Ok(())
    }
}
