//! The `config` table: migration and the two statements the accessor needs.

use sqlx::{Any, AnyPool, Executor, FromRow};

use crate::error::{DataError, Result};

const SELECT_SETTING: &str = "SELECT name, value FROM config WHERE name = $1";

// ON CONFLICT keeps one row per name; both SQLite and PostgreSQL accept it.
const UPSERT_SETTING: &str = r"
    INSERT INTO config (name, value)
    VALUES ($1, $2)
    ON CONFLICT (name) DO UPDATE SET value = excluded.value
";

fn map_query_err(operation: &'static str) -> impl FnOnce(sqlx::Error) -> DataError {
    move |source| DataError::QueryFailed { operation, source }
}

/// Apply the settings schema migrations.
///
/// # Errors
///
/// Returns an error when migration execution fails.
pub async fn run_migrations(pool: &AnyPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|source| DataError::MigrationFailed { source })?;
    Ok(())
}

/// Raw projection of a `config` row.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SettingRow {
    /// Unique setting name.
    pub name: String,
    /// Stored string representation.
    pub value: String,
}

/// Look up a single setting by name.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn fetch_setting<'e, E>(executor: E, name: &str) -> Result<Option<SettingRow>>
where
    E: Executor<'e, Database = Any>,
{
    sqlx::query_as::<_, SettingRow>(SELECT_SETTING)
        .bind(name)
        .fetch_optional(executor)
        .await
        .map_err(map_query_err("config.fetch"))
}

/// Insert the setting or overwrite its value in place.
///
/// # Errors
///
/// Returns an error if the statement fails.
pub async fn upsert_setting<'e, E>(executor: E, name: &str, value: &str) -> Result<()>
where
    E: Executor<'e, Database = Any>,
{
    sqlx::query(UPSERT_SETTING)
        .bind(name)
        .bind(value)
        .execute(executor)
        .await
        .map_err(map_query_err("config.upsert"))?;
    Ok(())
}
