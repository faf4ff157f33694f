//! Opt-in `PostgreSQL` backend for integration tests.

/// Environment variable holding a disposable database URL.
pub const TEST_DATABASE_URL_ENV: &str = "MICRO_TEST_DATABASE_URL";

/// Connection string for an externally provided `PostgreSQL` database.
///
/// Suites skip their Postgres variants when this returns `None`. Tests that
/// use it must pick unique setting names, since the database is shared
/// between runs.
#[must_use]
pub fn external_postgres_url() -> Option<String> {
    std::env::var(TEST_DATABASE_URL_ENV)
        .ok()
        .filter(|url| !url.trim().is_empty())
}
