//! Test fixtures and environment helpers.

use std::collections::HashMap;

use anyhow::{Context, Result};
use tempfile::TempDir;

/// File-backed `SQLite` store that lives for the duration of a test.
pub struct TempSqlite {
    _dir: TempDir,
    url: String,
}

impl TempSqlite {
    /// Create an empty database file location inside a fresh temp directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the temp directory cannot be created or its path
    /// is not valid UTF-8.
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("failed to create temp dir")?;
        let path = dir.path().join("settings.db");
        let path = path
            .to_str()
            .context("temp path contains non-utf8 characters")?;
        let url = format!("sqlite://{path}?mode=rwc");
        Ok(Self { _dir: dir, url })
    }

    /// Connection string for `CONFIG_URL`.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Build an environment lookup over fixed pairs, so tests never mutate the
/// process environment.
#[must_use]
pub fn env_lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
    let values: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect();
    move |key| values.get(key).cloned()
}

/// Setting name unique to this process and call site, for shared databases.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}.{}.{seq}", std::process::id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_sqlite_url_points_into_temp_dir() -> Result<()> {
        let store = TempSqlite::new()?;
        assert!(store.url().starts_with("sqlite://"));
        assert!(store.url().ends_with("settings.db?mode=rwc"));
        Ok(())
    }

    #[test]
    fn env_lookup_returns_only_known_keys() {
        let lookup = env_lookup(&[("LOG_LEVEL", "DEBUG")]);
        assert_eq!(lookup("LOG_LEVEL").as_deref(), Some("DEBUG"));
        assert_eq!(lookup("CONFIG_URL"), None);
    }

    #[test]
    fn unique_names_do_not_repeat() {
        assert_ne!(unique_name("a"), unique_name("a"));
    }
}
