//! Environment snapshots and the variable name table.
//!
//! The loader never reads the process environment on its own accord: it
//! works on an [`EnvSnapshot`], which by default is captured from the process
//! (overlaid on the working directory's `.env` file) but can be built by hand
//! for tests or embedding.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::{ConfigError, ConfigResult};
use crate::tree::insert_path;

/// Variable that selects the deployment environment.
pub const APP_ENV: &str = "APP_ENV";

/// Fixed mapping from environment variable names to configuration paths.
pub const ENV_MAPPING: &[(&str, &str)] = &[
    ("TOKEN", "discord.token"),
    ("CLIENT_ID", "discord.client_id"),
    ("GUILD_ID", "discord.guild_id"),
    ("DISCORD_INTENTS", "discord.client_options.intents"),
    ("DB_HOST", "database.host"),
    ("DB_PORT", "database.port"),
    ("DB_NAME", "database.database"),
    ("DB_USERNAME", "database.username"),
    ("DB_PASSWORD", "database.password"),
    ("DB_SYNCHRONIZE", "database.synchronize"),
    ("DB_LOGGING", "database.logging"),
    ("LOG_LEVEL", "logger.level"),
];

/// An immutable view of environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the current process environment.
    ///
    /// Variables whose name or value is not valid unicode are skipped.
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect()
    }

    /// Captures the process environment on top of a `.env` file.
    ///
    /// Real variables always win over the file. A missing file is not an error.
    pub fn from_process_with_dotenv(path: &Path) -> ConfigResult<Self> {
        let mut snapshot = Self::new();

        match dotenvy::from_path_iter(path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|source| ConfigError::DotEnv {
                        path: path.to_path_buf(),
                        source,
                    })?;
                    snapshot.vars.insert(key, value);
                }
                debug!(path = %path.display(), "Loaded environment file");
            }
            Err(err) if err.not_found() => {
                trace!(path = %path.display(), "No environment file found");
            }
            Err(source) => {
                return Err(ConfigError::DotEnv {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }

        snapshot.vars.extend(Self::from_process().vars);
        Ok(snapshot)
    }

    /// Returns a copy of this snapshot with `key` set to `value`.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Returns the value of `key`; blank values count as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// Whether `APP_ENV` selects a development deployment.
    ///
    /// `development` and `dev` (any case) select development; every other
    /// value, and an unset variable, select production.
    pub fn is_development(&self) -> bool {
        self.get(APP_ENV).is_some_and(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "development" | "dev"
            )
        })
    }

    /// Builds the environment configuration layer.
    ///
    /// Values stay strings; typed fields coerce them during extraction.
    pub(crate) fn to_tree(&self, extra: &[(&str, &str)]) -> Value {
        let mut root = Map::new();

        if self.get(APP_ENV).is_some() {
            root.insert("is_development".to_owned(), Value::Bool(self.is_development()));
        }

        for (name, path) in ENV_MAPPING.iter().chain(extra) {
            if let Some(value) = self.get(name) {
                trace!(variable = name, path, "Mapping environment variable");
                insert_path(&mut root, path, Value::String(value.to_owned()));
            }
        }

        Value::Object(root)
    }
}

impl<K, V> FromIterator<(K, V)> for EnvSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_app_env_values() {
        let dev = |value: &str| EnvSnapshot::new().with_var(APP_ENV, value).is_development();

        assert!(dev("development"));
        assert!(dev("DEV"));
        assert!(!dev("production"));
        assert!(!dev("prod"));
        assert!(!dev("staging"));
        assert!(!EnvSnapshot::new().is_development());
    }

    #[test]
    fn test_tree_maps_known_variables() {
        let env = EnvSnapshot::from_iter([
            ("TOKEN", "abc"),
            ("DB_PORT", "3306"),
            ("APP_ENV", "development"),
            ("UNRELATED", "ignored"),
            ("DB_HOST", "   "),
        ]);

        assert_eq!(
            env.to_tree(&[("MAX_PLAYERS", "game.max_players")]),
            json!({
                "is_development": true,
                "discord": { "token": "abc" },
                "database": { "port": "3306" },
            })
        );
    }

    #[test]
    fn test_tree_includes_schema_variables() {
        let env = EnvSnapshot::new().with_var("MAX_PLAYERS", "8");

        assert_eq!(
            env.to_tree(&[("MAX_PLAYERS", "game.max_players")]),
            json!({ "game": { "max_players": "8" } })
        );
    }

    #[test]
    fn test_dotenv_is_overlaid_by_snapshot_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "TALON_TEST_DOTENV_ONLY=from-file\n").unwrap();

        let snapshot = EnvSnapshot::from_process_with_dotenv(&path).unwrap();
        assert_eq!(snapshot.get("TALON_TEST_DOTENV_ONLY"), Some("from-file"));

        let missing = EnvSnapshot::from_process_with_dotenv(&dir.path().join("absent.env"));
        assert!(missing.is_ok());
    }
}
