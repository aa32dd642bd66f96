//! Configuration loader using figment.
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Schema defaults (framework defaults plus the application schema's `Default`)
//! 2. Configuration file (`talon.toml` / `config.toml`, feature `toml-config`)
//! 3. Environment snapshot, mapped through [`ENV_MAPPING`](crate::env::ENV_MAPPING)
//!    and [`ConfigSchema::env_mapping`]
//! 4. Programmatic overrides, in the order they were merged
//!
//! Tables merge recursively; scalars and arrays from a higher layer replace
//! the lower one. A `null` in an override means "unset" and leaves the lower
//! layers untouched.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use talon_config::{ConfigLoader, NoExtra};
//!
//! let config = ConfigLoader::new()
//!     .merge(json!({ "database": { "port": 3000 } }))
//!     .load::<NoExtra>()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(feature = "toml-config")]
use figment::providers::{Format, Toml};
use figment::providers::Serialized;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::env::EnvSnapshot;
use crate::error::{ConfigError, ConfigResult};
use crate::schema::{ConfigSchema, LOG_DIR, RESERVED_KEYS, TalonConfig};
use crate::tree::prune_unset;
use crate::validation::{Violations, validate_config};

/// File names searched in each search path, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["talon.toml", "config.toml"];

/// Process-level options for a configuration build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Exit the process with status 1 when loading fails (default `true`).
    pub exit_on_failure: bool,
    /// Base for `.env`, `logs/` and relative paths; defaults to the current directory.
    pub working_dir: Option<PathBuf>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            exit_on_failure: true,
            working_dir: None,
        }
    }
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exit_on_failure(mut self, exit: bool) -> Self {
        self.exit_on_failure = exit;
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

/// Configuration loader with figment-based multi-source support.
///
/// # Example
///
/// ```rust,ignore
/// let config = ConfigLoader::new()
///     .env(EnvSnapshot::new().with_var("TOKEN", "..."))
///     .exit_on_failure(false)
///     .load::<NoExtra>()?;
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: BuildOptions,
    /// Explicit environment; captured from the process when absent.
    env: Option<EnvSnapshot>,
    overrides: Vec<Value>,
    /// First override that failed to serialize.
    override_error: Option<String>,
    /// Specific config file to load (overrides search).
    config_file: Option<PathBuf>,
    search_paths: Vec<PathBuf>,
    skip_files: bool,
}

impl ConfigLoader {
    /// Creates a new configuration loader with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all build options.
    pub fn options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Whether a failed load terminates the process.
    pub fn exit_on_failure(mut self, exit: bool) -> Self {
        self.options.exit_on_failure = exit;
        self
    }

    /// Sets the directory relative paths are resolved against.
    pub fn working_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.options.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Uses `env` instead of the process environment and `.env` file.
    pub fn env(mut self, env: EnvSnapshot) -> Self {
        self.env = Some(env);
        self
    }

    /// Merges a partial configuration on top of every other source.
    ///
    /// `None` fields serialize to `null` and therefore count as unset.
    pub fn merge<S: Serialize>(mut self, overrides: S) -> Self {
        match serde_json::to_value(overrides) {
            Ok(value) => {
                if let Some(value) = prune_unset(value) {
                    self.overrides.push(value);
                }
            }
            Err(e) => {
                self.override_error.get_or_insert_with(|| e.to_string());
            }
        }
        self
    }

    /// Sets a specific configuration file to load.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Skips configuration file discovery.
    pub fn without_files(mut self) -> Self {
        self.skip_files = true;
        self
    }

    /// Loads, validates and resolves the configuration.
    ///
    /// On failure every problem is logged; the process then exits with
    /// status 1 unless `exit_on_failure` was turned off.
    pub fn load<T: ConfigSchema>(self) -> ConfigResult<TalonConfig> {
        let exit_on_failure = self.options.exit_on_failure;

        match self.try_load::<T>() {
            Ok(config) => Ok(config),
            Err(err) => {
                report_failure(&err);
                if exit_on_failure {
                    eprintln!("{err}");
                    std::process::exit(1);
                }
                Err(err)
            }
        }
    }

    fn try_load<T: ConfigSchema>(self) -> ConfigResult<TalonConfig> {
        if let Some(message) = self.override_error {
            return Err(ConfigError::Overrides(message));
        }

        let working_dir = match &self.options.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().map_err(ConfigError::WorkingDir)?,
        };

        let env = match &self.env {
            Some(env) => env.clone(),
            None => EnvSnapshot::from_process_with_dotenv(&working_dir.join(".env"))?,
        };
        let is_development = env.is_development();

        let log_dir = working_dir.join(LOG_DIR);
        std::fs::create_dir_all(&log_dir).map_err(|source| ConfigError::LogDirectory {
            path: log_dir.clone(),
            source,
        })?;

        let figment = self.build_figment::<T>(&env, is_development, &working_dir)?;
        let mut config = extract_and_validate::<T>(&figment)?;

        config.resolve_paths(&working_dir);

        debug!(
            is_development = config.is_development,
            log_level = %config.logger.level,
            working_dir = %working_dir.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Builds the figment instance with all sources.
    fn build_figment<T: ConfigSchema>(
        &self,
        env: &EnvSnapshot,
        is_development: bool,
        working_dir: &Path,
    ) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(T::default()))
            .merge(Serialized::defaults(TalonConfig::defaults(is_development)));

        if let Some(path) = &self.config_file {
            let path = if path.is_absolute() {
                path.clone()
            } else {
                working_dir.join(path)
            };
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path));
            }
            info!(path = %path.display(), "Loading configuration file");
            figment = merge_config_file(figment, &path)?;
        } else if !self.skip_files {
            figment = self.load_config_files(figment, working_dir);
        }

        figment = figment.merge(Serialized::defaults(env.to_tree(T::env_mapping())));

        for overrides in &self.overrides {
            figment = figment.merge(Serialized::defaults(overrides));
        }

        Ok(figment)
    }

    /// Resolves the effective list of search paths.
    fn resolve_search_paths(&self, working_dir: &Path) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }

        let mut paths = vec![working_dir.to_path_buf()];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("talon"));
        }
        paths
    }

    /// Merges the first configuration file found in the search paths.
    fn load_config_files(&self, figment: Figment, working_dir: &Path) -> Figment {
        for search_path in self.resolve_search_paths(working_dir) {
            for name in CONFIG_FILE_NAMES {
                let path = search_path.join(name);
                if path.is_file() {
                    info!(path = %path.display(), "Loading configuration file");
                    match merge_config_file(figment.clone(), &path) {
                        Ok(merged) => return merged,
                        Err(e) => warn!(path = %path.display(), error = %e, "Skipping configuration file"),
                    }
                }
            }
        }

        debug!("No configuration file found");
        figment
    }
}

/// Merges a single config file into the figment, dispatching on file extension.
fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        #[cfg(feature = "toml-config")]
        "toml" => Ok(figment.merge(Toml::file(path))),
        _ => {
            let _ = figment;
            Err(ConfigError::UnsupportedFormat(ext.to_string()))
        }
    }
}

/// Extracts the typed configuration and runs every rule, collecting all
/// violations before failing.
fn extract_and_validate<T: ConfigSchema>(figment: &Figment) -> ConfigResult<TalonConfig> {
    let mut violations = Violations::new();

    let config = match figment.extract::<TalonConfig>() {
        Ok(config) => {
            validate_config(&config, &mut violations);
            Some(config)
        }
        Err(e) => {
            violations.extend_from_figment(e);
            None
        }
    };

    match figment.extract::<T>() {
        Ok(schema) => schema.validate(&mut violations),
        Err(e) => violations.extend_from_figment(e),
    }

    let extra = match figment.extract::<Map<String, Value>>() {
        Ok(mut tree) => {
            for key in RESERVED_KEYS {
                tree.remove(*key);
            }
            tree
        }
        Err(e) => {
            violations.extend_from_figment(e);
            Map::new()
        }
    };

    match config {
        Some(mut config) if violations.is_empty() => {
            config.extra = extra;
            Ok(config)
        }
        _ => Err(ConfigError::Validation(violations.into_report())),
    }
}

fn report_failure(err: &ConfigError) {
    match err {
        ConfigError::Validation(report) => {
            for violation in report.violations() {
                error!(field = %violation.path, "Invalid configuration: {}", violation.message);
            }
        }
        other => error!(error = %other, "Failed to load configuration"),
    }
}

/// Builds the configuration from `overrides` on top of every other source.
///
/// Shorthand for `ConfigLoader::new().options(options).merge(overrides).load::<T>()`.
pub fn build_config<T, S>(overrides: S, options: BuildOptions) -> ConfigResult<TalonConfig>
where
    T: ConfigSchema,
    S: Serialize,
{
    ConfigLoader::new().options(options).merge(overrides).load::<T>()
}

// =============================================================================
// Tests
// =============================================================================
