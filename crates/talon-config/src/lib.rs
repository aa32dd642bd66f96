//! Layered configuration for the Talon bot framework.
//!
//! A [`TalonConfig`] is built once per process from schema defaults, an
//! optional configuration file, an environment snapshot and programmatic
//! overrides, then validated as a whole. Every violation is reported at once.
//!
//! ```rust,ignore
//! use talon_config::{BuildOptions, NoExtra, build_config};
//!
//! let config = build_config::<NoExtra, _>(
//!     serde_json::json!({ "paths": { "commands": "bot/commands" } }),
//!     BuildOptions::new(),
//! )?;
//! ```

pub mod de;
pub mod env;
pub mod error;
pub mod loader;
pub mod schema;
mod tree;
pub mod validation;

pub use env::{APP_ENV, ENV_MAPPING, EnvSnapshot};
pub use error::{ConfigError, ConfigResult, ValidationReport, Violation};
pub use loader::{BuildOptions, CONFIG_FILE_NAMES, ConfigLoader, build_config};
pub use schema::{
    ClientOptions, ConfigSchema, DatabaseConfig, DiscordConfig, LOG_DIR, LogFormat, LogLevel,
    LogRotation, LogTarget, LogTargetKind, LoggerConfig, NoExtra, PathsConfig, TalonConfig,
};
pub use tree::prune_unset;
pub use validation::{Violations, is_snowflake, validate_config};
