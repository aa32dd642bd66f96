//! Configuration schema definitions.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::de;
use crate::validation::Violations;

/// Directory, relative to the working directory, that receives log files.
pub const LOG_DIR: &str = "logs";

/// Top-level keys owned by [`TalonConfig`]; everything else belongs to the
/// application schema.
pub(crate) const RESERVED_KEYS: &[&str] =
    &["is_development", "discord", "database", "paths", "logger"];

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TalonConfig {
    /// Whether the bot runs in a development deployment.
    #[serde(default, deserialize_with = "de::flag")]
    pub is_development: bool,

    /// Gateway credentials and client options.
    #[serde(default)]
    pub discord: DiscordConfig,

    /// Database connection settings handed to the ORM.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Discovery directories.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Logging setup.
    #[serde(default)]
    pub logger: LoggerConfig,

    /// Top-level fields declared by the application schema.
    #[serde(skip)]
    pub extra: Map<String, Value>,
}

impl TalonConfig {
    /// Schema defaults for the given deployment environment.
    pub fn defaults(is_development: bool) -> Self {
        Self {
            is_development,
            logger: LoggerConfig::for_environment(is_development),
            ..Default::default()
        }
    }

    /// Deserializes the application's own fields into `T`.
    pub fn extra_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.extra.clone()))
    }

    /// Resolves every relative path against `base`.
    pub(crate) fn resolve_paths(&mut self, base: &Path) {
        self.paths.resolve(base);
        for target in &mut self.logger.targets {
            if let Some(path) = target.path.take() {
                target.path = Some(absolutize(base, path));
            }
        }
    }
}

/// Application-specific configuration merged alongside [`TalonConfig`].
///
/// Fields of the implementing type live at the top level of the
/// configuration tree, next to `discord` and `database`.
pub trait ConfigSchema: Serialize + DeserializeOwned + Default {
    /// Environment variables mapped onto dotted paths of this schema.
    fn env_mapping() -> &'static [(&'static str, &'static str)] {
        &[]
    }

    /// Semantic rules beyond what deserialization enforces.
    fn validate(&self, _violations: &mut Violations) {}
}

/// Schema for applications without configuration of their own.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NoExtra {}

impl ConfigSchema for NoExtra {}

/// Gateway credentials.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DiscordConfig {
    /// Bot token.
    #[serde(default, deserialize_with = "de::trimmed")]
    pub token: String,

    /// Application id, required to register commands.
    #[serde(default, deserialize_with = "de::optional_trimmed")]
    pub client_id: Option<String>,

    /// Guild used for guild-scoped command registration.
    #[serde(default, deserialize_with = "de::optional_trimmed")]
    pub guild_id: Option<String>,

    #[serde(default)]
    pub client_options: ClientOptions,
}

/// Options passed through to the gateway client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientOptions {
    /// Gateway intents bitfield.
    #[serde(default = "default_intents", deserialize_with = "de::number")]
    pub intents: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            intents: default_intents(),
        }
    }
}

/// `GUILDS | GUILD_MESSAGES`.
fn default_intents() -> u64 {
    (1 << 0) | (1 << 9)
}

/// Database connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_host", deserialize_with = "de::trimmed")]
    pub host: String,

    #[serde(default = "default_db_port", deserialize_with = "de::number")]
    pub port: u16,

    /// Database name.
    #[serde(default, deserialize_with = "de::trimmed")]
    pub database: String,

    #[serde(default, deserialize_with = "de::trimmed")]
    pub username: String,

    #[serde(default, deserialize_with = "de::trimmed")]
    pub password: String,

    /// Let the ORM alter the schema on startup. Development only.
    #[serde(default, deserialize_with = "de::flag")]
    pub synchronize: bool,

    /// Log every statement.
    #[serde(default, deserialize_with = "de::flag")]
    pub logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_db_host(),
            port: default_db_port(),
            database: String::new(),
            username: String::new(),
            password: String::new(),
            synchronize: false,
            logging: false,
        }
    }
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

/// Directories scanned by discovery.
///
/// Relative paths are resolved against the working directory once the
/// configuration is validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_entities_path")]
    pub entities: PathBuf,
    #[serde(default = "default_commands_path")]
    pub commands: PathBuf,
    #[serde(default = "default_jobs_path")]
    pub jobs: PathBuf,
    #[serde(default = "default_events_path")]
    pub events: PathBuf,
    #[serde(default = "default_services_path")]
    pub services: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            entities: default_entities_path(),
            commands: default_commands_path(),
            jobs: default_jobs_path(),
            events: default_events_path(),
            services: default_services_path(),
        }
    }
}

impl PathsConfig {
    /// Field names paired with their values, in declaration order.
    pub fn entries(&self) -> [(&'static str, &Path); 5] {
        [
            ("entities", self.entities.as_path()),
            ("commands", self.commands.as_path()),
            ("jobs", self.jobs.as_path()),
            ("events", self.events.as_path()),
            ("services", self.services.as_path()),
        ]
    }

    fn resolve(&mut self, base: &Path) {
        for path in [
            &mut self.entities,
            &mut self.commands,
            &mut self.jobs,
            &mut self.events,
            &mut self.services,
        ] {
            *path = absolutize(base, std::mem::take(path));
        }
    }
}

fn default_entities_path() -> PathBuf {
    PathBuf::from("src/entities")
}

fn default_commands_path() -> PathBuf {
    PathBuf::from("src/commands")
}

fn default_jobs_path() -> PathBuf {
    PathBuf::from("src/jobs")
}

fn default_events_path() -> PathBuf {
    PathBuf::from("src/events")
}

fn default_services_path() -> PathBuf {
    PathBuf::from("src/services")
}

fn absolutize(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

// =============================================================================
// Logger
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Default level for every target.
    #[serde(default)]
    pub level: LogLevel,

    /// Default output format for every target.
    #[serde(default)]
    pub format: LogFormat,

    /// Output destinations.
    #[serde(default)]
    pub targets: Vec<LogTarget>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::for_environment(false)
    }
}

impl LoggerConfig {
    /// Verbose pretty console output in development; console plus a daily
    /// rolling file in production.
    pub fn for_environment(is_development: bool) -> Self {
        if is_development {
            Self {
                level: LogLevel::Debug,
                format: LogFormat::Pretty,
                targets: vec![LogTarget::stdout()],
            }
        } else {
            Self {
                level: LogLevel::Info,
                format: LogFormat::Compact,
                targets: vec![
                    LogTarget::stdout(),
                    LogTarget::file(Path::new(LOG_DIR).join("talon.log")),
                ],
            }
        }
    }
}

/// A single log destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogTarget {
    pub kind: LogTargetKind,

    /// File path; required for [`LogTargetKind::File`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Overrides the logger level for this target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<LogLevel>,

    /// Overrides the logger format for this target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<LogFormat>,

    #[serde(default)]
    pub rotation: LogRotation,
}

impl LogTarget {
    pub fn stdout() -> Self {
        Self::new(LogTargetKind::Stdout)
    }

    pub fn stderr() -> Self {
        Self::new(LogTargetKind::Stderr)
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            rotation: LogRotation::Daily,
            ..Self::new(LogTargetKind::File)
        }
    }

    fn new(kind: LogTargetKind) -> Self {
        Self {
            kind,
            path: None,
            level: None,
            format: None,
            rotation: LogRotation::Never,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTargetKind {
    Stdout,
    Stderr,
    File,
}

/// File rotation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature of the runtime; falls back to compact.
    Json,
}

/// Log level, parsed case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!(
                "unknown log level `{other}`, expected one of: trace, debug, info, warn, error"
            )),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, String> {
        value.parse()
    }
}
