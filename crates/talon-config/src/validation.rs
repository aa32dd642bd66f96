//! Configuration validation utilities.
//!
//! Rules never stop at the first problem: every violation is collected so a
//! misconfigured deployment can be fixed in one pass.

use figment::error::Kind;

use crate::error::{ValidationReport, Violation};
use crate::schema::{LogTargetKind, TalonConfig};

/// Collector handed to every validation rule.
#[derive(Debug, Default)]
pub struct Violations {
    items: Vec<Violation>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation at `path`.
    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.items.push(Violation {
            path: path.into(),
            message: message.into(),
        });
    }

    /// Records a violation unless `value` holds something besides whitespace.
    pub fn require_non_empty(&mut self, path: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(path, "must not be empty");
        }
    }

    /// Records one violation per error reported during extraction.
    pub(crate) fn extend_from_figment(&mut self, error: figment::Error) {
        for error in error {
            let mut path = error.path.clone();
            if let Kind::MissingField(field) = &error.kind
                && path.last().map(String::as_str) != Some(&**field)
            {
                path.push(field.to_string());
            }

            let path = if path.is_empty() {
                "<root>".to_string()
            } else {
                path.join(".")
            };
            self.push(path, error.kind.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn into_report(self) -> ValidationReport {
        ValidationReport::new(self.items)
    }
}

/// Whether `value` looks like a Discord snowflake (17 to 20 decimal digits).
pub fn is_snowflake(value: &str) -> bool {
    (17..=20).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_digit())
}

/// Validates the framework-owned part of the configuration.
pub fn validate_config(config: &TalonConfig, violations: &mut Violations) {
    validate_discord(config, violations);
    validate_database(config, violations);
    validate_paths(config, violations);
    validate_logger(config, violations);
}

fn validate_discord(config: &TalonConfig, violations: &mut Violations) {
    let discord = &config.discord;
    violations.require_non_empty("discord.token", &discord.token);

    for (path, value) in [
        ("discord.client_id", &discord.client_id),
        ("discord.guild_id", &discord.guild_id),
    ] {
        if let Some(id) = value
            && !is_snowflake(id)
        {
            violations.push(path, format!("`{id}` is not a valid snowflake (17-20 digits)"));
        }
    }
}

fn validate_database(config: &TalonConfig, violations: &mut Violations) {
    let database = &config.database;
    violations.require_non_empty("database.host", &database.host);
    violations.require_non_empty("database.database", &database.database);
    violations.require_non_empty("database.username", &database.username);
    violations.require_non_empty("database.password", &database.password);

    if database.port == 0 {
        violations.push("database.port", "must be between 1 and 65535");
    }

    if database.synchronize && !config.is_development {
        violations.push(
            "database.synchronize",
            "must be disabled outside development: automatic schema synchronization \
             can drop production data (production safety)",
        );
    }
}

fn validate_paths(config: &TalonConfig, violations: &mut Violations) {
    for (name, path) in config.paths.entries() {
        if path.as_os_str().is_empty() {
            violations.push(format!("paths.{name}"), "must not be empty");
        }
    }
}

fn validate_logger(config: &TalonConfig, violations: &mut Violations) {
    for (index, target) in config.logger.targets.iter().enumerate() {
        if target.kind == LogTargetKind::File && target.path.is_none() {
            violations.push(
                format!("logger.targets.{index}.path"),
                "is required for file targets",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> TalonConfig {
        let mut config = TalonConfig::defaults(false);
        config.discord.token = "token".into();
        config.database.database = "talon".into();
        config.database.username = "bot".into();
        config.database.password = "secret".into();
        config
    }

    fn check(config: &TalonConfig) -> ValidationReport {
        let mut violations = Violations::new();
        validate_config(config, &mut violations);
        violations.into_report()
    }

    #[test]
    fn test_valid_config() {
        assert!(check(&valid_config()).is_empty());
    }

    #[test]
    fn test_collects_every_violation() {
        let mut config = valid_config();
        config.discord.token = "   ".into();
        config.database.password.clear();
        config.database.port = 0;

        let report = check(&config);
        assert_eq!(report.len(), 3);
        assert!(report.has_violation("discord.token"));
        assert!(report.has_violation("database.password"));
        assert!(report.has_violation("database.port"));
    }

    #[test]
    fn test_synchronize_requires_development() {
        let mut config = valid_config();
        config.database.synchronize = true;

        let report = check(&config);
        let violation = report.for_path("database.synchronize").next().unwrap();
        assert!(violation.message.contains("production"));

        config.is_development = true;
        assert!(check(&config).is_empty());
    }

    #[test]
    fn test_snowflakes() {
        assert!(is_snowflake("123456789012345678"));
        assert!(!is_snowflake("1234"));
        assert!(!is_snowflake("12345678901234567a"));

        let mut config = valid_config();
        config.discord.guild_id = Some("guild".into());
        assert!(check(&config).has_violation("discord.guild_id"));
    }

    #[test]
    fn test_file_target_needs_path() {
        let mut config = valid_config();
        config.logger.targets[1].path = None;
        assert!(check(&config).has_violation("logger.targets.1.path"));
    }
}
