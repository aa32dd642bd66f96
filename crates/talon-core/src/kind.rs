//! The four kinds of discoverable classes.

use std::fmt;
use std::path::Path;

use talon_config::PathsConfig;

use crate::naming::{self, COMMAND_SUFFIX, ENTITY_SUFFIX, EVENT_SUFFIX, JOB_SUFFIX};

/// Role of a discoverable class, carried by its name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClassKind {
    Entity,
    Command,
    Job,
    Event,
}

impl ClassKind {
    /// Every kind, in registration order.
    pub const ALL: [ClassKind; 4] = [Self::Entity, Self::Command, Self::Job, Self::Event];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Command => "command",
            Self::Job => "job",
            Self::Event => "event",
        }
    }

    /// The class name suffix, e.g. `Command`.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Entity => ENTITY_SUFFIX,
            Self::Command => COMMAND_SUFFIX,
            Self::Job => JOB_SUFFIX,
            Self::Event => EVENT_SUFFIX,
        }
    }

    /// The directory this kind is discovered in.
    pub fn directory(self, paths: &PathsConfig) -> &Path {
        match self {
            Self::Entity => &paths.entities,
            Self::Command => &paths.commands,
            Self::Job => &paths.jobs,
            Self::Event => &paths.events,
        }
    }

    /// Whether a class name carries this kind's suffix with a non-empty stem.
    pub fn matches_name(self, class_name: &str) -> bool {
        naming::strip_class_suffix(class_name, self.suffix()).is_ok()
    }

    /// Whether a file may define a class of this kind.
    ///
    /// The file must be a Rust source whose stem, once `_`, `-` and `.` are
    /// dropped and letters lowercased, ends with the suffix and is longer than
    /// it: `ping_command.rs`, `user-info-command.rs` and `PingCommand.rs` all
    /// match `Command`, `command.rs` does not.
    pub fn matches_file(self, path: &Path) -> bool {
        if path.extension().and_then(|ext| ext.to_str()) != Some("rs") {
            return false;
        }
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            return false;
        };

        let normalized: String = stem
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | '.'))
            .flat_map(char::to_lowercase)
            .collect();
        let suffix = self.suffix().to_ascii_lowercase();

        normalized.len() > suffix.len() && normalized.ends_with(&suffix)
    }
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_file() {
        let command = ClassKind::Command;
        assert!(command.matches_file(Path::new("src/commands/ping_command.rs")));
        assert!(command.matches_file(Path::new("user-info-command.rs")));
        assert!(command.matches_file(Path::new("PingCommand.rs")));
        assert!(command.matches_file(Path::new("ping.command.rs")));

        assert!(!command.matches_file(Path::new("command.rs")));
        assert!(!command.matches_file(Path::new("ping_command.txt")));
        assert!(!command.matches_file(Path::new("mod.rs")));
        assert!(!ClassKind::Event.matches_file(Path::new("ping_command.rs")));
    }

    #[test]
    fn test_matches_name() {
        assert!(ClassKind::Job.matches_name("CleanupJob"));
        assert!(!ClassKind::Job.matches_name("Job"));
        assert!(!ClassKind::Entity.matches_name("UserModel"));
    }

    #[test]
    fn test_directory() {
        let paths = PathsConfig::default();
        assert_eq!(ClassKind::Event.directory(&paths), Path::new("src/events"));
        assert_eq!(ClassKind::Entity.directory(&paths), Path::new("src/entities"));
    }
}
