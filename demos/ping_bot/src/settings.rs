//! Configuration owned by the bot rather than the framework.

use serde::{Deserialize, Serialize};
use talon::prelude::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotSettings {
    /// Greeting posted for new members; `{user}` is replaced by a mention.
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            welcome_message: default_welcome_message(),
        }
    }
}

fn default_welcome_message() -> String {
    "Welcome, {user}!".to_string()
}

impl BotSettings {
    pub fn welcome_for(&self, user_id: &str) -> String {
        self.welcome_message.replace("{user}", &format!("<@{user_id}>"))
    }
}

impl ConfigSchema for BotSettings {
    fn env_mapping() -> &'static [(&'static str, &'static str)] {
        &[("WELCOME_MESSAGE", "welcome_message")]
    }

    fn validate(&self, violations: &mut Violations) {
        violations.require_non_empty("welcome_message", &self.welcome_message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_for() {
        let settings = BotSettings::default();
        assert_eq!(settings.welcome_for("42"), "Welcome, <@42>!");
    }

    #[test]
    fn test_empty_welcome_is_rejected() {
        let settings = BotSettings {
            welcome_message: String::new(),
        };
        let mut violations = Violations::new();
        settings.validate(&mut violations);
        assert_eq!(violations.len(), 1);
    }
}
