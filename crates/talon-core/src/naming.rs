//! Naming conventions.
//!
//! Class names carry their role as a suffix (`PingCommand`, `ReadyEvent`,
//! `CleanupJob`, `UserEntity`). The stem left after stripping the suffix is
//! turned into the identifier the gateway sees:
//!
//! | role    | class name        | identifier  |
//! |---------|-------------------|-------------|
//! | command | `UserInfoCommand` | `user-info` |
//! | job     | `CleanupJob`      | `cleanup`   |
//! | event   | `MessageCreateEvent` | `messageCreate` |
//! | entity  | `GuildMemberEntity`  | `GuildMember`   |

use crate::error::NamingError;

pub const COMMAND_SUFFIX: &str = "Command";
pub const EVENT_SUFFIX: &str = "Event";
pub const JOB_SUFFIX: &str = "Job";
pub const ENTITY_SUFFIX: &str = "Entity";

/// Converts `PascalCase` to `kebab-case`.
///
/// A separator goes before an uppercase letter that follows a lowercase
/// letter or a digit, and before the last capital of an acronym that is
/// followed by a lowercase letter: `HTMLParser` becomes `html-parser`,
/// `API2Response` becomes `api2-response`.
pub fn pascal_to_kebab(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower)
            {
                out.push('-');
            }
        }
        out.extend(c.to_lowercase());
    }

    out
}

/// Lowercases the first character.
pub fn pascal_to_camel(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Uppercases the first character.
pub fn camel_to_pascal(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Converts `kebab-case` back to `PascalCase`.
pub fn kebab_to_pascal(name: &str) -> String {
    name.split('-').map(camel_to_pascal).collect()
}

/// Strips `suffix` from `name`, failing if it is absent or nothing remains.
pub fn strip_class_suffix<'a>(name: &'a str, suffix: &str) -> Result<&'a str, NamingError> {
    let stem = name
        .strip_suffix(suffix)
        .ok_or_else(|| NamingError::missing_suffix(name, suffix))?;

    if stem.is_empty() {
        return Err(NamingError::empty_stem(name, suffix));
    }
    Ok(stem)
}

/// Whether `name` is a well-formed class name for `suffix`: it ends with the
/// suffix and the stem is an uppercase letter followed by ASCII alphanumerics.
pub fn is_valid_class_name(name: &str, suffix: &str) -> bool {
    let Ok(stem) = strip_class_suffix(name, suffix) else {
        return false;
    };
    let mut chars = stem.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

/// `UserInfoCommand` -> `user-info`.
pub fn command_name_to_id(class_name: &str) -> Result<String, NamingError> {
    strip_class_suffix(class_name, COMMAND_SUFFIX).map(pascal_to_kebab)
}

/// `MessageCreateEvent` -> `messageCreate`.
pub fn event_name_to_id(class_name: &str) -> Result<String, NamingError> {
    strip_class_suffix(class_name, EVENT_SUFFIX).map(pascal_to_camel)
}

/// `DailyCleanupJob` -> `daily-cleanup`.
pub fn job_name_to_id(class_name: &str) -> Result<String, NamingError> {
    strip_class_suffix(class_name, JOB_SUFFIX).map(pascal_to_kebab)
}

/// `GuildMemberEntity` -> `GuildMember`.
pub fn entity_name_to_table(class_name: &str) -> Result<String, NamingError> {
    strip_class_suffix(class_name, ENTITY_SUFFIX).map(str::to_owned)
}

/// Reduces a [`std::any::type_name`] to the bare type identifier:
/// `my_bot::commands::PingCommand<u8>` becomes `PingCommand`.
pub fn short_type_name(type_name: &str) -> &str {
    let without_generics = type_name.split('<').next().unwrap_or(type_name);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_to_kebab() {
        assert_eq!(pascal_to_kebab("Ping"), "ping");
        assert_eq!(pascal_to_kebab("UserInfo"), "user-info");
        assert_eq!(pascal_to_kebab("HTMLParser"), "html-parser");
        assert_eq!(pascal_to_kebab("API2Response"), "api2-response");
        assert_eq!(pascal_to_kebab("XMLHttpRequest"), "xml-http-request");
        assert_eq!(pascal_to_kebab("Top10List"), "top10-list");
        assert_eq!(pascal_to_kebab(""), "");
    }

    #[test]
    fn test_case_toggles() {
        assert_eq!(pascal_to_camel("MessageCreate"), "messageCreate");
        assert_eq!(camel_to_pascal("messageCreate"), "MessageCreate");
        assert_eq!(kebab_to_pascal("user-info"), "UserInfo");
        assert_eq!(kebab_to_pascal("ping"), "Ping");
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(command_name_to_id("PingCommand").unwrap(), "ping");
        assert_eq!(command_name_to_id("UserInfoCommand").unwrap(), "user-info");
        assert_eq!(event_name_to_id("ReadyEvent").unwrap(), "ready");
        assert_eq!(event_name_to_id("GuildMemberAddEvent").unwrap(), "guildMemberAdd");
        assert_eq!(job_name_to_id("DailyCleanupJob").unwrap(), "daily-cleanup");
        assert_eq!(entity_name_to_table("GuildMemberEntity").unwrap(), "GuildMember");
    }

    #[test]
    fn test_suffix_failures() {
        assert!(matches!(
            command_name_to_id("Command"),
            Err(NamingError::InvalidName { .. })
        ));
        assert!(command_name_to_id("").is_err());
        assert!(command_name_to_id("PingHandler").is_err());
        assert!(event_name_to_id("Event").is_err());
    }

    #[test]
    fn test_round_trip_for_well_formed_names() {
        for stem in ["Ping", "UserInfo", "BanMember"] {
            let class_name = format!("{stem}Command");
            assert!(is_valid_class_name(&class_name, COMMAND_SUFFIX));
            let id = command_name_to_id(&class_name).unwrap();
            assert_eq!(kebab_to_pascal(&id), stem);
        }
    }

    #[test]
    fn test_class_name_shape() {
        assert!(is_valid_class_name("PingCommand", COMMAND_SUFFIX));
        assert!(!is_valid_class_name("pingCommand", COMMAND_SUFFIX));
        assert!(!is_valid_class_name("Ping_Command", COMMAND_SUFFIX));
        assert!(!is_valid_class_name("Command", COMMAND_SUFFIX));
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("my_bot::commands::PingCommand"), "PingCommand");
        assert_eq!(short_type_name("a::Wrapper<b::Inner>"), "Wrapper");
        assert_eq!(short_type_name("PingCommand"), "PingCommand");
    }
}
