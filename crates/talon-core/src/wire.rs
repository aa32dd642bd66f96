//! Application command wire format.
//!
//! These types serialize to the JSON shape the Discord API expects for a
//! bulk command overwrite, so gateways can forward them unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Discord's `CHAT_INPUT` application command type.
pub const CHAT_INPUT: u8 = 1;

/// One application command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandData {
    pub name: String,
    pub description: String,
    #[serde(rename = "type", default = "chat_input")]
    pub kind: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOption>,
    /// Permission bitfield, serialized as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_member_permissions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contexts: Option<Vec<InteractionContext>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration_types: Option<Vec<IntegrationType>>,
    #[serde(default)]
    pub nsfw: bool,
}

fn chat_input() -> u8 {
    CHAT_INPUT
}

/// A parameter of a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOption {
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<OptionChoice>,
    /// Nested options of a sub-command or sub-command group.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOption>,
}

impl CommandOption {
    pub fn new(kind: OptionKind, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            description: description.into(),
            required: false,
            choices: Vec::new(),
            options: Vec::new(),
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn choice(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.choices.push(OptionChoice {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn sub_option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionChoice {
    pub name: String,
    pub value: Value,
}

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(into = "u8", try_from = "u8")]
        pub enum $name {
            $($variant = $value),+
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value as u8
            }
        }

        impl TryFrom<u8> for $name {
            type Error = String;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok(Self::$variant),)+
                    other => Err(format!(concat!("unknown ", stringify!($name), " {}"), other)),
                }
            }
        }
    };
}

wire_enum! {
    /// Type of a command option.
    OptionKind {
        SubCommand = 1,
        SubCommandGroup = 2,
        String = 3,
        Integer = 4,
        Boolean = 5,
        User = 6,
        Channel = 7,
        Role = 8,
        Mentionable = 9,
        Number = 10,
        Attachment = 11,
    }
}

wire_enum! {
    /// Where a command may be used.
    InteractionContext {
        Guild = 0,
        BotDm = 1,
        PrivateChannel = 2,
    }
}

wire_enum! {
    /// Where a command may be installed.
    IntegrationType {
        GuildInstall = 0,
        UserInstall = 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_to_discord_shape() {
        let data = CommandData {
            name: "ban".into(),
            description: "Ban a member".into(),
            kind: CHAT_INPUT,
            options: vec![
                CommandOption::new(OptionKind::User, "member", "Who to ban").required(true),
            ],
            default_member_permissions: Some("4".into()),
            contexts: Some(vec![InteractionContext::Guild]),
            integration_types: None,
            nsfw: false,
        };

        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({
                "name": "ban",
                "description": "Ban a member",
                "type": 1,
                "options": [
                    { "type": 6, "name": "member", "description": "Who to ban", "required": true }
                ],
                "default_member_permissions": "4",
                "contexts": [0],
                "nsfw": false,
            })
        );
    }

    #[test]
    fn test_unknown_enum_value_is_rejected() {
        assert!(serde_json::from_value::<InteractionContext>(json!(7)).is_err());
        assert_eq!(
            serde_json::from_value::<OptionKind>(json!(3)).unwrap(),
            OptionKind::String
        );
    }
}
