//! Slash-command interactions backed by serenity.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use serenity::all::{
    CommandDataOption, CommandDataOptionValue, CommandInteraction, CreateInteractionResponse,
    CreateInteractionResponseFollowup, CreateInteractionResponseMessage, EditInteractionResponse,
    Http,
};
use talon_core::{GatewayError, GatewayResult, Interaction, Reply, ReplyState};

/// Tracks how far an interaction has been answered.
#[derive(Debug)]
pub(crate) struct ReplyTracker(AtomicU8);

impl ReplyTracker {
    const PENDING: u8 = 0;
    const DEFERRED: u8 = 1;
    const REPLIED: u8 = 2;

    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(Self::PENDING))
    }

    pub(crate) fn get(&self) -> ReplyState {
        match self.0.load(Ordering::Acquire) {
            Self::PENDING => ReplyState::Pending,
            Self::DEFERRED => ReplyState::Deferred,
            _ => ReplyState::Replied,
        }
    }

    pub(crate) fn set(&self, state: ReplyState) {
        let raw = match state {
            ReplyState::Pending => Self::PENDING,
            ReplyState::Deferred => Self::DEFERRED,
            ReplyState::Replied => Self::REPLIED,
        };
        self.0.store(raw, Ordering::Release);
    }

    /// Fails unless the current state is one of `allowed`.
    pub(crate) fn check(&self, operation: &str, allowed: &[ReplyState]) -> GatewayResult<()> {
        let state = self.get();
        if allowed.contains(&state) {
            Ok(())
        } else {
            Err(GatewayError::InvalidReplyState(format!(
                "cannot {operation} an interaction in state {state:?}"
            )))
        }
    }
}

/// A slash-command invocation received through serenity.
pub struct SerenityInteraction {
    http: Arc<Http>,
    command: CommandInteraction,
    user_id: String,
    guild_id: Option<String>,
    options: Value,
    state: ReplyTracker,
}

impl SerenityInteraction {
    pub fn new(http: Arc<Http>, command: CommandInteraction) -> Self {
        Self {
            user_id: command.user.id.to_string(),
            guild_id: command.guild_id.map(|id| id.to_string()),
            options: options_to_json(&command.data.options),
            http,
            command,
            state: ReplyTracker::new(),
        }
    }

    /// The underlying serenity interaction.
    pub fn raw(&self) -> &CommandInteraction {
        &self.command
    }
}

#[async_trait]
impl Interaction for SerenityInteraction {
    fn command_name(&self) -> &str {
        &self.command.data.name
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn guild_id(&self) -> Option<&str> {
        self.guild_id.as_deref()
    }

    fn options(&self) -> &Value {
        &self.options
    }

    fn reply_state(&self) -> ReplyState {
        self.state.get()
    }

    async fn reply(&self, reply: Reply) -> GatewayResult<()> {
        self.state.check("reply to", &[ReplyState::Pending])?;

        let message = CreateInteractionResponseMessage::new()
            .content(reply.content)
            .ephemeral(reply.ephemeral);
        self.command
            .create_response(self.http.as_ref(), CreateInteractionResponse::Message(message))
            .await
            .map_err(|e| GatewayError::request(e.to_string()))?;

        self.state.set(ReplyState::Replied);
        Ok(())
    }

    async fn defer(&self, ephemeral: bool) -> GatewayResult<()> {
        self.state.check("defer", &[ReplyState::Pending])?;

        let result = if ephemeral {
            self.command.defer_ephemeral(self.http.as_ref()).await
        } else {
            self.command.defer(self.http.as_ref()).await
        };
        result.map_err(|e| GatewayError::request(e.to_string()))?;

        self.state.set(ReplyState::Deferred);
        Ok(())
    }

    async fn edit_reply(&self, reply: Reply) -> GatewayResult<()> {
        self.state
            .check("edit the reply of", &[ReplyState::Deferred, ReplyState::Replied])?;

        self.command
            .edit_response(
                self.http.as_ref(),
                EditInteractionResponse::new().content(reply.content),
            )
            .await
            .map_err(|e| GatewayError::request(e.to_string()))?;

        self.state.set(ReplyState::Replied);
        Ok(())
    }

    async fn follow_up(&self, reply: Reply) -> GatewayResult<()> {
        self.state
            .check("follow up", &[ReplyState::Deferred, ReplyState::Replied])?;

        let message = CreateInteractionResponseFollowup::new()
            .content(reply.content)
            .ephemeral(reply.ephemeral);
        self.command
            .create_followup(self.http.as_ref(), message)
            .await
            .map_err(|e| GatewayError::request(e.to_string()))?;
        Ok(())
    }
}

/// Option values keyed by name. Snowflakes become strings; subcommands
/// become nested objects.
pub(crate) fn options_to_json(options: &[CommandDataOption]) -> Value {
    let map: Map<String, Value> = options
        .iter()
        .map(|option| (option.name.clone(), option_value(&option.value)))
        .collect();
    Value::Object(map)
}

fn option_value(value: &CommandDataOptionValue) -> Value {
    match value {
        CommandDataOptionValue::Boolean(b) => json!(b),
        CommandDataOptionValue::Integer(i) => json!(i),
        CommandDataOptionValue::Number(n) => json!(n),
        CommandDataOptionValue::String(s) => json!(s),
        CommandDataOptionValue::Autocomplete { value, .. } => json!(value),
        CommandDataOptionValue::Attachment(id) => json!(id.to_string()),
        CommandDataOptionValue::Channel(id) => json!(id.to_string()),
        CommandDataOptionValue::Mentionable(id) => json!(id.to_string()),
        CommandDataOptionValue::Role(id) => json!(id.to_string()),
        CommandDataOptionValue::User(id) => json!(id.to_string()),
        CommandDataOptionValue::SubCommand(options)
        | CommandDataOptionValue::SubCommandGroup(options) => options_to_json(options),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: Value) -> Vec<CommandDataOption> {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_options_to_json() {
        let options = parse(json!([
            { "name": "sides", "type": 4, "value": 20 },
            { "name": "user", "type": 6, "value": "80351110224678912" },
            { "name": "secret", "type": 5, "value": true },
        ]));

        let value = options_to_json(&options);
        assert_eq!(value["sides"], 20);
        assert_eq!(value["user"], "80351110224678912");
        assert_eq!(value["secret"], true);
    }

    #[test]
    fn test_subcommand_options_nest() {
        let options = parse(json!([{
            "name": "add",
            "type": 1,
            "options": [{ "name": "role", "type": 8, "value": "41771983423143936" }]
        }]));

        let value = options_to_json(&options);
        assert_eq!(value["add"]["role"], "41771983423143936");
    }

    #[test]
    fn test_reply_tracker() {
        let tracker = ReplyTracker::new();
        assert_eq!(tracker.get(), ReplyState::Pending);
        assert!(tracker.check("follow up", &[ReplyState::Replied]).is_err());

        tracker.set(ReplyState::Deferred);
        assert_eq!(tracker.get(), ReplyState::Deferred);
        assert!(tracker.check("reply to", &[ReplyState::Pending]).is_err());
        assert!(
            tracker
                .check("edit", &[ReplyState::Deferred, ReplyState::Replied])
                .is_ok()
        );
    }
}
