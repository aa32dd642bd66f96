//! Inbound slash-command interactions.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use talon_config::TalonConfig;

use crate::error::GatewayResult;

/// How far an interaction has been answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyState {
    /// Nothing has been sent yet.
    Pending,
    /// A deferred ("thinking...") response was sent.
    Deferred,
    /// An initial response was sent.
    Replied,
}

/// A message sent in response to an interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    /// Only visible to the invoking user.
    pub ephemeral: bool,
}

impl Reply {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: false,
        }
    }

    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
        }
    }
}

impl From<&str> for Reply {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}

impl From<String> for Reply {
    fn from(content: String) -> Self {
        Self::new(content)
    }
}

/// A slash-command invocation as delivered by the gateway.
///
/// Implementations track their own [`ReplyState`]: a successful `reply`
/// moves it to `Replied`, a successful `defer` to `Deferred`.
#[async_trait]
pub trait Interaction: Send + Sync {
    /// Name of the invoked command.
    fn command_name(&self) -> &str;

    /// Id of the invoking user.
    fn user_id(&self) -> &str;

    /// Id of the guild the command was used in, if any.
    fn guild_id(&self) -> Option<&str>;

    /// Option values keyed by option name.
    fn options(&self) -> &Value;

    fn reply_state(&self) -> ReplyState;

    /// Sends the initial response.
    async fn reply(&self, reply: Reply) -> GatewayResult<()>;

    /// Acknowledges the interaction; the response follows through `edit_reply`.
    async fn defer(&self, ephemeral: bool) -> GatewayResult<()>;

    /// Replaces the deferred or initial response.
    async fn edit_reply(&self, reply: Reply) -> GatewayResult<()>;

    /// Sends an additional message after the initial response.
    async fn follow_up(&self, reply: Reply) -> GatewayResult<()>;
}

/// Sends `reply` through whichever channel the interaction's state allows.
pub async fn respond(interaction: &dyn Interaction, reply: Reply) -> GatewayResult<()> {
    match interaction.reply_state() {
        ReplyState::Pending => interaction.reply(reply).await,
        ReplyState::Deferred => interaction.edit_reply(reply).await,
        ReplyState::Replied => interaction.follow_up(reply).await,
    }
}

/// What a command's `execute` receives.
#[derive(Clone)]
pub struct CommandContext {
    interaction: Arc<dyn Interaction>,
    config: Arc<TalonConfig>,
}

impl CommandContext {
    pub fn new(interaction: Arc<dyn Interaction>, config: Arc<TalonConfig>) -> Self {
        Self {
            interaction,
            config,
        }
    }

    pub fn interaction(&self) -> &dyn Interaction {
        self.interaction.as_ref()
    }

    pub fn config(&self) -> &TalonConfig {
        &self.config
    }

    pub fn command_name(&self) -> &str {
        self.interaction.command_name()
    }

    pub fn user_id(&self) -> &str {
        self.interaction.user_id()
    }

    pub fn guild_id(&self) -> Option<&str> {
        self.interaction.guild_id()
    }

    /// Deserializes the option called `name`, if present.
    pub fn option<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.interaction
            .options()
            .get(name)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Replies, edits the deferred response or follows up, as appropriate.
    pub async fn respond(&self, reply: impl Into<Reply>) -> GatewayResult<()> {
        respond(self.interaction.as_ref(), reply.into()).await
    }

    pub async fn defer(&self, ephemeral: bool) -> GatewayResult<()> {
        self.interaction.defer(ephemeral).await
    }
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("command", &self.interaction.command_name())
            .field("user_id", &self.interaction.user_id())
            .field("guild_id", &self.interaction.guild_id())
            .field("reply_state", &self.interaction.reply_state())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    /// Records every response instead of sending it.
    pub(crate) struct RecordingInteraction {
        pub name: String,
        pub options: Value,
        pub state: Mutex<ReplyState>,
        pub sent: Mutex<Vec<(&'static str, Reply)>>,
    }

    impl RecordingInteraction {
        pub(crate) fn new(name: &str) -> Self {
            Self {
                name: name.to_owned(),
                options: json!({}),
                state: Mutex::new(ReplyState::Pending),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Interaction for RecordingInteraction {
        fn command_name(&self) -> &str {
            &self.name
        }

        fn user_id(&self) -> &str {
            "100000000000000001"
        }

        fn guild_id(&self) -> Option<&str> {
            None
        }

        fn options(&self) -> &Value {
            &self.options
        }

        fn reply_state(&self) -> ReplyState {
            *self.state.lock()
        }

        async fn reply(&self, reply: Reply) -> GatewayResult<()> {
            self.sent.lock().push(("reply", reply));
            *self.state.lock() = ReplyState::Replied;
            Ok(())
        }

        async fn defer(&self, _ephemeral: bool) -> GatewayResult<()> {
            *self.state.lock() = ReplyState::Deferred;
            Ok(())
        }

        async fn edit_reply(&self, reply: Reply) -> GatewayResult<()> {
            self.sent.lock().push(("edit", reply));
            Ok(())
        }

        async fn follow_up(&self, reply: Reply) -> GatewayResult<()> {
            self.sent.lock().push(("follow_up", reply));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_respond_follows_reply_state() {
        let interaction = RecordingInteraction::new("ping");

        respond(&interaction, Reply::new("first")).await.unwrap();
        respond(&interaction, Reply::new("second")).await.unwrap();

        let deferred = RecordingInteraction::new("slow");
        deferred.defer(false).await.unwrap();
        respond(&deferred, Reply::new("done")).await.unwrap();

        let sent: Vec<_> = interaction.sent.lock().iter().map(|(c, _)| *c).collect();
        assert_eq!(sent, ["reply", "follow_up"]);
        assert_eq!(deferred.sent.lock()[0].0, "edit");
    }

    #[tokio::test]
    async fn test_command_context_options() {
        let mut interaction = RecordingInteraction::new("roll");
        interaction.options = json!({ "sides": 20, "label": "d20" });
        let ctx = CommandContext::new(Arc::new(interaction), Arc::new(TalonConfig::default()));

        assert_eq!(ctx.option::<u32>("sides"), Some(20));
        assert_eq!(ctx.option::<String>("label").as_deref(), Some("d20"));
        assert_eq!(ctx.option::<u32>("missing"), None);
    }
}
