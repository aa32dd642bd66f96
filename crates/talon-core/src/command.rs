//! The slash command contract.

use async_trait::async_trait;

use crate::context::ClassContext;
use crate::error::NamingError;
use crate::interaction::CommandContext;
use crate::naming::{self, short_type_name};
use crate::wire::{CHAT_INPUT, CommandData, CommandOption, IntegrationType, InteractionContext};

/// A slash command.
///
/// Implement it on a type whose name ends with `Command`, mark the type with
/// `#[export]` and put it in a file under the commands directory; discovery
/// and registration take it from there.
///
/// ```rust,ignore
/// #[export]
/// pub struct PingCommand;
///
/// #[async_trait]
/// impl SlashCommand for PingCommand {
///     fn create(_ctx: ClassContext) -> anyhow::Result<Self> {
///         Ok(Self)
///     }
///
///     fn description(&self) -> &str {
///         "Replies with pong"
///     }
///
///     async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
///         ctx.respond("Pong!").await?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait SlashCommand: Send + Sync + 'static {
    /// Builds the instance. Called once, at registration.
    fn create(ctx: ClassContext) -> anyhow::Result<Self>
    where
        Self: Sized;

    /// Shown in the client's command picker. Required.
    fn description(&self) -> &str;

    /// Explicit command name; derived from the type name when `None`.
    fn name(&self) -> Option<&str> {
        None
    }

    fn options(&self) -> Vec<CommandOption> {
        Vec::new()
    }

    /// Permission bitfield members need by default.
    fn default_member_permissions(&self) -> Option<u64> {
        None
    }

    fn contexts(&self) -> Option<Vec<InteractionContext>> {
        None
    }

    fn integration_types(&self) -> Option<Vec<IntegrationType>> {
        None
    }

    fn nsfw(&self) -> bool {
        false
    }

    /// Bare name of the implementing type.
    fn class_name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// The explicit name, or the kebab-cased class name without its suffix.
    fn effective_name(&self) -> Result<String, NamingError> {
        match self.name() {
            Some(name) if name.trim().is_empty() => Err(NamingError::EmptyIdentifier {
                class: self.class_name().to_owned(),
                what: "command name",
            }),
            Some(name) => Ok(name.to_owned()),
            None => naming::command_name_to_id(self.class_name()),
        }
    }

    /// Runs the command.
    async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()>;

    /// Runs before `execute`; an error skips `execute`.
    async fn before_execute(&self, _ctx: &CommandContext) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs after a successful `execute`.
    async fn after_execute(&self, _ctx: &CommandContext) -> anyhow::Result<()> {
        Ok(())
    }

    /// Observes a failure of any of the above before the framework replies.
    async fn on_error(&self, _ctx: &CommandContext, _error: &anyhow::Error) {}

    /// The wire representation pushed to the gateway. Fails on a blank
    /// description.
    fn to_command_data(&self) -> Result<CommandData, NamingError> {
        let name = self.effective_name()?;
        let description = self.description().trim();
        if description.is_empty() {
            return Err(NamingError::EmptyIdentifier {
                class: self.class_name().to_owned(),
                what: "description",
            });
        }

        Ok(CommandData {
            name,
            description: description.to_owned(),
            kind: CHAT_INPUT,
            options: self.options(),
            default_member_permissions: self
                .default_member_permissions()
                .map(|bits| bits.to_string()),
            contexts: self.contexts(),
            integration_types: self.integration_types(),
            nsfw: self.nsfw(),
        })
    }
}
