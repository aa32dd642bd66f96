//! The seam between the framework and a concrete gateway client.
//!
//! A [`Gateway`] pushes command definitions and delivers inbound traffic to a
//! [`GatewaySink`]; the registrar is the sink in a running bot.

use std::sync::Arc;

use async_trait::async_trait;
use talon_config::TalonConfig;

use crate::error::GatewayResult;
use crate::event::EventArgs;
use crate::interaction::Interaction;
use crate::wire::CommandData;

/// Where a batch of commands is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandScope {
    /// Every guild and DM; propagation can take a while.
    Global,
    /// A single guild; applied immediately.
    Guild(String),
}

impl CommandScope {
    /// Guild scope when the configuration names a guild, global otherwise.
    pub fn from_config(config: &TalonConfig) -> Self {
        match &config.discord.guild_id {
            Some(guild_id) => Self::Guild(guild_id.clone()),
            None => Self::Global,
        }
    }
}

/// Receives inbound traffic from a gateway.
#[async_trait]
pub trait GatewaySink: Send + Sync {
    /// A gateway event other than a command interaction.
    async fn on_event(&self, args: EventArgs);

    /// A slash-command interaction.
    async fn on_command(&self, interaction: Arc<dyn Interaction>);
}

/// A connection to the chat platform.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Replaces every command in `scope` with `commands`.
    async fn set_commands(&self, scope: &CommandScope, commands: &[CommandData])
    -> GatewayResult<()>;

    /// Connects and delivers traffic to `sink` until the connection ends.
    async fn start(&self, sink: Arc<dyn GatewaySink>) -> GatewayResult<()>;

    /// Closes the connection; `start` returns afterwards.
    async fn shutdown(&self) {}
}

/// A gateway that can be built from the framework configuration.
pub trait ConfigurableGateway: Gateway + Sized {
    fn from_config(config: &TalonConfig) -> GatewayResult<Self>;
}
