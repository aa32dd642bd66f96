//! Forwards serenity's gateway callbacks to a [`GatewaySink`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use serenity::all::{
    CommandType, Context, EventHandler, Guild, Interaction, Member, Message, Ready,
};
use talon_core::{EventArgs, GatewaySink};
use tracing::{debug, info, warn};

use crate::interaction::SerenityInteraction;

/// Event names handed to the sink.
pub mod events {
    pub const READY: &str = "ready";
    pub const MESSAGE_CREATE: &str = "messageCreate";
    pub const GUILD_CREATE: &str = "guildCreate";
    pub const GUILD_MEMBER_ADD: &str = "guildMemberAdd";
}

pub(crate) struct Forwarder {
    sink: Arc<dyn GatewaySink>,
}

impl Forwarder {
    pub(crate) fn new(sink: Arc<dyn GatewaySink>) -> Self {
        Self { sink }
    }

    async fn forward(&self, name: &str, values: Vec<Value>) {
        self.sink.on_event(EventArgs::new(name, values)).await;
    }
}

/// Serializes a gateway payload, logging instead of failing.
fn to_value<T: Serialize>(event: &str, payload: &T) -> Value {
    serde_json::to_value(payload).unwrap_or_else(|e| {
        warn!(event, error = %e, "Failed to serialize event payload");
        Value::Null
    })
}

#[async_trait]
impl EventHandler for Forwarder {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            user = %ready.user.name,
            guilds = ready.guilds.len(),
            "Connected to Discord"
        );
        let payload = to_value(events::READY, &ready);
        self.forward(events::READY, vec![payload]).await;
    }

    async fn message(&self, _ctx: Context, message: Message) {
        let payload = to_value(events::MESSAGE_CREATE, &message);
        self.forward(events::MESSAGE_CREATE, vec![payload]).await;
    }

    async fn guild_create(&self, _ctx: Context, guild: Guild, is_new: Option<bool>) {
        let payload = to_value(events::GUILD_CREATE, &guild);
        self.forward(events::GUILD_CREATE, vec![payload, Value::from(is_new)])
            .await;
    }

    async fn guild_member_addition(&self, _ctx: Context, member: Member) {
        let payload = to_value(events::GUILD_MEMBER_ADD, &member);
        self.forward(events::GUILD_MEMBER_ADD, vec![payload]).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            debug!("Ignoring non-command interaction");
            return;
        };
        if command.data.kind != CommandType::ChatInput {
            debug!(command = %command.data.name, "Ignoring context menu command");
            return;
        }

        let interaction = SerenityInteraction::new(Arc::clone(&ctx.http), command);
        self.sink.on_command(Arc::new(interaction)).await;
    }
}
