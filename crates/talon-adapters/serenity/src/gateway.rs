//! The serenity-backed [`Gateway`].

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serenity::all::{ApplicationId, Client, GatewayIntents, GuildId, Http, ShardManager};
use talon_core::config::TalonConfig;
use talon_core::{
    CommandData, CommandScope, ConfigurableGateway, Gateway, GatewayError, GatewayResult,
    GatewaySink,
};
use tracing::{debug, info};

use crate::handler::Forwarder;

/// Connects a Talon runtime to Discord through serenity.
///
/// Commands are pushed over the REST client before the gateway connection is
/// opened, so the application id is resolved on first use when the
/// configuration does not carry a `client_id`.
pub struct SerenityGateway {
    token: String,
    intents: GatewayIntents,
    http: Arc<Http>,
    shard_manager: Mutex<Option<Arc<ShardManager>>>,
}

impl SerenityGateway {
    pub fn new(token: impl Into<String>, intents: GatewayIntents) -> Self {
        let token = token.into();
        Self {
            http: Arc::new(Http::new(&token)),
            token,
            intents,
            shard_manager: Mutex::new(None),
        }
    }

    /// Sets the application id used for command registration.
    pub fn application_id(self, id: u64) -> Self {
        self.http.set_application_id(ApplicationId::new(id));
        self
    }

    pub fn http(&self) -> &Arc<Http> {
        &self.http
    }

    async fn resolve_application_id(&self) -> GatewayResult<ApplicationId> {
        if let Some(id) = self.http.application_id() {
            return Ok(id);
        }

        let info = self
            .http
            .get_current_application_info()
            .await
            .map_err(|e| GatewayError::request(format!("failed to fetch application info: {e}")))?;
        debug!(application_id = %info.id, "Resolved application id");
        self.http.set_application_id(info.id);
        Ok(info.id)
    }
}

#[async_trait]
impl Gateway for SerenityGateway {
    fn name(&self) -> &'static str {
        "serenity"
    }

    async fn set_commands(
        &self,
        scope: &CommandScope,
        commands: &[CommandData],
    ) -> GatewayResult<()> {
        self.resolve_application_id().await?;

        let registered = match scope {
            CommandScope::Global => self.http.create_global_commands(&commands).await,
            CommandScope::Guild(guild_id) => {
                let id: u64 = guild_id.parse().map_err(|_| {
                    GatewayError::InvalidConfig(format!("invalid guild id '{guild_id}'"))
                })?;
                self.http
                    .create_guild_commands(GuildId::new(id), &commands)
                    .await
            }
        }
        .map_err(|e| GatewayError::request(e.to_string()))?;

        info!(scope = ?scope, count = registered.len(), "Application commands overwritten");
        Ok(())
    }

    async fn start(&self, sink: Arc<dyn GatewaySink>) -> GatewayResult<()> {
        let mut client = Client::builder(&self.token, self.intents)
            .event_handler(Forwarder::new(sink))
            .await
            .map_err(|e| GatewayError::Connection(e.to_string()))?;

        *self.shard_manager.lock() = Some(Arc::clone(&client.shard_manager));

        info!("Connecting to Discord");
        let result = client
            .start()
            .await
            .map_err(|e| GatewayError::Connection(e.to_string()));

        self.shard_manager.lock().take();
        result
    }

    async fn shutdown(&self) {
        let manager = self.shard_manager.lock().take();
        if let Some(manager) = manager {
            info!("Closing Discord connection");
            manager.shutdown_all().await;
        }
    }
}

impl ConfigurableGateway for SerenityGateway {
    fn from_config(config: &TalonConfig) -> GatewayResult<Self> {
        let discord = &config.discord;
        if discord.token.is_empty() {
            return Err(GatewayError::InvalidConfig(
                "discord.token must be set".to_string(),
            ));
        }

        let intents = GatewayIntents::from_bits_truncate(discord.client_options.intents);
        let gateway = Self::new(discord.token.clone(), intents);

        match &discord.client_id {
            Some(client_id) => {
                let id: u64 = client_id.parse().map_err(|_| {
                    GatewayError::InvalidConfig(format!("invalid client id '{client_id}'"))
                })?;
                Ok(gateway.application_id(id))
            }
            None => Ok(gateway),
        }
    }
}
