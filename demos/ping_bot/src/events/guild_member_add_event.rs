//! Greets members as they join.

use anyhow::Context;
use talon::prelude::*;
use tracing::info;

use crate::settings::BotSettings;

#[export]
pub struct GuildMemberAddEvent {
    settings: BotSettings,
}

#[async_trait]
impl EventHandler for GuildMemberAddEvent {
    fn create(ctx: ClassContext) -> anyhow::Result<Self> {
        let settings = ctx
            .config()
            .extra_as::<BotSettings>()
            .context("invalid bot settings")?;
        Ok(Self { settings })
    }

    async fn execute(&self, args: &EventArgs) -> anyhow::Result<()> {
        let member = args.raw(0).context("missing member payload")?;
        let user_id = member["user"]["id"]
            .as_str()
            .context("member payload has no user id")?;
        let guild_id = member["guild_id"].as_str().unwrap_or_default();

        info!(guild_id, user_id, greeting = %self.settings.welcome_for(user_id), "Member joined");
        Ok(())
    }
}
