//! `/user-info [user]`

use talon::prelude::*;

#[export]
pub struct UserInfoCommand;

#[async_trait]
impl SlashCommand for UserInfoCommand {
    fn create(_ctx: ClassContext) -> anyhow::Result<Self> {
        Ok(Self)
    }

    fn description(&self) -> &str {
        "Shows who a user is"
    }

    fn options(&self) -> Vec<CommandOption> {
        vec![CommandOption::new(
            OptionKind::User,
            "user",
            "Defaults to you",
        )]
    }

    fn contexts(&self) -> Option<Vec<InteractionContext>> {
        Some(vec![InteractionContext::Guild])
    }

    async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        let user = ctx
            .option::<String>("user")
            .unwrap_or_else(|| ctx.user_id().to_string());
        let guild = ctx.guild_id().unwrap_or("a direct message");

        ctx.respond(Reply::ephemeral(format!("<@{user}> (`{user}`) in {guild}")))
            .await?;
        Ok(())
    }
}
