use talon::prelude::*;

#[export]
pub struct PingCommand;

#[async_trait]
impl SlashCommand for PingCommand {
    fn create(_ctx: ClassContext) -> anyhow::Result<Self> {
        Ok(Self)
    }

    fn description(&self) -> &str {
        "Replies with pong"
    }

    async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        ctx.respond("Pong!").await?;
        Ok(())
    }
}
