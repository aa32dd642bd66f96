use talon::prelude::*;
use tracing::info;

#[export]
pub struct ReadyEvent;

#[async_trait]
impl EventHandler for ReadyEvent {
    fn create(_ctx: ClassContext) -> anyhow::Result<Self> {
        Ok(Self)
    }

    fn once(&self) -> bool {
        true
    }

    async fn execute(&self, args: &EventArgs) -> anyhow::Result<()> {
        let user = args
            .raw(0)
            .and_then(|ready| ready["user"]["username"].as_str())
            .unwrap_or("unknown");
        info!(user, "Ready to serve");
        Ok(())
    }
}
