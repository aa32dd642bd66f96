//! Fixtures shared by the runtime's unit tests.
//!
//! Every static counter belongs to a single test so parallel tests do not
//! observe each other.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use talon_config::TalonConfig;
use talon_core::{
    ClassContext, CommandContext, CommandData, CommandScope, Entity, EventArgs, EventHandler,
    Gateway, GatewayError, GatewayResult, GatewaySink, Interaction, Job, Reply, ReplyState,
    SlashCommand,
};
use tokio::sync::Notify;

pub(crate) fn test_config() -> TalonConfig {
    let mut config = TalonConfig::defaults(true);
    config.discord.token = "test-token".into();
    config
}

// =============================================================================
// Gateway
// =============================================================================

#[derive(Default)]
pub(crate) struct MockGateway {
    pub pushes: Mutex<Vec<(CommandScope, Vec<CommandData>)>>,
    pub fail_push: AtomicBool,
    pub started: AtomicBool,
    pub stopped: Notify,
    pub shutdowns: AtomicUsize,
}

#[async_trait]
impl Gateway for MockGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn set_commands(&self, scope: &CommandScope, commands: &[CommandData]) -> GatewayResult<()> {
        if self.fail_push.load(Ordering::SeqCst) {
            return Err(GatewayError::request("push rejected"));
        }
        self.pushes.lock().push((scope.clone(), commands.to_vec()));
        Ok(())
    }

    async fn start(&self, sink: Arc<dyn GatewaySink>) -> GatewayResult<()> {
        self.started.store(true, Ordering::SeqCst);
        sink.on_event(EventArgs::new("ready", vec![json!({ "user": "talon" })]))
            .await;
        self.stopped.notified().await;
        Ok(())
    }

    async fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        self.stopped.notify_one();
    }
}

// =============================================================================
// Interaction
// =============================================================================

pub(crate) struct MockInteraction {
    name: String,
    options: Value,
    state: Mutex<ReplyState>,
    sent: Mutex<Vec<(&'static str, Reply)>>,
    fail_sends: bool,
}

impl MockInteraction {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            options: json!({}),
            state: Mutex::new(ReplyState::Pending),
            sent: Mutex::new(Vec::new()),
            fail_sends: false,
        }
    }

    /// Every send fails as if the interaction had expired.
    pub(crate) fn failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    pub(crate) fn sent(&self) -> Vec<(&'static str, Reply)> {
        self.sent.lock().clone()
    }

    fn record(&self, channel: &'static str, reply: Reply) -> GatewayResult<()> {
        if self.fail_sends {
            return Err(GatewayError::request("Unknown interaction"));
        }
        self.sent.lock().push((channel, reply));
        Ok(())
    }
}

#[async_trait]
impl Interaction for MockInteraction {
    fn command_name(&self) -> &str {
        &self.name
    }

    fn user_id(&self) -> &str {
        "100000000000000001"
    }

    fn guild_id(&self) -> Option<&str> {
        Some("200000000000000002")
    }

    fn options(&self) -> &Value {
        &self.options
    }

    fn reply_state(&self) -> ReplyState {
        *self.state.lock()
    }

    async fn reply(&self, reply: Reply) -> GatewayResult<()> {
        self.record("reply", reply)?;
        *self.state.lock() = ReplyState::Replied;
        Ok(())
    }

    async fn defer(&self, _ephemeral: bool) -> GatewayResult<()> {
        if self.fail_sends {
            return Err(GatewayError::request("Unknown interaction"));
        }
        *self.state.lock() = ReplyState::Deferred;
        Ok(())
    }

    async fn edit_reply(&self, reply: Reply) -> GatewayResult<()> {
        self.record("edit", reply)
    }

    async fn follow_up(&self, reply: Reply) -> GatewayResult<()> {
        self.record("follow_up", reply)
    }
}

// =============================================================================
// Commands
// =============================================================================

pub(crate) struct PingCommand;

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

pub(crate) struct UserInfoCommand;

#[async_trait]
impl SlashCommand for UserInfoCommand {
    fn create(_ctx: ClassContext) -> anyhow::Result<Self> {
        Ok(Self)
    }

    fn description(&self) -> &str {
        "Shows information about a user"
    }

    async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        ctx.respond(format!("You are <@{}>", ctx.user_id())).await?;
        Ok(())
    }
}

/// Named like a command without implementing the contract.
pub(crate) struct FooCommand;

pub(crate) struct BrokenCommand;

#[async_trait]
impl SlashCommand for BrokenCommand {
    fn create(_ctx: ClassContext) -> anyhow::Result<Self> {
        anyhow::bail!("missing API key")
    }

    fn description(&self) -> &str {
        "Never built"
    }

    async fn execute(&self, _ctx: &CommandContext) -> anyhow::Result<()> {
        Ok(())
    }
}

pub(crate) struct BlankCommand;

#[async_trait]
impl SlashCommand for BlankCommand {
    fn create(_ctx: ClassContext) -> anyhow::Result<Self> {
        Ok(Self)
    }

    fn description(&self) -> &str {
        "   "
    }

    async fn execute(&self, _ctx: &CommandContext) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Claims the name `ping`.
pub(crate) struct PongCommand;

#[async_trait]
impl SlashCommand for PongCommand {
    fn create(_ctx: ClassContext) -> anyhow::Result<Self> {
        Ok(Self)
    }

    fn name(&self) -> Option<&str> {
        Some("ping")
    }

    fn description(&self) -> &str {
        "Duplicate of ping"
    }

    async fn execute(&self, _ctx: &CommandContext) -> anyhow::Result<()> {
        Ok(())
    }
}

pub(crate) static FAIL_COMMAND_ERRORS: AtomicUsize = AtomicUsize::new(0);

pub(crate) struct FailCommand;

#[async_trait]
impl SlashCommand for FailCommand {
    fn create(_ctx: ClassContext) -> anyhow::Result<Self> {
        Ok(Self)
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    async fn execute(&self, _ctx: &CommandContext) -> anyhow::Result<()> {
        anyhow::bail!("database unavailable")
    }

    async fn on_error(&self, _ctx: &CommandContext, _error: &anyhow::Error) {
        FAIL_COMMAND_ERRORS.fetch_add(1, Ordering::SeqCst);
    }
}

/// Defers, then fails.
pub(crate) struct SlowFailCommand;

#[async_trait]
impl SlashCommand for SlowFailCommand {
    fn create(_ctx: ClassContext) -> anyhow::Result<Self> {
        Ok(Self)
    }

    fn description(&self) -> &str {
        "Fails after deferring"
    }

    async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        ctx.defer(true).await?;
        anyhow::bail!("upstream timed out")
    }
}

/// Replies, then fails.
pub(crate) struct LateFailCommand;

#[async_trait]
impl SlashCommand for LateFailCommand {
    fn create(_ctx: ClassContext) -> anyhow::Result<Self> {
        Ok(Self)
    }

    fn description(&self) -> &str {
        "Fails after replying"
    }

    async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        ctx.respond("Working on it").await?;
        anyhow::bail!("follow-up step failed")
    }
}

pub(crate) struct PanicCommand;

#[async_trait]
impl SlashCommand for PanicCommand {
    fn create(_ctx: ClassContext) -> anyhow::Result<Self> {
        Ok(Self)
    }

    fn description(&self) -> &str {
        "Panics"
    }

    async fn execute(&self, _ctx: &CommandContext) -> anyhow::Result<()> {
        panic!("index out of bounds")
    }
}

// =============================================================================
// Events, jobs and entities
// =============================================================================

pub(crate) static READY_EVENT_RUNS: AtomicUsize = AtomicUsize::new(0);

pub(crate) struct ReadyEvent;

#[async_trait]
impl EventHandler for ReadyEvent {
    fn create(_ctx: ClassContext) -> anyhow::Result<Self> {
        Ok(Self)
    }

    fn once(&self) -> bool {
        true
    }

    async fn execute(&self, _args: &EventArgs) -> anyhow::Result<()> {
        READY_EVENT_RUNS.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub(crate) static INTERACTION_CREATE_RUNS: AtomicUsize = AtomicUsize::new(0);

/// Tries to shadow command routing.
pub(crate) struct InteractionCreateEvent;

#[async_trait]
impl EventHandler for InteractionCreateEvent {
    fn create(_ctx: ClassContext) -> anyhow::Result<Self> {
        Ok(Self)
    }

    async fn execute(&self, _args: &EventArgs) -> anyhow::Result<()> {
        INTERACTION_CREATE_RUNS.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub(crate) static CLEANUP_JOB_RUNS: AtomicUsize = AtomicUsize::new(0);

pub(crate) struct CleanupJob;

#[async_trait]
impl Job for CleanupJob {
    fn create(_ctx: ClassContext) -> anyhow::Result<Self> {
        Ok(Self)
    }

    async fn run(&self) -> anyhow::Result<()> {
        CLEANUP_JOB_RUNS.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub(crate) struct GuildSettingsEntity;

impl Entity for GuildSettingsEntity {}
