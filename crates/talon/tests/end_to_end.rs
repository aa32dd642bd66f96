//! Exercises `#[export]`, discovery, registration and routing together.

#[path = "commands/foo_command.rs"]
mod foo_command;
#[path = "commands/ping_command.rs"]
mod ping_command;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use talon::config::EnvSnapshot;
use talon::core::{
    CommandData, CommandScope, Gateway, GatewayResult, GatewaySink, Interaction, Reply,
    ReplyState,
};
use talon::prelude::*;
use talon::runtime::CommandOutcome;

#[derive(Default)]
struct RecordingGateway {
    pushes: Mutex<Vec<(CommandScope, Vec<CommandData>)>>,
}

#[async_trait]
impl Gateway for RecordingGateway {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn set_commands(&self, scope: &CommandScope, commands: &[CommandData]) -> GatewayResult<()> {
        self.pushes.lock().push((scope.clone(), commands.to_vec()));
        Ok(())
    }

    async fn start(&self, _sink: Arc<dyn GatewaySink>) -> GatewayResult<()> {
        Ok(())
    }
}

struct SlashInteraction {
    name: &'static str,
    options: Value,
    state: Mutex<ReplyState>,
    sent: Mutex<Vec<Reply>>,
}

impl SlashInteraction {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            options: json!({}),
            state: Mutex::new(ReplyState::Pending),
            sent: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Interaction for SlashInteraction {
    fn command_name(&self) -> &str {
        self.name
    }

    fn user_id(&self) -> &str {
        "300000000000000003"
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
        self.sent.lock().push(reply);
        *self.state.lock() = ReplyState::Replied;
        Ok(())
    }

    async fn defer(&self, _ephemeral: bool) -> GatewayResult<()> {
        *self.state.lock() = ReplyState::Deferred;
        Ok(())
    }

    async fn edit_reply(&self, reply: Reply) -> GatewayResult<()> {
        self.sent.lock().push(reply);
        Ok(())
    }

    async fn follow_up(&self, reply: Reply) -> GatewayResult<()> {
        self.sent.lock().push(reply);
        Ok(())
    }
}

fn commands_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/commands")
}

fn load_config(working_dir: &std::path::Path) -> TalonConfig {
    let env = EnvSnapshot::new()
        .with_var("TOKEN", "test-token")
        .with_var("DB_NAME", "talon")
        .with_var("DB_USERNAME", "talon")
        .with_var("DB_PASSWORD", "secret");

    ConfigLoader::new()
        .without_files()
        .env(env)
        .working_dir(working_dir)
        .exit_on_failure(false)
        .merge(json!({ "paths": { "commands": commands_dir() } }))
        .load::<NoExtra>()
        .unwrap()
}

#[tokio::test]
async fn test_ping_command_is_discovered_and_registered() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(dir.path());
    assert_eq!(config.paths.commands, commands_dir());

    let gateway = Arc::new(RecordingGateway::default());
    let runtime = TalonRuntime::new(config, gateway.clone());

    let report = runtime.init().await.unwrap();

    assert_eq!(report.commands.registered, ["ping"]);
    assert!(report.commands.failed.is_empty());

    let pushes = gateway.pushes.lock();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].0, CommandScope::Global);
    let names: Vec<_> = pushes[0].1.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["ping"]);
}

#[tokio::test]
async fn test_ping_command_answers() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = TalonRuntime::new(load_config(dir.path()), Arc::new(RecordingGateway::default()));
    runtime.init().await.unwrap();

    let interaction = Arc::new(SlashInteraction::new("ping"));
    let outcome = runtime.registrar().route_command(interaction.clone()).await;

    assert_eq!(outcome, CommandOutcome::Completed);
    assert_eq!(*interaction.sent.lock(), [Reply::new("Pong!")]);
}

#[test]
fn test_exports_are_linked() {
    let names: Vec<_> = talon::core::exports().iter().map(|e| e.name()).collect();
    assert!(names.contains(&"PingCommand"));
    assert!(names.contains(&"FooCommand"));

    let foo = foo_command::FooCommand {
        label: "unused".into(),
    };
    assert_eq!(foo.label, "unused");
}
