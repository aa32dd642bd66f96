//! Registration and routing.
//!
//! The [`Registrar`] turns discovered exports into live instances, pushes
//! the command batch to the gateway and, as the gateway's [`GatewaySink`],
//! routes inbound commands and events to them. A failing item is logged and
//! skipped; it never aborts the batch it belongs to.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use talon_config::TalonConfig;
use talon_core::{
    ClassContext, ClassDef, ClassKind, CommandContext, CommandData, CommandScope, EntityInfo,
    EventArgs, EventHandler, Gateway, GatewaySink, INTERACTION_CREATE, Interaction, Job, Reply,
    SlashCommand, respond,
};
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::discovery::Discovered;
use crate::error::{RuntimeError, RuntimeResult};
use crate::events::EventBus;

/// Sent when an interaction names a command that is not registered.
pub const UNKNOWN_COMMAND_REPLY: &str = "Unknown command.";

/// Sent when a command fails.
pub const COMMAND_ERROR_REPLY: &str = "There was an error while executing this command.";

/// Outcome of one registration batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationSummary {
    /// Identifiers of the registered items, in registration order.
    pub registered: Vec<String>,
    /// Class name and reason for every rejected item.
    pub failed: Vec<(String, String)>,
}

impl RegistrationSummary {
    fn fail(&mut self, kind: ClassKind, class: &str, reason: impl ToString) {
        let reason = reason.to_string();
        warn!(kind = %kind, class, reason = %reason, "Skipping {kind}");
        self.failed.push((class.to_owned(), reason));
    }
}

/// How an inbound command was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Completed,
    /// The command or one of its hooks returned an error.
    Failed,
    Panicked,
    /// No command with that name is registered.
    Unknown,
}

/// Owns every live class instance and routes gateway traffic to them.
pub struct Registrar {
    config: Arc<TalonConfig>,
    gateway: Arc<dyn Gateway>,
    commands: RwLock<BTreeMap<String, Arc<dyn SlashCommand>>>,
    events: EventBus,
    jobs: RwLock<BTreeMap<String, Arc<dyn Job>>>,
    entities: RwLock<Vec<EntityInfo>>,
}

impl Registrar {
    pub fn new(config: Arc<TalonConfig>, gateway: Arc<dyn Gateway>) -> Self {
        Self {
            config,
            gateway,
            commands: RwLock::new(BTreeMap::new()),
            events: EventBus::new(),
            jobs: RwLock::new(BTreeMap::new()),
            entities: RwLock::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &Arc<TalonConfig> {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    fn context(&self, kind: ClassKind, class: &str) -> ClassContext {
        ClassContext::for_class(Arc::clone(&self.config), kind, class)
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Instantiates the discovered commands, pushes the whole batch to the
    /// gateway in one call and then replaces the command table.
    ///
    /// The push replaces whatever the gateway had registered before, so an
    /// empty batch clears the remote commands. A rejected push leaves the
    /// table untouched.
    pub async fn register_commands(
        &self,
        discovered: &[Discovered],
    ) -> RuntimeResult<RegistrationSummary> {
        let mut summary = RegistrationSummary::default();
        let mut table: BTreeMap<String, (Arc<dyn SlashCommand>, CommandData)> = BTreeMap::new();

        for item in discovered {
            let class = item.export.name();
            let ClassDef::Command(factory) = item.export.class_def() else {
                summary.fail(ClassKind::Command, class, "does not implement SlashCommand");
                continue;
            };

            let command = match factory(self.context(ClassKind::Command, class)) {
                Ok(command) => command,
                Err(e) => {
                    summary.fail(ClassKind::Command, class, format!("{e:#}"));
                    continue;
                }
            };

            let data = match command.to_command_data() {
                Ok(data) => data,
                Err(e) => {
                    summary.fail(ClassKind::Command, class, e);
                    continue;
                }
            };

            if let Some((existing, _)) = table.get(&data.name) {
                summary.fail(
                    ClassKind::Command,
                    class,
                    format!(
                        "command name `{}` is already taken by {}",
                        data.name,
                        existing.class_name()
                    ),
                );
                continue;
            }

            debug!(command = %data.name, class, "Command instantiated");
            summary.registered.push(data.name.clone());
            table.insert(data.name.clone(), (Arc::from(command), data));
        }

        let batch: Vec<CommandData> = table.values().map(|(_, data)| data.clone()).collect();
        let scope = CommandScope::from_config(&self.config);
        self.gateway.set_commands(&scope, &batch).await?;

        // Only a batch the gateway accepted becomes routable.
        *self.commands.write() = table
            .into_iter()
            .map(|(name, (command, _))| (name, command))
            .collect();

        info!(
            gateway = self.gateway.name(),
            scope = ?scope,
            registered = summary.registered.len(),
            failed = summary.failed.len(),
            "Commands registered"
        );
        Ok(summary)
    }

    pub fn command(&self, name: &str) -> Option<Arc<dyn SlashCommand>> {
        self.commands.read().get(name).cloned()
    }

    /// Registered command names, sorted.
    pub fn command_names(&self) -> Vec<String> {
        self.commands.read().keys().cloned().collect()
    }

    /// Runs the command an interaction names and reports how it went.
    ///
    /// The command runs in its own task. Any failure is logged and answered
    /// with [`COMMAND_ERROR_REPLY`] through whichever reply channel the
    /// interaction still has open.
    pub async fn route_command(&self, interaction: Arc<dyn Interaction>) -> CommandOutcome {
        let name = interaction.command_name().to_owned();
        let Some(command) = self.command(&name) else {
            warn!(
                command = %name,
                user_id = interaction.user_id(),
                "Received unknown command"
            );
            send_reply(interaction.as_ref(), Reply::ephemeral(UNKNOWN_COMMAND_REPLY)).await;
            return CommandOutcome::Unknown;
        };

        let span = info_span!(
            "command",
            command = %name,
            class = command.class_name(),
            user_id = interaction.user_id(),
            guild_id = interaction.guild_id()
        );
        let ctx = CommandContext::new(Arc::clone(&interaction), Arc::clone(&self.config));
        let task = tokio::spawn(run_command(command, ctx).instrument(span));

        match task.await {
            Ok(Ok(())) => CommandOutcome::Completed,
            Ok(Err(e)) => {
                error!(
                    command = %name,
                    user_id = interaction.user_id(),
                    guild_id = interaction.guild_id(),
                    error = %format!("{e:#}"),
                    "Command failed"
                );
                send_reply(interaction.as_ref(), Reply::ephemeral(COMMAND_ERROR_REPLY)).await;
                CommandOutcome::Failed
            }
            Err(e) => {
                error!(
                    command = %name,
                    user_id = interaction.user_id(),
                    guild_id = interaction.guild_id(),
                    error = %e,
                    "Command panicked"
                );
                send_reply(interaction.as_ref(), Reply::ephemeral(COMMAND_ERROR_REPLY)).await;
                CommandOutcome::Panicked
            }
        }
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Instantiates the discovered handlers and subscribes them, replacing
    /// any earlier subscriptions.
    pub fn register_event_handlers(&self, discovered: &[Discovered]) -> RegistrationSummary {
        let mut summary = RegistrationSummary::default();
        self.events.clear();

        for item in discovered {
            let class = item.export.name();
            let ClassDef::Event(factory) = item.export.class_def() else {
                summary.fail(ClassKind::Event, class, "does not implement EventHandler");
                continue;
            };

            let handler: Arc<dyn EventHandler> =
                match factory(self.context(ClassKind::Event, class)) {
                    Ok(handler) => Arc::from(handler),
                    Err(e) => {
                        summary.fail(ClassKind::Event, class, format!("{e:#}"));
                        continue;
                    }
                };

            let event = match handler.effective_event_name() {
                Ok(event) => event,
                Err(e) => {
                    summary.fail(ClassKind::Event, class, e);
                    continue;
                }
            };

            if event == INTERACTION_CREATE {
                summary.fail(
                    ClassKind::Event,
                    class,
                    format!("`{INTERACTION_CREATE}` is reserved for command routing"),
                );
                continue;
            }

            let once = handler.once();
            debug!(event = %event, class, once, "Event handler subscribed");
            self.events.subscribe(event.clone(), handler, once);
            summary.registered.push(event);
        }

        info!(
            registered = summary.registered.len(),
            failed = summary.failed.len(),
            "Event handlers registered"
        );
        summary
    }

    /// Delivers an event to its handlers. Returns the number of handlers run.
    pub async fn dispatch_event(&self, args: EventArgs) -> usize {
        self.events.emit(args).await
    }

    // =========================================================================
    // Jobs
    // =========================================================================

    pub fn register_jobs(&self, discovered: &[Discovered]) -> RegistrationSummary {
        let mut summary = RegistrationSummary::default();
        let mut table: BTreeMap<String, Arc<dyn Job>> = BTreeMap::new();

        for item in discovered {
            let class = item.export.name();
            let ClassDef::Job(factory) = item.export.class_def() else {
                summary.fail(ClassKind::Job, class, "does not implement Job");
                continue;
            };

            let job = match factory(self.context(ClassKind::Job, class)) {
                Ok(job) => job,
                Err(e) => {
                    summary.fail(ClassKind::Job, class, format!("{e:#}"));
                    continue;
                }
            };

            let name = match job.effective_name() {
                Ok(name) => name,
                Err(e) => {
                    summary.fail(ClassKind::Job, class, e);
                    continue;
                }
            };

            if table.contains_key(&name) {
                summary.fail(ClassKind::Job, class, format!("job name `{name}` is already taken"));
                continue;
            }

            debug!(job = %name, class, schedule = job.schedule(), "Job registered");
            summary.registered.push(name.clone());
            table.insert(name, Arc::from(job));
        }

        *self.jobs.write() = table;
        info!(
            registered = summary.registered.len(),
            failed = summary.failed.len(),
            "Jobs registered"
        );
        summary
    }

    pub fn job(&self, name: &str) -> Option<Arc<dyn Job>> {
        self.jobs.read().get(name).cloned()
    }

    pub fn job_names(&self) -> Vec<String> {
        self.jobs.read().keys().cloned().collect()
    }

    /// Runs a registered job now.
    pub async fn run_job(&self, name: &str) -> RuntimeResult<()> {
        let job = self
            .job(name)
            .ok_or_else(|| RuntimeError::JobNotFound(name.to_owned()))?;

        let span = info_span!("job", job = %name, class = job.class_name());
        job.run()
            .instrument(span)
            .await
            .map_err(|e| RuntimeError::JobFailed {
                name: name.to_owned(),
                message: format!("{e:#}"),
            })
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Collects table metadata of the discovered entities.
    pub fn register_entities(&self, discovered: &[Discovered]) -> RegistrationSummary {
        let mut summary = RegistrationSummary::default();
        let mut entities = Vec::new();

        for item in discovered {
            let class = item.export.name();
            let ClassDef::Entity(info) = item.export.class_def() else {
                summary.fail(ClassKind::Entity, class, "does not implement Entity");
                continue;
            };

            match info() {
                Ok(info) => {
                    debug!(class, table = %info.table, "Entity registered");
                    summary.registered.push(info.table.clone());
                    entities.push(info);
                }
                Err(e) => summary.fail(ClassKind::Entity, class, e),
            }
        }

        *self.entities.write() = entities;
        info!(
            registered = summary.registered.len(),
            failed = summary.failed.len(),
            "Entities registered"
        );
        summary
    }

    pub fn entities(&self) -> Vec<EntityInfo> {
        self.entities.read().clone()
    }
}

impl std::fmt::Debug for Registrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registrar")
            .field("gateway", &self.gateway.name())
            .field("commands", &self.command_names())
            .field("events", &self.events)
            .field("jobs", &self.job_names())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl GatewaySink for Registrar {
    async fn on_event(&self, args: EventArgs) {
        if args.name() == INTERACTION_CREATE {
            debug!("Ignoring raw interaction event");
            return;
        }
        self.dispatch_event(args).await;
    }

    async fn on_command(&self, interaction: Arc<dyn Interaction>) {
        self.route_command(interaction).await;
    }
}

async fn run_command(command: Arc<dyn SlashCommand>, ctx: CommandContext) -> anyhow::Result<()> {
    let result = async {
        command.before_execute(&ctx).await?;
        command.execute(&ctx).await?;
        command.after_execute(&ctx).await
    }
    .await;

    if let Err(e) = &result {
        command.on_error(&ctx, e).await;
    }
    result
}

/// Sends `reply`, logging instead of returning a failure.
async fn send_reply(interaction: &dyn Interaction, reply: Reply) {
    if let Err(e) = respond(interaction, reply).await {
        error!(
            command = interaction.command_name(),
            state = ?interaction.reply_state(),
            error = %e,
            "Failed to send reply"
        );
    }
}
