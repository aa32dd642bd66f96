//! Runtime bootstrap.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use talon_adapter_serenity::SerenityGateway;
//! use talon_runtime::TalonRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Loads .env, talon.toml and the environment, then sets up logging
//!     let runtime = TalonRuntime::builder().build::<SerenityGateway>()?;
//!
//!     // Discovers and registers every class, then runs until Ctrl+C
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use talon_config::{BuildOptions, ConfigLoader, ConfigSchema, EnvSnapshot, NoExtra, TalonConfig};
use talon_core::{ConfigurableGateway, Gateway, GatewaySink};
use tokio::signal;
use tracing::{error, info, warn};

use crate::discovery::Discovery;
use crate::error::RuntimeResult;
use crate::logging;
use crate::registrar::{Registrar, RegistrationSummary};

/// What [`TalonRuntime::init`] registered, per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    pub entities: RegistrationSummary,
    pub commands: RegistrationSummary,
    pub jobs: RegistrationSummary,
    pub events: RegistrationSummary,
}

/// Ties configuration, discovery, registration and the gateway together.
pub struct TalonRuntime {
    config: Arc<TalonConfig>,
    gateway: Arc<dyn Gateway>,
    discovery: Discovery,
    registrar: Arc<Registrar>,
}

impl TalonRuntime {
    /// Creates a runtime with manifest-backed discovery.
    ///
    /// Logging is left alone; [`RuntimeBuilder`] sets it up from the
    /// configuration.
    pub fn new(config: TalonConfig, gateway: Arc<dyn Gateway>) -> Self {
        let config = Arc::new(config);
        let discovery = Discovery::new(config.paths.clone());
        let registrar = Arc::new(Registrar::new(Arc::clone(&config), Arc::clone(&gateway)));

        Self {
            config,
            gateway,
            discovery,
            registrar,
        }
    }

    /// Loads configuration and builds the gateway from it.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn with_discovery(mut self, discovery: Discovery) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn config(&self) -> &TalonConfig {
        &self.config
    }

    pub fn registrar(&self) -> &Arc<Registrar> {
        &self.registrar
    }

    pub fn discovery(&self) -> &Discovery {
        &self.discovery
    }

    /// Discovers and registers entities, commands, jobs and event handlers.
    ///
    /// Only a failed command push to the gateway is an error; rejected
    /// classes are reported in the returned [`InitReport`].
    pub async fn init(&self) -> RuntimeResult<InitReport> {
        let entities = self.discovery.discover_entities().await;
        let entities = self.registrar.register_entities(&entities);

        let commands = self.discovery.discover_commands().await;
        let commands = self.registrar.register_commands(&commands).await?;

        let jobs = self.discovery.discover_jobs().await;
        let jobs = self.registrar.register_jobs(&jobs);

        let events = self.discovery.discover_events().await;
        let events = self.registrar.register_event_handlers(&events);

        info!(
            entities = entities.registered.len(),
            commands = commands.registered.len(),
            jobs = jobs.registered.len(),
            events = events.registered.len(),
            "Runtime initialized"
        );

        Ok(InitReport {
            entities,
            commands,
            jobs,
            events,
        })
    }

    /// Runs until Ctrl+C or SIGTERM.
    pub async fn run(&self) -> RuntimeResult<()> {
        info!("Talon runtime starting. Press Ctrl+C to stop.");
        self.run_until(wait_for_shutdown()).await
    }

    /// Initializes, connects the gateway and runs until `shutdown` completes
    /// or the connection ends.
    pub async fn run_until<F>(&self, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        self.init().await?;

        let sink: Arc<dyn GatewaySink> = self.registrar.clone();
        let result: RuntimeResult<()> = tokio::select! {
            result = self.gateway.start(sink) => {
                if let Err(e) = &result {
                    error!(gateway = self.gateway.name(), error = %e, "Gateway stopped with an error");
                } else {
                    info!(gateway = self.gateway.name(), "Gateway connection closed");
                }
                result.map_err(Into::into)
            }
            () = shutdown => Ok(()),
        };

        self.gateway.shutdown().await;
        info!("Talon runtime stopped");
        result
    }
}

impl std::fmt::Debug for TalonRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TalonRuntime")
            .field("gateway", &self.gateway.name())
            .field("discovery", &self.discovery)
            .field("registrar", &self.registrar)
            .finish_non_exhaustive()
    }
}

/// Waits for Ctrl+C or, on Unix, SIGTERM.
pub async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    result = signal::ctrl_c() => {
                        if let Err(e) = result {
                            error!(error = %e, "Failed to listen for Ctrl+C");
                        }
                        info!("Received Ctrl+C, shutting down");
                    }
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down");
                    }
                }
                return;
            }
            Err(e) => warn!(error = %e, "Failed to register SIGTERM handler"),
        }
    }

    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
    }
    info!("Received Ctrl+C, shutting down");
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builds a [`TalonRuntime`] from layered configuration.
///
/// ```rust,ignore
/// let runtime = TalonRuntime::builder()
///     .config_file("config/talon.toml")
///     .merge(json!({ "paths": { "commands": "bot/commands" } }))
///     .build_with::<GameSettings, SerenityGateway>()?;
/// ```
#[derive(Debug, Default)]
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads this file instead of searching for one; it must exist.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Skips configuration files entirely.
    pub fn without_files(mut self) -> Self {
        self.config_loader = self.config_loader.without_files();
        self
    }

    /// Uses `env` instead of the process environment.
    pub fn env(mut self, env: EnvSnapshot) -> Self {
        self.config_loader = self.config_loader.env(env);
        self
    }

    /// Adds programmatic overrides; later merges win.
    pub fn merge<S: Serialize>(mut self, overrides: S) -> Self {
        self.config_loader = self.config_loader.merge(overrides);
        self
    }

    pub fn working_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.config_loader = self.config_loader.working_dir(dir);
        self
    }

    /// Return configuration errors instead of exiting the process.
    pub fn exit_on_failure(mut self, exit: bool) -> Self {
        self.config_loader = self.config_loader.exit_on_failure(exit);
        self
    }

    pub fn options(mut self, options: BuildOptions) -> Self {
        self.config_loader = self.config_loader.options(options);
        self
    }

    /// Builds the runtime for gateway `G` with no application settings.
    pub fn build<G>(self) -> RuntimeResult<TalonRuntime>
    where
        G: ConfigurableGateway + 'static,
    {
        self.build_with::<NoExtra, G>()
    }

    /// Builds the runtime, validating application settings against `T`.
    pub fn build_with<T, G>(self) -> RuntimeResult<TalonRuntime>
    where
        T: ConfigSchema,
        G: ConfigurableGateway + 'static,
    {
        let config = self.config_loader.load::<T>()?;
        logging::init_from_config(&config.logger);

        let gateway = G::from_config(&config)?;
        info!(
            gateway = gateway.name(),
            development = config.is_development,
            log_level = %config.logger.level,
            "Configuration loaded"
        );

        Ok(TalonRuntime::new(config, Arc::new(gateway)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use serde_json::json;
    use talon_config::PathsConfig;
    use talon_core::{Export, classify};

    use super::*;
    use crate::discovery::ManifestLoader;
    use crate::error::RuntimeError;
    use crate::testing::{CleanupJob, MockGateway, PingCommand, test_config};

    static RUNTIME_EXPORTS: [Export; 2] = [
        Export::new("PingCommand", "bot/commands/ping_command.rs", || {
            classify!(PingCommand)
        }),
        Export::new("CleanupJob", "bot/jobs/cleanup_job.rs", || classify!(CleanupJob)),
    ];

    fn runtime_in(root: &Path) -> (TalonRuntime, Arc<MockGateway>) {
        for (dir, file) in [("commands", "ping_command.rs"), ("jobs", "cleanup_job.rs")] {
            let dir = root.join("bot").join(dir);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join(file), "").unwrap();
        }

        let mut config = test_config();
        config.paths = PathsConfig {
            entities: root.join("bot/entities"),
            commands: root.join("bot/commands"),
            jobs: root.join("bot/jobs"),
            events: root.join("bot/events"),
            services: root.join("bot/services"),
        };

        let gateway = Arc::new(MockGateway::default());
        let discovery = Discovery::with_loader(
            config.paths.clone(),
            Arc::new(ManifestLoader::with_exports(&RUNTIME_EXPORTS)),
        );
        let runtime = TalonRuntime::new(config, gateway.clone()).with_discovery(discovery);
        (runtime, gateway)
    }

    #[tokio::test]
    async fn test_init_registers_every_kind() {
        let dir = tempfile::tempdir().unwrap();
        let (runtime, gateway) = runtime_in(dir.path());

        let report = runtime.init().await.unwrap();

        assert_eq!(report.commands.registered, ["ping"]);
        assert_eq!(report.jobs.registered, ["cleanup"]);
        assert!(report.events.registered.is_empty());
        assert!(report.entities.registered.is_empty());
        assert_eq!(gateway.pushes.lock().len(), 1);
        assert_eq!(runtime.registrar().command_names(), ["ping"]);
    }

    #[tokio::test]
    async fn test_run_until_shuts_gateway_down() {
        let dir = tempfile::tempdir().unwrap();
        let (runtime, gateway) = runtime_in(dir.path());

        runtime
            .run_until(tokio::time::sleep(Duration::from_millis(20)))
            .await
            .unwrap();

        assert!(gateway.started.load(Ordering::SeqCst));
        assert_eq!(gateway.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_until_fails_when_push_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (runtime, gateway) = runtime_in(dir.path());
        gateway.fail_push.store(true, Ordering::SeqCst);

        let result = runtime.run_until(std::future::ready(())).await;

        assert!(matches!(result, Err(RuntimeError::Gateway(_))));
        assert!(!gateway.started.load(Ordering::SeqCst));
    }

    #[test]
    fn test_builder_reports_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result = RuntimeBuilder::new()
            .without_files()
            .env(EnvSnapshot::new())
            .working_dir(dir.path())
            .exit_on_failure(false)
            .merge(json!({ "database": { "port": 0 } }))
            .build::<MockGateway>();

        let Err(RuntimeError::Config(e)) = result else {
            panic!("expected a configuration error");
        };
        let report = e.report().unwrap();
        assert!(report.has_violation("discord.token"));
        assert!(report.has_violation("database.port"));
    }

    impl ConfigurableGateway for MockGateway {
        fn from_config(_config: &TalonConfig) -> talon_core::GatewayResult<Self> {
            Ok(Self::default())
        }
    }
}
