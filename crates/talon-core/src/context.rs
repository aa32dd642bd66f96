//! Dependencies injected into every class instance.

use std::sync::Arc;

use talon_config::TalonConfig;
use tracing::Span;

use crate::kind::ClassKind;

/// Handed to a class's constructor: the shared configuration and a tracing
/// span scoped to the class.
///
/// ```rust,ignore
/// impl SlashCommand for PingCommand {
///     fn create(ctx: ClassContext) -> anyhow::Result<Self> {
///         Ok(Self { ctx })
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ClassContext {
    config: Arc<TalonConfig>,
    span: Span,
}

impl ClassContext {
    pub fn new(config: Arc<TalonConfig>, span: Span) -> Self {
        Self { config, span }
    }

    /// Builds the context for a class of `kind` named `class`.
    pub fn for_class(config: Arc<TalonConfig>, kind: ClassKind, class: &str) -> Self {
        let span = tracing::info_span!("class", kind = kind.as_str(), class = %class);
        Self::new(config, span)
    }

    pub fn config(&self) -> &TalonConfig {
        &self.config
    }

    /// A shared handle to the configuration.
    pub fn config_arc(&self) -> Arc<TalonConfig> {
        Arc::clone(&self.config)
    }

    /// The span that scopes this class's log output.
    pub fn span(&self) -> &Span {
        &self.span
    }
}
