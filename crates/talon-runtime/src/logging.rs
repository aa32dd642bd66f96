//! Logging setup for the Talon bot framework.
//!
//! Logging is driven by the `logger` section of the configuration. Every
//! configured target (stdout, stderr or a file) becomes its own
//! `tracing-subscriber` fmt layer with its own level filter and format, so a
//! bot can print pretty debug output to the console while writing compact
//! info lines to a rolling file.
//!
//! # Configuration-Based Initialization
//!
//! ```rust,ignore
//! use talon_runtime::logging;
//!
//! logging::init_from_config(&config.logger);
//! ```
//!
//! # Manual Initialization
//!
//! ```rust,ignore
//! use talon_runtime::logging::{LoggingBuilder, SpanEvents};
//!
//! LoggingBuilder::new()
//!     .directive("talon_runtime=debug")
//!     .span_events(SpanEvents::LIFECYCLE)
//!     .init();
//! ```

use std::ffi::OsStr;
use std::path::Path;

use talon_config::{LogFormat, LogLevel, LogRotation, LogTarget, LogTargetKind, LoggerConfig};
use tracing::warn;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// When span lifecycle events are logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanEvents {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}

impl SpanEvents {
    pub const NONE: Self = Self {
        new: false,
        enter: false,
        exit: false,
        close: false,
    };

    /// Span creation and close. Shows how long each command or event took.
    pub const LIFECYCLE: Self = Self {
        new: true,
        enter: false,
        exit: false,
        close: true,
    };

    pub const FULL: Self = Self {
        new: true,
        enter: true,
        exit: true,
        close: true,
    };

    fn to_fmt_span(self) -> fmt::format::FmtSpan {
        let mut span = fmt::format::FmtSpan::NONE;
        if self.new {
            span |= fmt::format::FmtSpan::NEW;
        }
        if self.enter {
            span |= fmt::format::FmtSpan::ENTER;
        }
        if self.exit {
            span |= fmt::format::FmtSpan::EXIT;
        }
        if self.close {
            span |= fmt::format::FmtSpan::CLOSE;
        }
        span
    }
}

/// Initializes logging from the `logger` configuration section.
///
/// Does nothing when a global subscriber is already installed.
pub fn init_from_config(config: &LoggerConfig) {
    let _ = LoggingBuilder::from_config(config).try_init();
}

/// Builds the global subscriber.
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    level: LogLevel,
    format: LogFormat,
    targets: Vec<LogTarget>,
    directives: Vec<String>,
    span_events: SpanEvents,
    with_target: bool,
    with_thread_ids: bool,
    with_file: bool,
    with_line_number: bool,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingBuilder {
    /// Compact info-level output to stdout.
    pub fn new() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            targets: vec![LogTarget::stdout()],
            directives: Vec::new(),
            span_events: SpanEvents::NONE,
            with_target: true,
            with_thread_ids: false,
            with_file: false,
            with_line_number: false,
        }
    }

    pub fn from_config(config: &LoggerConfig) -> Self {
        let mut builder = Self::new();
        builder.level = config.level;
        builder.format = config.format;
        builder.targets.clone_from(&config.targets);

        // Source locations help while developing; they are noise in production.
        let debugging = config.level <= LogLevel::Debug;
        builder.with_file = debugging;
        builder.with_line_number = debugging;
        builder
    }

    /// Default level for targets without their own.
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Default format for targets without their own.
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Replaces the output targets.
    pub fn targets(mut self, targets: Vec<LogTarget>) -> Self {
        self.targets = targets;
        self
    }

    pub fn target(mut self, target: LogTarget) -> Self {
        self.targets.push(target);
        self
    }

    /// Adds a filter directive to every target.
    ///
    /// ```rust,ignore
    /// builder.directive("serenity=warn").directive("talon_runtime=trace")
    /// ```
    pub fn directive(mut self, directive: &str) -> Self {
        self.directives.push(directive.to_owned());
        self
    }

    pub fn span_events(mut self, events: SpanEvents) -> Self {
        self.span_events = events;
        self
    }

    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    pub fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.with_thread_ids = enabled;
        self
    }

    pub fn with_file(mut self, enabled: bool) -> Self {
        self.with_file = enabled;
        self
    }

    pub fn with_line_number(mut self, enabled: bool) -> Self {
        self.with_line_number = enabled;
        self
    }

    /// `RUST_LOG` when set, the target's level otherwise, plus the directives.
    fn build_filter(&self, level: LogLevel) -> EnvFilter {
        let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::default().add_directive(level.to_tracing_level().into())
        });

        for directive in &self.directives {
            if let Ok(d) = directive.parse() {
                filter = filter.add_directive(d);
            }
        }

        filter
    }

    fn build_layer<W>(&self, writer: W, target: &LogTarget, ansi: bool) -> BoxedLayer
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let filter = self.build_filter(target.level.unwrap_or(self.level));
        let span_events = self.span_events.to_fmt_span();

        macro_rules! configure_layer {
            ($layer:expr) => {
                $layer
                    .with_span_events(span_events)
                    .with_target(self.with_target)
                    .with_thread_ids(self.with_thread_ids)
                    .with_file(self.with_file)
                    .with_line_number(self.with_line_number)
                    .with_ansi(ansi)
                    .with_writer(writer)
                    .with_filter(filter)
                    .boxed()
            };
        }

        match target.format.unwrap_or(self.format) {
            #[cfg(feature = "json-log")]
            LogFormat::Json => configure_layer!(fmt::layer().json()),
            #[cfg(not(feature = "json-log"))]
            LogFormat::Json => configure_layer!(fmt::layer().compact()),
            LogFormat::Compact => configure_layer!(fmt::layer().compact()),
            LogFormat::Full => configure_layer!(fmt::layer()),
            LogFormat::Pretty => configure_layer!(fmt::layer().pretty()),
        }
    }

    /// One layer per usable target, plus the targets that had to be skipped.
    fn build_layers(&self) -> (Vec<BoxedLayer>, Vec<String>) {
        let mut layers = Vec::with_capacity(self.targets.len());
        let mut skipped = Vec::new();

        for target in &self.targets {
            match target.kind {
                LogTargetKind::Stdout => {
                    layers.push(self.build_layer(std::io::stdout, target, true));
                }
                LogTargetKind::Stderr => {
                    layers.push(self.build_layer(std::io::stderr, target, true));
                }
                LogTargetKind::File => {
                    let Some(path) = &target.path else {
                        skipped.push("file target without a path".to_owned());
                        continue;
                    };
                    let dir = path.parent().unwrap_or_else(|| Path::new("."));
                    let file_name = path.file_name().unwrap_or_else(|| OsStr::new("talon.log"));
                    let appender = match target.rotation {
                        LogRotation::Never => tracing_appender::rolling::never(dir, file_name),
                        LogRotation::Hourly => tracing_appender::rolling::hourly(dir, file_name),
                        LogRotation::Daily => tracing_appender::rolling::daily(dir, file_name),
                    };
                    layers.push(self.build_layer(appender, target, false));
                }
            }
        }

        if layers.is_empty() {
            layers.push(self.build_layer(std::io::stdout, &LogTarget::stdout(), true));
        }
        (layers, skipped)
    }

    /// Installs the global subscriber; does nothing if one already exists.
    pub fn init(self) {
        let _ = self.try_init();
    }

    pub fn try_init(self) -> Result<(), TryInitError> {
        let (layers, skipped) = self.build_layers();
        tracing_subscriber::registry().with(layers).try_init()?;

        for reason in skipped {
            warn!(reason = %reason, "Skipped log target");
        }
        Ok(())
    }
}
