//! Structured JSONL logging for the Pokedex engine
//!
//! # Features
//!
//! - **JSONL Output**: Structured JSON lines for log aggregation (default)
//! - **Player Context**: Attach the acting player to every span in a scope
//! - **File Rotation**: Daily/hourly log rotation via tracing-appender
//!
//! Console output goes to stderr so it never mixes with command output on
//! stdout.
//!
//! # Quick Start
//!
//! ```ignore
//! use pokedex_logging::{DexSubscriberBuilder, LogConfig};
//!
//! // Simple setup with defaults (JSONL to console)
//! let _guard = DexSubscriberBuilder::new().init();
//!
//! // Development mode with pretty human-readable output
//! let _guard = DexSubscriberBuilder::new()
//!     .with_config(LogConfig::development())
//!     .init();
//! ```

pub mod config;
pub mod context;
pub mod layers;

pub use config::{ConsoleConfig, FileConfig, JsonlConfig, LogConfig, RotationStrategy};
pub use context::{PlayerContextData, PlayerContextGuard};
pub use layers::{PlayerContextExtension, PlayerContextLayer, jsonl_layer};
pub use tracing_appender::non_blocking::WorkerGuard;

use std::fs::{self, File};

use thiserror::Error;
use tracing_appender::non_blocking::NonBlocking;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::layer::{Layer, Layered, SubscriberExt};
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Registry};

/// Errors raised while installing the global subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to open log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to create rolling log appender: {0}")]
    Appender(#[from] InitError),

    #[error("Global subscriber already set: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

type BaseSubscriber = Layered<PlayerContextLayer, Layered<EnvFilter, Registry>>;
type BoxedLayer = Box<dyn Layer<BaseSubscriber> + Send + Sync>;

/// Builder for configuring and initializing the logging subscriber
///
/// By default, console output uses JSONL format. Use `LogConfig::development()`
/// for human-readable pretty output during development.
pub struct DexSubscriberBuilder {
    config: LogConfig,
}

impl DexSubscriberBuilder {
    /// Create a new subscriber builder with default configuration
    pub fn new() -> Self {
        Self {
            config: LogConfig::default(),
        }
    }

    /// Use a specific configuration
    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default log level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config.default_level = level.into();
        self
    }

    /// Enable or disable console output
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.config.console.enabled = enabled;
        self
    }

    /// Switch the console between pretty and JSONL output
    pub fn with_pretty_console(mut self, pretty: bool) -> Self {
        self.config.console.pretty = pretty;
        self
    }

    /// Configure file output
    pub fn with_file_output(mut self, config: FileConfig) -> Self {
        self.config.file = Some(config);
        self
    }

    /// The configuration the subscriber will be built from
    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Initialize the subscriber globally
    ///
    /// Failures are reported on stderr and leave logging disabled. The
    /// returned guard must be kept alive while file output is in use.
    pub fn init(self) -> Option<WorkerGuard> {
        match self.try_init() {
            Ok(guard) => guard,
            Err(e) => {
                eprintln!("Warning: Failed to initialize logging: {}", e);
                None
            }
        }
    }

    /// Try to initialize the subscriber globally
    ///
    /// Returns an error if a global subscriber has already been set or the
    /// log file cannot be opened.
    pub fn try_init(self) -> Result<Option<WorkerGuard>, LoggingError> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.config.default_level));

        let mut layers: Vec<BoxedLayer> = Vec::new();
        let mut guard = None;

        match (self.config.console.enabled, self.config.console.pretty) {
            (true, true) => layers.push(
                tracing_subscriber::fmt::layer()
                    .with_ansi(self.config.console.ansi)
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .boxed(),
            ),
            (true, false) => {
                layers.push(jsonl_layer::<BaseSubscriber, _>(std::io::stderr, &self.config.jsonl).boxed())
            }
            (false, _) => {}
        }

        if let Some(file_config) = &self.config.file {
            let (non_blocking, worker) = file_writer(file_config)?;
            guard = Some(worker);
            layers.push(jsonl_layer::<BaseSubscriber, _>(non_blocking, &self.config.jsonl).boxed());
        }

        Registry::default()
            .with(env_filter)
            .with(PlayerContextLayer::new())
            .with(layers)
            .try_init()?;

        Ok(guard)
    }
}

impl Default for DexSubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-blocking writer for file output
///
/// `Never` truncates a single file; the other strategies append to rolling
/// files named `<prefix>.<date>.log`.
fn file_writer(config: &FileConfig) -> Result<(NonBlocking, WorkerGuard), LoggingError> {
    let rotation = match config.rotation {
        RotationStrategy::Never => {
            fs::create_dir_all(&config.directory)?;
            let file = File::create(config.directory.join(format!("{}.log", config.prefix)))?;
            return Ok(tracing_appender::non_blocking(file));
        }
        RotationStrategy::Daily => Rotation::DAILY,
        RotationStrategy::Hourly => Rotation::HOURLY,
    };

    let mut builder = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(config.prefix.as_str())
        .filename_suffix("log");
    if let Some(max_files) = config.max_files {
        builder = builder.max_log_files(max_files);
    }

    let appender = builder.build(&config.directory)?;
    Ok(tracing_appender::non_blocking(appender))
}

/// Initialize logging with default settings (JSONL to console)
pub fn init_default() -> Option<WorkerGuard> {
    DexSubscriberBuilder::new().init()
}

/// Initialize logging for development (verbose, pretty console output)
pub fn init_development() -> Option<WorkerGuard> {
    DexSubscriberBuilder::new()
        .with_config(LogConfig::development())
        .init()
}

/// Initialize logging for testing (minimal output, repeat calls are ignored)
pub fn init_testing() {
    let _ = DexSubscriberBuilder::new()
        .with_config(LogConfig::testing())
        .try_init();
}
