//! Service configuration and command line

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use pokedex_core::{GAMEPLAY_LEADERBOARD_LIMIT, PUBLIC_LEADERBOARD_LIMIT};
use pokedex_logging::LogConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Volatile in-memory store
    Memory,
    /// redb database file under `data_dir`
    #[default]
    Redb,
}

/// Console log format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    Pretty,
    /// JSON lines
    #[default]
    Json,
}

/// Configuration for a [`DexService`](crate::DexService) and the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base directory for all service data
    pub data_dir: PathBuf,
    /// Storage backend
    pub storage: StorageBackend,
    /// redb cache size in bytes
    pub cache_size: usize,
    /// Entries on the in-game leaderboard
    pub gameplay_leaderboard_limit: usize,
    /// Entries on the public leaderboard
    pub public_leaderboard_limit: usize,
    /// Default log level
    pub log_level: String,
    /// Console log format
    pub log_format: LogFormat,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./pokedex-data"),
            storage: StorageBackend::Redb,
            cache_size: 64 * 1024 * 1024,
            gameplay_leaderboard_limit: GAMEPLAY_LEADERBOARD_LIMIT,
            public_leaderboard_limit: PUBLIC_LEADERBOARD_LIMIT,
            log_level: "warn".to_string(),
            log_format: LogFormat::Json,
        }
    }
}

impl ServiceConfig {
    /// Create a configuration with a custom data directory
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Load a TOML configuration file
    ///
    /// Missing keys take their default values.
    pub fn load(path: impl AsRef<Path>) -> ServiceResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&contents)
    }

    /// Parse a TOML configuration string
    pub fn from_toml(contents: &str) -> ServiceResult<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the storage backend
    pub fn with_storage(mut self, storage: StorageBackend) -> Self {
        self.storage = storage;
        self
    }

    /// Set the redb cache size
    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.cache_size = cache_size;
        self
    }

    /// Set both leaderboard limits
    pub fn with_leaderboard_limits(mut self, gameplay: usize, public: usize) -> Self {
        self.gameplay_leaderboard_limit = gameplay;
        self.public_leaderboard_limit = public;
        self
    }

    /// Set the log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the console log format
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }

    /// Path of the redb database file
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("pokedex.redb")
    }

    /// Logging configuration derived from this config
    pub fn log_config(&self) -> LogConfig {
        let mut config = match self.log_format {
            LogFormat::Pretty => LogConfig::development(),
            LogFormat::Json => LogConfig::default(),
        };
        config.default_level = self.log_level.clone();
        config
    }

    fn validate(&self) -> ServiceResult<()> {
        if self.gameplay_leaderboard_limit == 0 || self.public_leaderboard_limit == 0 {
            return Err(ServiceError::Config(
                "leaderboard limits must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply command line overrides
    pub fn apply_overrides(mut self, cli: &Cli) -> Self {
        if let Some(data_dir) = &cli.data_dir {
            self.data_dir = data_dir.clone();
        }
        if let Some(storage) = cli.storage {
            self.storage = storage;
        }
        if let Some(level) = &cli.log_level {
            self.log_level = level.clone();
        }
        if let Some(format) = cli.log_format {
            self.log_format = format;
        }
        self
    }
}

#[derive(Parser)]
#[command(name = "pokedex", about = "Pokedex completion tracking and leaderboards")]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Data directory (overrides the config file)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    /// Storage backend (overrides the config file)
    #[arg(long, global = true, value_enum)]
    pub storage: Option<StorageBackend>,
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    /// Log format on stderr
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Command,
}

/// Catalog entry selection shared by `catch` and `see`
#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
    /// Global catalog id
    #[arg(long, conflicts_with_all = ["region", "regional_id"])]
    pub global_id: Option<u32>,
    /// Region name
    #[arg(long, requires = "regional_id")]
    pub region: Option<String>,
    /// 1-based id within the region
    #[arg(long, requires = "region")]
    pub regional_id: Option<u32>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a player's summary
    Register {
        /// Player id
        player: u64,
    },
    /// Mark an entry as caught
    Catch {
        /// Player id
        player: u64,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Mark an entry as seen
    See {
        /// Player id
        player: u64,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Show a player's national summary
    Summary {
        /// Player id
        player: u64,
    },
    /// Show (creating if needed) a player's record for one region
    Region {
        /// Player id
        player: u64,
        /// Region name
        region: String,
    },
    /// Show the global leaderboard
    Leaderboard {
        /// Use the public view
        #[arg(long)]
        public: bool,
    },
    /// Catch statistics for one catalog entry
    Popularity {
        /// Global catalog id
        global_id: u32,
    },
    /// Totals across all players
    Analytics,
    /// List the region table
    Regions,
}

impl Command {
    /// The player a command acts on, if any
    pub fn player(&self) -> Option<u64> {
        match self {
            Command::Register { player }
            | Command::Catch { player, .. }
            | Command::See { player, .. }
            | Command::Summary { player }
            | Command::Region { player, .. } => Some(*player),
            Command::Leaderboard { .. }
            | Command::Popularity { .. }
            | Command::Analytics
            | Command::Regions => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.storage, StorageBackend::Redb);
        assert_eq!(config.gameplay_leaderboard_limit, 50);
        assert_eq!(config.public_leaderboard_limit, 100);
        assert_eq!(config.db_path(), PathBuf::from("./pokedex-data/pokedex.redb"));
    }

    #[test]
    fn test_partial_toml() {
        let config = ServiceConfig::from_toml(
            r#"
            data_dir = "/srv/dex"
            storage = "memory"
            log_format = "pretty"
            "#,
        )
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/dex"));
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.public_leaderboard_limit, 100);
        assert!(config.log_config().console.pretty);
    }

    #[test]
    fn test_zero_limit_rejected() {
        let err = ServiceConfig::from_toml("gameplay_leaderboard_limit = 0").unwrap_err();
        assert!(matches!(err, ServiceError::Config(_)));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(ServiceConfig::from_toml(r#"storage = "postgres""#).is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "pokedex",
            "--storage",
            "memory",
            "--log-level",
            "debug",
            "catch",
            "7",
            "--region",
            "johto",
            "--regional-id",
            "4",
        ]);
        let config = ServiceConfig::with_data_dir("/tmp/dex").apply_overrides(&cli);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/dex"));

        match cli.command {
            Command::Catch { player, target } => {
                assert_eq!(player, 7);
                assert_eq!(target.region.as_deref(), Some("johto"));
                assert_eq!(target.regional_id, Some(4));
                assert!(target.global_id.is_none());
            }
            _ => panic!("expected catch"),
        }
    }

    #[test]
    fn test_command_player() {
        let cli = Cli::parse_from(["pokedex", "region", "12", "alola"]);
        assert_eq!(cli.command.player(), Some(12));

        let cli = Cli::parse_from(["pokedex", "leaderboard", "--public"]);
        assert_eq!(cli.command.player(), None);
    }

    #[test]
    fn test_cli_rejects_mixed_target() {
        let result = Cli::try_parse_from([
            "pokedex",
            "see",
            "1",
            "--global-id",
            "25",
            "--region",
            "kanto",
            "--regional-id",
            "25",
        ]);
        assert!(result.is_err());
    }
}
