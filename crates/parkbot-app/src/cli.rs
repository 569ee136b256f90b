//! CLI argument definitions for the Parkbot application.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

/// Parkbot - a conversational assistant for amusement park visitors.
#[derive(Parser, Debug)]
#[command(name = "parkbot", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Data directory holding the SQLite database.
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    /// Keep everything in memory; nothing is written to disk.
    #[arg(long = "in-memory", global = true)]
    pub in_memory: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands. Without one, an interactive chat is started.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Chat with the assistant, one line per turn.
    Chat {
        /// Conversation owner.
        #[arg(short = 'u', long = "user", default_value = "guest")]
        user: String,
    },
    /// Print a user's chat history.
    History {
        #[arg(short = 'u', long = "user")]
        user: String,

        /// Only the latest messages, newest first.
        #[arg(long = "recent")]
        recent: bool,
    },
    /// List the ride catalog grouped by category.
    Rides {
        /// Only rides in this category (case-insensitive).
        #[arg(long = "category")]
        category: Option<String>,
    },
    /// List the ticket types and their prices.
    Tickets {
        /// Show a single ticket type.
        #[arg(long = "id")]
        id: Option<Uuid>,
    },
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > PARKBOT_CONFIG env var > ~/.parkbot/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("PARKBOT_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the data directory override, if any.
    pub fn resolve_data_dir(&self) -> Option<String> {
        self.data_dir
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > PARKBOT_LOG env var > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        if let Some(ref level) = self.log_level {
            return level.clone();
        }
        if let Ok(level) = std::env::var("PARKBOT_LOG") {
            if !level.trim().is_empty() {
                return level;
            }
        }
        config_level.to_string()
    }

    /// The subcommand to run, defaulting to a chat as "guest".
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat {
            user: "guest".to_string(),
        })
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".parkbot").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".parkbot").join("config.toml");
    }
    PathBuf::from("config.toml")
}
