//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// calfactory - authorize and bind a Google Calendar
#[derive(Debug, Parser)]
#[command(name = "calfactory")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, global = true, env = "CALFACTORY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Authorize if needed, refresh if expired, and bind a calendar
    Connect {
        /// Calendar identifier, e.g. `primary` or `team@group.calendar.google.com`
        calendar_id: String,
    },

    /// Token cache commands
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Token cache actions.
#[derive(Debug, Subcommand)]
pub enum TokenAction {
    /// Show the resolved token cache path
    Path,

    /// Show the cached token status without contacting Google
    Show,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration and load the client secret
    Validate,

    /// Show configuration file path
    Path,
}
