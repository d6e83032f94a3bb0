//! Subcommand implementations.

pub mod config;
pub mod connect;
pub mod token;

use crate::cli::{Cli, Command, ConfigAction, TokenAction};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};

/// Dispatch a parsed command line.
///
/// `config path` is answered before the config file is read, so it still
/// works when that file is missing or broken.
pub fn run(cli: Cli) -> CliResult<()> {
    if let Command::Config {
        action: ConfigAction::Path,
    } = cli.command
    {
        return config::path(cli.config.as_deref());
    }

    let config = match cli.config {
        Some(ref path) => CliConfig::load_from(path),
        None => CliConfig::load(),
    }
    .map_err(CliError::Config)?;

    match cli.command {
        Command::Connect { calendar_id } => connect::run(&calendar_id, &config),
        Command::Token { action } => match action {
            TokenAction::Path => token::path(&config),
            TokenAction::Show => token::show(&config),
        },
        Command::Config { action } => match action {
            ConfigAction::Dump => config::dump(&config),
            ConfigAction::Validate => config::validate(&config),
            ConfigAction::Path => config::path(cli.config.as_deref()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;

    fn broken_config() -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "application_name = [unterminated").unwrap();
        let path = path.to_string_lossy().into_owned();
        (dir, path)
    }

    #[test]
    fn config_path_ignores_broken_config_file() {
        let (_dir, path) = broken_config();
        let cli =
            Cli::try_parse_from(["calfactory", "--config", path.as_str(), "config", "path"])
                .unwrap();
        assert!(run(cli).is_ok());
    }

    #[test]
    fn config_path_with_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let cli = Cli::try_parse_from([
            "calfactory",
            "--config",
            path.to_str().unwrap(),
            "config",
            "path",
        ])
        .unwrap();
        assert!(run(cli).is_ok());
    }

    #[test]
    fn other_commands_still_reject_broken_config_file() {
        let (_dir, path) = broken_config();
        let cli =
            Cli::try_parse_from(["calfactory", "--config", path.as_str(), "config", "dump"])
                .unwrap();
        assert!(matches!(run(cli), Err(CliError::Config(_))));
    }
}
