//! Configuration commands.

use std::path::Path;

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};

/// Dump the current configuration to stdout.
pub fn dump(config: &CliConfig) -> CliResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| CliError::Config(format!("failed to serialize config: {}", e)))?;
    println!("{}", toml_str);
    Ok(())
}

/// Validate the configuration and make sure the client secret loads.
pub fn validate(config: &CliConfig) -> CliResult<()> {
    let factory_config = config.to_factory_config().map_err(CliError::Config)?;
    calfactory::GoogleCalendarFactory::google(factory_config)?;
    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path(explicit: Option<&Path>) -> CliResult<()> {
    match explicit {
        Some(path) => println!("config: {}", path.display()),
        None => println!("config: {}", CliConfig::default_path().display()),
    }
    Ok(())
}
