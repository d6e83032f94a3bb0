//! The `connect` command.

use tracing::info;

use calfactory::GoogleCalendarFactory;

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};

/// Bootstraps credentials and binds `calendar_id`.
///
/// Prompts on the terminal the first time; afterwards the token cache is
/// used and refreshed as needed.
pub fn run(calendar_id: &str, config: &CliConfig) -> CliResult<()> {
    let factory_config = config.to_factory_config().map_err(CliError::Config)?;
    let mut factory = GoogleCalendarFactory::google(factory_config)?;

    let handle = factory.create_for_calendar_id(calendar_id)?;
    info!("calendar {} ready", handle.calendar_id());

    println!("Calendar: {}", handle.calendar_id());
    println!("Events:   {}", handle.events_url());
    Ok(())
}
