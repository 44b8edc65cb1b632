//! Command dispatch: bridges CLI args -> monitor workflows -> output.

pub mod config_cmd;
pub mod sites;
pub mod util;
pub mod watch;

use sitewatch_core::{HttpMonitor, MonitorConfig};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    monitor: &HttpMonitor,
    mc: &MonitorConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Sites(args) => sites::handle(monitor, args, global).await,
        Command::Watch(args) => watch::handle(monitor, mc, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "command does not need a backend connection".into(),
        )),
    }
}
