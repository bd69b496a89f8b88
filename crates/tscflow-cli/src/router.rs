//! Command routing logic for CLI

use crate::args::{Cli, Commands};
use crate::commands;
use crate::console::CliConsole;

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli) -> anyhow::Result<()> {
    let console = CliConsole::new(cli.verbose);
    match cli.command {
        Commands::Compile(args) => commands::compile::execute(args, console).await,
        Commands::Version { tsc } => commands::version::execute(tsc, console).await,
    }
}
