//! tscflow command-line interface
//!
//! Compiles TypeScript files through an isolated compiler session and writes
//! the relocated outputs to disk.
//!
//! ```bash
//! tscflow compile src/app.ts src/lib/util.ts --base-dir src --out-dir build
//! tscflow version
//! ```
//!
//! Set `RUST_LOG=debug` (or pass `--verbose`) for session tracing.

mod args;
mod commands;
mod console;
mod router;
mod signal_handler;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub use args::{Cli, Commands, CompileArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    router::route(cli).await
}
