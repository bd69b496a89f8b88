//! `tscflow version`

use anyhow::bail;
use std::path::PathBuf;
use tscflow_core::{SessionOptions, TokioProcessRunner, locate, query_version};

use crate::console::CliConsole;

pub async fn execute(tsc: Option<PathBuf>, console: CliConsole) -> anyhow::Result<()> {
    let options = SessionOptions {
        tsc_path: tsc,
        ..Default::default()
    };
    let command = locate(&options)?;
    console.info(&format!("using {}", command.script().display()));

    match query_version(&TokioProcessRunner::new(), &command).await {
        Some(version) => {
            println!("{}", version);
            Ok(())
        }
        None => bail!("could not read a version from {}", command.script().display()),
    }
}
