//! `tscflow compile`

use anyhow::{Context, bail};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use tscflow_core::{
    SearchPlace, Session, SessionOptions, SessionRegistry, SessionState, SourceFileRef, discover,
    load_from_file,
};

use crate::args::CompileArgs;
use crate::console::{CliConsole, ConsoleObserver};
use crate::signal_handler::SignalHandler;

pub async fn execute(args: CompileArgs, console: CliConsole) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let options = build_options(&args, &cwd)?;
    let inputs = resolve_inputs(&args, &cwd)?;
    debug!("Compiling {} input(s) with {:?}", inputs.len(), options);

    let registry = SessionRegistry::shared();
    let mut signals = SignalHandler::new(Arc::clone(&registry));
    signals.start().context("Failed to install Ctrl+C handler")?;

    let outcome = Session::new(inputs, options, registry)
        .with_observer(Arc::new(ConsoleObserver::new(console)))
        .compile()
        .await;
    signals.stop();

    if outcome.state == SessionState::Completed {
        for artifact in &outcome.artifacts {
            if args.dry_run {
                println!("{}", artifact.logical_path.display());
            } else {
                artifact.write_to_disk().await?;
                console.info(&format!("wrote {}", artifact.logical_path.display()));
            }
        }
        console.success(&format!("Compiled {} file(s)", outcome.artifacts.len()));
        return Ok(());
    }

    if !outcome.artifacts.is_empty() {
        console.warn(&format!(
            "Discarding {} partial artifact(s)",
            outcome.artifacts.len()
        ));
    }
    match outcome.error {
        Some(error) => Err(error.into()),
        None => bail!("session ended as {}", outcome.state),
    }
}

/// Options file (explicit or discovered in `cwd`) first, then command-line overrides
fn build_options(args: &CompileArgs, cwd: &Path) -> anyhow::Result<SessionOptions> {
    let file = args.config.clone().or_else(|| discover(cwd));
    let mut options = match &file {
        Some(path) => {
            debug!("Loading options from {}", path.display());
            load_from_file(path)?
        }
        None => SessionOptions::default(),
    };

    if let Some(tsc) = &args.tsc {
        options.tsc_path = Some(tsc.clone());
    }
    if !args.tsc_search.is_empty() {
        let places = args
            .tsc_search
            .iter()
            .map(|name| SearchPlace::parse(name))
            .collect::<Result<Vec<_>, _>>()?;
        options.tsc_search = Some(places);
    }
    if let Some(module) = &args.module {
        options.module = module.clone();
    }
    if let Some(target) = &args.target {
        options.target = target.clone();
    }
    if let Some(out_dir) = &args.out_dir {
        options.out_dir = Some(out_dir.clone());
    }
    if let Some(out) = &args.out {
        options.out = Some(out.clone());
    }
    if let Some(tmp_dir) = &args.tmp_dir {
        options.tmp_dir = Some(tmp_dir.clone());
    }
    if args.source_root.is_some() {
        options.source_root = args.source_root.clone();
    }
    if args.map_root.is_some() {
        options.map_root = args.map_root.clone();
    }
    if args.no_keep_tree {
        options.keep_tree = false;
    }

    let switches = &mut options.switches;
    switches.sourcemap |= args.sourcemap;
    switches.declaration |= args.declaration;
    switches.no_implicit_any |= args.no_implicit_any;
    switches.remove_comments |= args.remove_comments;

    options.validate()?;
    Ok(options)
}

fn absolute(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

fn resolve_inputs(args: &CompileArgs, cwd: &Path) -> anyhow::Result<Vec<SourceFileRef>> {
    let base = absolute(args.base_dir.as_deref().unwrap_or(cwd), cwd);
    args.inputs
        .iter()
        .map(|input| {
            let path = absolute(input, cwd);
            SourceFileRef::from_base(&path, &base).with_context(|| {
                format!("{} is not inside {}", path.display(), base.display())
            })
        })
        .collect()
}
