//! Command-line construction from session options

use std::ffi::OsString;
use std::path::Path;

use crate::config::SessionOptions;
use crate::session::SourceFileRef;

/// Build the compiler arguments for one session.
///
/// Output always lands in `workspace`: either as the single `--out` file or
/// below `--outDir`. The tree keeper, when present, is appended last.
pub fn build_arguments(
    options: &SessionOptions,
    inputs: &[SourceFileRef],
    workspace: &Path,
    placeholder: Option<&Path>,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    let mut flag = |name: &str, value: Option<OsString>| {
        args.push(OsString::from(name));
        if let Some(value) = value {
            args.push(value);
        }
    };

    if !options.module.is_empty() {
        flag("--module", Some(options.module.to_lowercase().into()));
    }
    if !options.target.is_empty() {
        flag("--target", Some(options.target.to_uppercase().into()));
    }
    match &options.out {
        Some(out) => flag("--out", Some(workspace.join(out).into_os_string())),
        None => flag("--outDir", Some(workspace.as_os_str().to_os_string())),
    }
    if let Some(map_root) = &options.map_root {
        flag("--mapRoot", Some(map_root.into()));
    }
    if let Some(source_root) = &options.source_root {
        flag("--sourceRoot", Some(source_root.into()));
    }

    let switches = &options.switches;
    for (enabled, name) in [
        (switches.allow_bool, "--allowbool"),
        (switches.allow_import_module, "--allowimportmodule"),
        (switches.declaration, "--declaration"),
        (switches.no_implicit_any, "--noImplicitAny"),
        (switches.no_resolve, "--noResolve"),
        (switches.remove_comments, "--removeComments"),
        (switches.sourcemap, "--sourcemap"),
    ] {
        if enabled {
            flag(name, None);
        }
    }

    args.extend(options.additional_args.iter().map(OsString::from));
    args.extend(inputs.iter().map(|f| f.absolute_path.clone().into_os_string()));
    if let Some(placeholder) = placeholder {
        args.push(placeholder.as_os_str().to_os_string());
    }
    args
}
