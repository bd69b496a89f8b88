//! Compiler version query

use once_cell::sync::Lazy;
use regex::Regex;
use std::ffi::OsString;
use tracing::debug;

use super::locate::CompilerCommand;
use crate::process::{OutputLine, ProcessRunner};

static VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Version (\d+(?:\.\d+)+)").expect("valid regex"));

/// Extract the dotted version from the compiler banner
pub fn parse_version(banner: &str) -> Option<String> {
    VERSION
        .captures(banner)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Run the compiler with `-v` and parse its banner.
///
/// Spawn failures and unparseable banners yield `None`.
pub async fn query_version(runner: &dyn ProcessRunner, command: &CompilerCommand) -> Option<String> {
    let handle = match runner.spawn(command, &[OsString::from("-v")]).await {
        Ok(handle) => handle,
        Err(e) => {
            debug!("Version query failed: {}", e);
            return None;
        }
    };
    let (lines, _) = handle.collect().await.ok()?;
    let banner: Vec<&str> = lines
        .iter()
        .filter(|l| matches!(l, OutputLine::Stdout(_)))
        .map(OutputLine::text)
        .collect();
    parse_version(&banner.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CompileError, CompileResult};
    use crate::process::ProcessHandle;
    use async_trait::async_trait;

    struct Banner(Option<&'static str>);

    #[async_trait]
    impl ProcessRunner for Banner {
        async fn spawn(&self, command: &CompilerCommand, _args: &[OsString]) -> CompileResult<ProcessHandle> {
            match self.0 {
                Some(text) => Ok(ProcessHandle::finished(
                    vec![OutputLine::Stdout(text.to_string())],
                    0,
                )),
                None => Err(CompileError::process_spawn(&command.program, "not found")),
            }
        }
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("Version 12.34.56.78\n"), Some("12.34.56.78".to_string()));
        assert_eq!(parse_version("Version 5.4.2"), Some("5.4.2".to_string()));
        assert_eq!(parse_version("garbage"), None);
    }

    #[tokio::test]
    async fn test_query_version() {
        let command = CompilerCommand::for_path("/bin/tsc.exe");
        assert_eq!(
            query_version(&Banner(Some("Version 1.0.1.0")), &command).await,
            Some("1.0.1.0".to_string())
        );
        assert_eq!(query_version(&Banner(Some("hello")), &command).await, None);
        assert_eq!(query_version(&Banner(None), &command).await, None);
    }
}
