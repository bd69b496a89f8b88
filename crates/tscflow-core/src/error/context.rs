//! Context management for CompileError

use super::types::CompileError;

impl CompileError {
    /// Attach a context string to the variants that carry one.
    ///
    /// Variants without a context slot fold it into their message.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let ctx = context.into();
        match &mut self {
            Self::Config { context: c, .. } => *c = Some(ctx),
            Self::Workspace { message, .. }
            | Self::Placeholder { message, .. }
            | Self::ProcessSpawn { message, .. }
            | Self::Collection { message, .. }
            | Self::Locate { message }
            | Self::Io { message } => *message = format!("{}: {}", ctx, message),
            Self::ProcessExit { .. } | Self::Aborted => {}
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_lands_in_message() {
        let err = CompileError::locate("searched [Cwd]").with_context("resolving compiler");
        assert_eq!(
            err.to_string(),
            "Can't locate `tsc` command: resolving compiler: searched [Cwd]"
        );

        let err = CompileError::config("bad").with_context("loading tscflow.json");
        assert!(matches!(
            err,
            CompileError::Config { context: Some(ref c), .. } if c == "loading tscflow.json"
        ));
        assert_eq!(CompileError::Aborted.with_context("ignored"), CompileError::Aborted);
    }
}
