//! tscflow core library
//!
//! Runs the TypeScript compiler in isolated sessions. Each session compiles
//! into a private temporary directory, relocates the produced files to their
//! final logical locations in memory and cleans up after itself. A shared
//! [`SessionRegistry`] lets callers abort every running session at once.

pub mod collector;
pub mod compiler;
pub mod config;
pub mod error;
pub mod events;
pub mod paths;
pub mod placeholder;
pub mod process;
pub mod registry;
pub mod session;
pub mod sourcemap;
pub mod workspace;

// Re-export commonly used types
pub use compiler::{CompilerCommand, locate, parse_version, query_version};
pub use config::{
    CompilerSwitches, FilterDecision, OptionsFormat, PathFilter, SearchPlace, SessionOptions, discover,
    load_from_file,
};
pub use error::{CompileError, CompileResult, ResultExt};
pub use events::{ChannelObserver, NoopObserver, SessionEvent, SessionObserver, TracingObserver};
pub use process::{OutputLine, ProcessHandle, ProcessRunner, TokioProcessRunner};
pub use registry::{AbortCallback, RunningGuard, SessionRegistry};
pub use session::{
    ArtifactKind, OutputArtifact, Session, SessionOutcome, SessionState, SourceFileRef,
};
