//! The compiler as an external collaborator: where it lives, how it is
//! invoked and which version it reports.

mod args;
mod locate;
mod version;

pub use args::build_arguments;
pub use locate::{CompilerCommand, locate};
pub use version::{parse_version, query_version};
