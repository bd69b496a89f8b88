//! Session configuration
//!
//! [`SessionOptions`] is the immutable record a session is built from. It can
//! be deserialized from JSON, TOML or YAML files via [`load_from_file`], and
//! [`discover`] finds a `tscflow.*` file in a directory.

mod file_loader;
mod options;
mod path_filter;

pub use file_loader::{OPTIONS_FILE_NAMES, OptionsFormat, discover, load_from_file};
pub use options::{CompilerSwitches, SearchPlace, SessionOptions};
pub use path_filter::{FilterDecision, PathFilter};
