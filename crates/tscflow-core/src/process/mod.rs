//! External compiler process plumbing
//!
//! [`ProcessRunner`] is the seam between sessions and the operating system:
//! sessions only ever see a [`ProcessHandle`], an ordered stream of output
//! lines plus one exit code. Tests substitute scripted runners here.

mod handle;
mod runner;

pub use handle::{OutputLine, ProcessHandle};
pub use runner::{ProcessRunner, TokioProcessRunner};
