//! Error types for tscflow
//!
//! Every failure a compilation session can hit is a [`CompileError`] variant.
//! Variants carry a stable error code and a precedence rank so that a session
//! which hit several problems reports exactly one of them.

mod constructors;
mod context;
mod types;

pub use types::{CompileError, CompileResult, ResultExt};
