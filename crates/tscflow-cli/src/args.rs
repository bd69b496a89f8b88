//! CLI argument definitions using clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tscflow")]
#[command(about = "Run the TypeScript compiler in isolated, cancellable sessions")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile TypeScript files and write the outputs
    Compile(CompileArgs),

    /// Print the version of the compiler that would be used
    Version {
        /// Explicit compiler path
        #[arg(long, env = "TSCFLOW_TSC")]
        tsc: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct CompileArgs {
    /// Input files
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory the input paths are relative to (defaults to the current directory)
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    /// Destination root for the outputs
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Concatenate all outputs into this file, relative to the destination root
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Module system
    #[arg(long)]
    pub module: Option<String>,

    /// Language target
    #[arg(long)]
    pub target: Option<String>,

    /// Emit source maps
    #[arg(long)]
    pub sourcemap: bool,

    /// Emit declaration files
    #[arg(long)]
    pub declaration: bool,

    /// Reject implicit any
    #[arg(long)]
    pub no_implicit_any: bool,

    /// Strip comments from the output
    #[arg(long)]
    pub remove_comments: bool,

    /// Source root written into source maps
    #[arg(long)]
    pub source_root: Option<String>,

    /// Map root written into source maps
    #[arg(long)]
    pub map_root: Option<String>,

    /// Do not add the tree keeper file
    #[arg(long)]
    pub no_keep_tree: bool,

    /// Explicit compiler path
    #[arg(long, env = "TSCFLOW_TSC")]
    pub tsc: Option<PathBuf>,

    /// Where to look for the compiler when --tsc is not given (cwd, shell)
    #[arg(long, value_delimiter = ',')]
    pub tsc_search: Vec<String>,

    /// Directory for session workspaces
    #[arg(long)]
    pub tmp_dir: Option<PathBuf>,

    /// Options file (JSON, TOML or YAML); defaults to tscflow.* in the current directory
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// List the artifacts instead of writing them
    #[arg(long)]
    pub dry_run: bool,
}
