//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "c0", about = "The Cursive 0 bootstrap compiler", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the project found at (or above) the given path.
    Build(BuildArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EmitIrArg {
    Ll,
    Bc,
    None,
}

#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Project path; defaults to the current directory.
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Override the manifest's IR emission mode.
    #[arg(long = "emit-ir", value_enum)]
    pub emit_ir: Option<EmitIrArg>,

    /// Print diagnostics as JSON.
    #[arg(long)]
    pub json: bool,

    /// Record spec-trace rule firings.
    #[arg(long = "trace-spec")]
    pub trace_spec: bool,
}
