//! The `c0` command-line driver.

pub mod args;
pub use args::{BuildArgs, Cli, Command, EmitIrArg};

pub mod driver;
pub use driver::{ExitCode, run_build};
