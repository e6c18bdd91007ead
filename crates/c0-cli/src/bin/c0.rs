use clap::Parser;
use tracing_subscriber::EnvFilter;

use c0_cli::{Cli, Command, run_build};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("C0_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let exit = match cli.command {
        Command::Build(args) => run_build(&args),
    };
    std::process::exit(exit.code());
}
