use anyhow::Result;
use clap::Parser;
use cukereport::cli::{Command, RootArgs};
use cukereport::workflow;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_logging();
    let args = RootArgs::parse();
    match args.command {
        Command::Summarize(args) => workflow::run_summarize(args),
        Command::Inspect(args) => workflow::run_inspect(args),
    }
}

/// `RUST_LOG` overrides the default `info` filter; logs go to stderr so
/// `inspect` output stays machine-readable.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
