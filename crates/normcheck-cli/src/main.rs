//! Normcheck CLI: the `normcheck` command.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Check { verbose: true, .. });
    init_logging(verbose);

    match cli.command {
        Commands::Check {
            snapshot,
            profile,
            json,
            verbose: _,
        } => commands::check::run(snapshot, profile, json),

        Commands::Profile => commands::profile::run(),
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
