use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "normcheck",
    about = "Normcheck: conformance checks for program documentation against ГОСТ ЕСПД",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check a document snapshot against a standards profile
    Check {
        /// Path to the document snapshot JSON
        snapshot: PathBuf,

        /// Standards profile TOML (defaults to the built-in profile)
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,

        /// Log resolution details to stderr
        #[arg(long, short)]
        verbose: bool,
    },

    /// Print the built-in standards profile as TOML
    Profile,
}
