//! Strata CLI - bucket routing tools for Iceberg sinks.
//!
//! The main entry point for the `strata` CLI binary.

use anyhow::Result;
use clap::Parser;

use strata_cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    strata_core::init_logging(cli.log_format);

    match &cli.command {
        Commands::Plan(args) => strata_cli::commands::plan::execute(args, cli.format),
        Commands::Route(args) => strata_cli::commands::route::execute(args, cli.format),
    }
}
