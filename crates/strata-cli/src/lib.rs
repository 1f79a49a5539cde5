//! # strata-cli
//!
//! Command-line tools for Strata bucket routing.
//!
//! ## Commands
//!
//! - `strata plan` - Validate a partition spec and show the task to bucket assignment
//! - `strata route` - Route individual bucket ids to writer tasks
//!
//! ## Configuration
//!
//! - `STRATA_WRITE_PARALLELISM` - Default for `--parallelism`
//! - `STRATA_LOG_FORMAT` - Log output format (`json` or `pretty`)
//! - `RUST_LOG` - Log filter

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
// CLI uses print! macros intentionally
#![allow(clippy::print_stdout)]

pub mod commands;

use clap::{Parser, Subcommand};
use strata_core::LogFormat;

/// Strata CLI - bucket routing tools for Iceberg sinks.
#[derive(Debug, Parser)]
#[command(name = "strata")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Log output format.
    #[arg(long, global = true, env = "STRATA_LOG_FORMAT", default_value = "pretty")]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate a partition spec and print the bucket assignment.
    Plan(commands::plan::PlanArgs),
    /// Route bucket ids to writer tasks.
    Route(commands::route::RouteArgs),
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_plan() {
        let cli = Cli::parse_from([
            "strata",
            "--format",
            "json",
            "--log-format",
            "json",
            "plan",
            "--spec",
            "spec.json",
            "--parallelism",
            "30",
        ]);

        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.log_format, LogFormat::Json);
        let Commands::Plan(args) = cli.command else {
            panic!("expected plan command");
        };
        assert_eq!(args.parallelism, 30);
    }

    #[test]
    fn test_cli_parses_negative_bucket_ids() {
        let cli = Cli::parse_from([
            "strata",
            "route",
            "--spec",
            "spec.json",
            "--parallelism",
            "4",
            "3",
            "-1",
            "null",
        ]);

        assert_eq!(cli.format, OutputFormat::Text);
        let Commands::Route(args) = cli.command else {
            panic!("expected route command");
        };
        assert_eq!(args.bucket_ids, vec!["3", "-1", "null"]);
    }
}
