//! Command-line argument definitions for the Easel CLI.
//!
//! [`Args`] is parsed from the command line using [`clap`]. Arguments
//! select the edit script to replay, where the snapshot goes, the
//! configuration file and the logging verbosity.

use clap::Parser;

/// Command-line arguments for the Easel script runner
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the edit script (TOML)
    #[arg(help = "Path to the edit script")]
    pub input: String,

    /// Path to write the snapshot to; printed to stdout if omitted
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
