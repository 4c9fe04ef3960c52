//! Errors of the CLI.

use std::io;

use thiserror::Error;

use easel::EaselError;

/// Everything that can stop a script run.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse script: {0}")]
    Parse(String),

    /// A step refers to something the script cannot resolve.
    #[error("Step {step} (`{op}`): {reason}")]
    Script {
        step: usize,
        op: &'static str,
        reason: String,
    },

    /// The editing core rejected a step.
    #[error("Step {step} (`{op}`) failed: {source}")]
    Command {
        step: usize,
        op: &'static str,
        #[source]
        source: EaselError,
    },

    #[error("Failed to write snapshot: {0}")]
    Snapshot(String),
}

impl CliError {
    pub fn script(step: usize, op: &'static str, reason: impl Into<String>) -> Self {
        CliError::Script {
            step,
            op,
            reason: reason.into(),
        }
    }
}
