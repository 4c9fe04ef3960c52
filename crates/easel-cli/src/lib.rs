//! Easel CLI library
//!
//! Replays an edit script against a [`Modeler`] and writes a snapshot of
//! the resulting element graph.

pub mod error_adapter;
pub mod script;

mod args;
mod config;
mod error;

pub use args::Args;
pub use error::CliError;

use std::{fs, io::Write};

use log::info;

use easel::{Modeler, config::AppConfig};

use script::{Runner, Script, Snapshot};

/// Run the Easel CLI application
///
/// Loads the configuration, replays the script named by `args.input` and
/// writes the snapshot to `args.output`, or to stdout.
///
/// # Errors
///
/// Returns `CliError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Script parsing errors
/// - Steps the editing core rejects
pub fn run(args: &Args) -> Result<(), CliError> {
    info!(input_path = args.input; "Replaying script");

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;
    let script = Script::parse(&source)?;

    let snapshot = replay(app_config, &script)?;
    let rendered = snapshot.to_toml()?;

    match &args.output {
        Some(output) => {
            fs::write(output, rendered)?;
            info!(output_file = output.as_str(); "Snapshot written");
        }
        None => std::io::stdout().write_all(rendered.as_bytes())?,
    }

    Ok(())
}

/// Replays `script` against a fresh modeler and captures the result.
///
/// # Errors
///
/// Any error of the modeler setup or of a step.
pub fn replay(app_config: AppConfig, script: &Script) -> Result<Snapshot, CliError> {
    let modeler = Modeler::builder(app_config)
        .build()
        .map_err(|err| CliError::Config(err.to_string()))?;
    let mut runner = Runner::new(modeler);
    runner.run(script)?;
    Ok(Snapshot::capture(&runner))
}
