//! Configuration file loading for the CLI
//!
//! This module finds and loads the TOML configuration from an explicit
//! path, the local directory or the platform config directory.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};

use easel::config::AppConfig;

use crate::error::CliError;

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (easel/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, CliError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("easel/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "easel", "easel") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load configuration from a TOML file
///
/// # Errors
///
/// Returns error if the file is missing, unreadable or not valid TOML.
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, CliError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(missing(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|err| CliError::Config(err.to_string()))
}

fn missing(path: PathBuf) -> CliError {
    CliError::Config(format!("missing configuration file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use easel::config::Router;
    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_explicit_file_is_loaded() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "[layout]\nrouter = \"manhattan\"\n\n[grid]\nsize = 20.0").expect("written");

        let config = load_config(Some(file.path())).expect("loaded");

        assert_eq!(config.layout().router(), Router::Manhattan);
        assert_eq!(config.grid().size(), 20.0);
        assert!(config.layout().crop_connections());
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = load_config(Some("does/not/exist.toml")).expect_err("missing");
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "[layout\nrouter = ").expect("written");

        let err = load_config(Some(file.path())).expect_err("invalid");
        assert!(matches!(err, CliError::Config(_)));
    }
}
