//! Tutor configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{AppError, TutorConfig};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "socra.toml";

/// Load `explicit` if given, else `<dir>/socra.toml` when present, else defaults.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<TutorConfig, AppError> {
    let path = match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(AppError::Configuration(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => {
            let candidate: PathBuf = dir.join(DEFAULT_CONFIG_FILE);
            if !candidate.is_file() {
                tracing::debug!(dir = %dir.display(), "no socra.toml found, using defaults");
                return Ok(TutorConfig::default());
            }
            candidate
        }
    };

    let content = fs::read_to_string(&path)?;
    let config = TutorConfig::parse_toml(&content).map_err(|err| match err {
        AppError::InvalidConfig(reason) => {
            AppError::InvalidConfig(format!("{} ({})", reason, path.display()))
        }
        other => other,
    })?;
    tracing::debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}
