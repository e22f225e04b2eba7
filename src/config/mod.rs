//! Configuration module for cse-rs
//!
//! Handles loading and validating settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable pointing at a settings file
pub const SETTINGS_PATH_ENV: &str = "CSE_SETTINGS_PATH";

/// Default locations searched for a settings file, in order
pub fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("cse.yml"), PathBuf::from("config/cse.yml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("cse-rs/cse.yml"));
    }
    paths
}

/// Load settings from an explicit path, `CSE_SETTINGS_PATH`, the default
/// locations, or fall back to defaults. Environment overrides are applied
/// last and the result is validated.
pub fn load(explicit: Option<&Path>) -> Result<Settings, SettingsError> {
    let mut settings = match locate(explicit) {
        Some(path) => {
            info!("Loading settings from: {}", path.display());
            Settings::from_file(&path)?
        }
        None => Settings::default(),
    };
    settings.merge_env();
    settings.validate()?;
    Ok(settings)
}

fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
    // An explicit path must exist; from_file reports it otherwise
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(SETTINGS_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    default_paths().into_iter().find(|p| p.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yml");

        let err = load(Some(&missing)).unwrap_err();
        assert!(matches!(err, SettingsError::Read { .. }));
    }

    #[test]
    fn test_explicit_path_is_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cse.yml");
        std::fs::write(&path, "quota:\n  daily_limit: 0\n").unwrap();

        let err = load(Some(&path)).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { key: "quota.daily_limit", .. }));
    }
}
