//! Settings persistence
//!
//! Saves and loads [`SessionSettings`] to/from a JSON file.
//!
//! # File Location
//!
//! Settings are stored in `settings.json` in the user's configuration
//! directory (e.g. `~/.config/fenboard/settings.json`), or in the working
//! directory when no configuration directory can be determined.
//!
//! # Error Handling
//!
//! - [`load_settings`] never fails: missing or invalid files fall back to
//!   defaults with a warning
//! - [`read_settings`] and [`save_settings`] report [`CoreError`]s for callers
//!   that need to know

use crate::core::error::CoreResult;
use crate::core::settings::SessionSettings;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Settings filename
const SETTINGS_FILENAME: &str = "settings.json";

/// Path to `settings.json` in the user's configuration directory
pub fn settings_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "trilltino", "fenboard") {
        proj_dirs.config_dir().join(SETTINGS_FILENAME)
    } else {
        PathBuf::from(SETTINGS_FILENAME)
    }
}

/// Read and validate settings from `path`
pub fn read_settings(path: &Path) -> CoreResult<SessionSettings> {
    let contents = fs::read_to_string(path)?;
    let settings: SessionSettings = serde_json::from_str(&contents)?;
    settings.validate()?;
    Ok(settings)
}

/// Load settings, falling back to defaults on any problem
///
/// `path` overrides the default location (e.g. from `--settings`).
pub fn load_settings(path: Option<&Path>) -> SessionSettings {
    let settings_path = path.map(Path::to_path_buf).unwrap_or_else(settings_path);

    if !settings_path.exists() {
        info!(
            "[SETTINGS] No settings file found at {:?}. Using defaults.",
            settings_path
        );
        return SessionSettings::default();
    }

    match read_settings(&settings_path) {
        Ok(settings) => {
            info!("[SETTINGS] Loaded settings from {:?}", settings_path);
            settings
        }
        Err(e) => {
            warn!(
                "[SETTINGS] Failed to load settings file at {:?}: {}. Using defaults.",
                settings_path, e
            );
            SessionSettings::default()
        }
    }
}

/// Write settings to `path` as pretty JSON, creating the directory if needed
pub fn save_settings(settings: &SessionSettings, path: &Path) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    info!("[SETTINGS] Saved settings to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::ai::AIDifficulty;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("fenboard-{}-{}", uuid::Uuid::new_v4(), name))
    }

    #[test]
    fn test_save_then_read_settings() {
        //! Settings written to disk read back identically
        let path = temp_path("settings.json");
        let settings = SessionSettings {
            difficulty: AIDifficulty::Hard,
            engine_path: None,
            ..SessionSettings::default()
        };
        save_settings(&settings, &path).unwrap();
        assert_eq!(read_settings(&path).unwrap(), settings);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        //! No file is not an error
        let path = temp_path("missing.json");
        assert_eq!(load_settings(Some(&path)), SessionSettings::default());
    }

    #[test]
    fn test_malformed_file_loads_defaults() {
        //! Garbage falls back to defaults instead of failing
        let path = temp_path("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(read_settings(&path).is_err());
        assert_eq!(load_settings(Some(&path)), SessionSettings::default());
        let _ = fs::remove_file(&path);
    }
}
