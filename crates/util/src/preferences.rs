//! User preference persistence for the ImpugnaINE terminal wizard.
//!
//! A tiny JSON-backed store recording lightweight settings such as the
//! preferred theme and whether the progress bar is shown. The file lives in
//! the standard configuration directory (`~/.config/impugna/preferences.json`
//! on most platforms).

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::expand_tilde;

/// Environment variable allowing callers to override the preferences file path.
pub const PREFERENCES_PATH_ENV: &str = "IMPUGNA_PREFERENCES_PATH";

/// Default filename for the JSON payload.
pub const PREFERENCES_FILE_NAME: &str = "preferences.json";

/// Error surfaced when reading or writing preferences fails.
#[derive(Debug, Error)]
pub enum PreferencesError {
    /// I/O failure (for example, permissions or missing directory).
    #[error("preferences I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("preferences serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persisted preference values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencesPayload {
    /// Canonical identifier of the theme selected via the TUI.
    #[serde(default)]
    pub preferred_theme: Option<String>,
    /// Whether the wizard renders the progress bar under the stepper.
    #[serde(default = "default_show_progress")]
    pub show_progress: bool,
}

fn default_show_progress() -> bool {
    true
}

impl Default for PreferencesPayload {
    fn default() -> Self {
        Self {
            preferred_theme: None,
            show_progress: default_show_progress(),
        }
    }
}

/// Preferences store backed by a JSON file.
#[derive(Debug, Default)]
pub struct UserPreferences {
    path: PathBuf,
    payload: Mutex<PreferencesPayload>,
    persist_to_disk: bool,
}

impl UserPreferences {
    /// Opens the store at `IMPUGNA_PREFERENCES_PATH` or the default config path.
    pub fn new() -> Result<Self, PreferencesError> {
        Self::at_path(default_preferences_path())
    }

    /// Opens the store rooted at `path`. A missing or corrupt file yields defaults.
    pub fn at_path(path: PathBuf) -> Result<Self, PreferencesError> {
        let payload = load_payload(&path)?;
        Ok(Self {
            path,
            payload: Mutex::new(payload),
            persist_to_disk: true,
        })
    }

    /// Build an in-memory store used as a fallback when the config directory cannot be accessed.
    pub fn ephemeral() -> Self {
        Self {
            path: PathBuf::new(),
            payload: Mutex::new(PreferencesPayload::default()),
            persist_to_disk: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn preferred_theme(&self) -> Option<String> {
        self.lock().preferred_theme.clone()
    }

    /// Persist a new preferred theme identifier.
    pub fn set_preferred_theme(&self, theme_id: Option<String>) -> Result<(), PreferencesError> {
        self.update(|payload| payload.preferred_theme = theme_id)
    }

    pub fn show_progress(&self) -> bool {
        self.lock().show_progress
    }

    pub fn set_show_progress(&self, show: bool) -> Result<(), PreferencesError> {
        self.update(|payload| payload.show_progress = show)
    }

    fn lock(&self) -> MutexGuard<'_, PreferencesPayload> {
        self.payload.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn update(&self, apply: impl FnOnce(&mut PreferencesPayload)) -> Result<(), PreferencesError> {
        let mut payload = self.lock();
        apply(&mut payload);
        if self.persist_to_disk {
            self.save_locked(&payload)?;
        }
        Ok(())
    }

    fn save_locked(&self, payload: &PreferencesPayload) -> Result<(), PreferencesError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(payload)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

fn default_preferences_path() -> PathBuf {
    if let Ok(path) = env::var(PREFERENCES_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("impugna")
        .join(PREFERENCES_FILE_NAME)
}

fn load_payload(path: &Path) -> Result<PreferencesPayload, PreferencesError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(payload) => Ok(payload),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse preferences file; using defaults"
                );
                Ok(PreferencesPayload::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(PreferencesPayload::default()),
        Err(error) => Err(PreferencesError::Io(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let prefs = UserPreferences::at_path(dir.path().join("preferences.json")).unwrap();
        assert_eq!(prefs.preferred_theme(), None);
        assert!(prefs.show_progress());
    }

    #[test]
    fn settings_round_trip_through_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.json");

        let prefs = UserPreferences::at_path(path.clone()).unwrap();
        prefs.set_preferred_theme(Some("ine_light".into())).unwrap();
        prefs.set_show_progress(false).unwrap();

        let reopened = UserPreferences::at_path(path).unwrap();
        assert_eq!(reopened.preferred_theme().as_deref(), Some("ine_light"));
        assert!(!reopened.show_progress());
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{not json").unwrap();

        let prefs = UserPreferences::at_path(path).unwrap();
        assert_eq!(prefs.lock().clone(), PreferencesPayload::default());
    }

    #[test]
    fn env_override_selects_the_file() {
        temp_env::with_var(PREFERENCES_PATH_ENV, Some("/tmp/impugna/prefs.json"), || {
            assert_eq!(default_preferences_path(), PathBuf::from("/tmp/impugna/prefs.json"));
        });
    }

    #[test]
    fn ephemeral_store_never_touches_disk() {
        let prefs = UserPreferences::ephemeral();
        prefs.set_show_progress(false).unwrap();
        assert!(!prefs.show_progress());
        assert_eq!(prefs.path(), Path::new(""));
    }
}
