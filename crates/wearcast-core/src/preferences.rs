//! User preferences persisted as JSON next to the config file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PreferencesError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// City of the last successful lookup
    pub last_location: String,
    pub units: String,
    pub auto_location: bool,
    pub theme: String,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            last_location: "London".to_string(),
            units: "metric".to_string(),
            auto_location: true,
            theme: "auto".to_string(),
            last_updated: None,
        }
    }
}

/// File-backed preference storage
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store inside the given config directory
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("preferences.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load preferences, falling back to defaults when the file is missing
    /// or unreadable.
    pub fn load(&self) -> Preferences {
        match self.try_load() {
            Ok(Some(prefs)) => prefs,
            Ok(None) => Preferences::default(),
            Err(e) => {
                tracing::warn!("{}; using default preferences", e);
                Preferences::default()
            }
        }
    }

    fn try_load(&self) -> Result<Option<Preferences>, PreferencesError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json =
            fs::read_to_string(&self.path).map_err(|e| PreferencesError::Read(e.to_string()))?;

        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| PreferencesError::Read(e.to_string()))
    }

    /// Write preferences, stamping `last_updated`.
    pub fn save(&self, prefs: &mut Preferences) -> Result<(), PreferencesError> {
        prefs.last_updated = Some(Utc::now());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| PreferencesError::Write(e.to_string()))?;
        }

        let json =
            serde_json::to_string_pretty(prefs).map_err(|e| PreferencesError::Write(e.to_string()))?;

        fs::write(&self.path, json).map_err(|e| PreferencesError::Write(e.to_string()))?;

        tracing::debug!("Saved preferences to {:?}", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::in_dir(dir.path());

        let prefs = store.load();
        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.last_location, "London");
        assert_eq!(prefs.units, "metric");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::in_dir(&dir.path().join("wearcast"));

        let mut prefs = Preferences {
            last_location: "Reykjavik".to_string(),
            ..Default::default()
        };
        store.save(&mut prefs).unwrap();
        assert!(prefs.last_updated.is_some());

        let loaded = store.load();
        assert_eq!(loaded.last_location, "Reykjavik");
        assert_eq!(loaded.last_updated, prefs.last_updated);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::in_dir(dir.path());
        fs::write(store.path(), "{ not json").unwrap();

        assert_eq!(store.load(), Preferences::default());
    }

    #[test]
    fn test_partial_file_keeps_known_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::in_dir(dir.path());
        fs::write(store.path(), r#"{ "last_location": "Cairo", "theme": "dark" }"#).unwrap();

        let prefs = store.load();
        assert_eq!(prefs.last_location, "Cairo");
        assert_eq!(prefs.theme, "dark");
        assert!(prefs.auto_location);
    }
}
