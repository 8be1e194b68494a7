use std::path::{Path, PathBuf};

use crate::error::{AppError, ConfigError};
use crate::preferences::{PreferenceStore, Preferences};
use crate::Config;

/// Application state and lifecycle manager
pub struct App {
    config: Config,
    store: PreferenceStore,
    preferences: Preferences,
}

impl App {
    /// Load config and preferences from the default config directory,
    /// or from the directory of an explicit config file.
    pub fn new(config_path: Option<&Path>) -> Result<Self, AppError> {
        let config = match config_path {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        }
        .map_err(|e| ConfigError::ParseError(format!("{:#}", e)))?;

        let validation = config.validate();
        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }
        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        let dir = match config_path.and_then(Path::parent) {
            Some(parent) => parent.to_path_buf(),
            None => Config::config_dir()?,
        };

        Ok(Self::with_parts(config, &dir))
    }

    /// Build from an already loaded config, storing preferences in `dir`.
    pub fn with_parts(config: Config, dir: &Path) -> Self {
        let store = PreferenceStore::in_dir(dir);
        let preferences = store.load();

        tracing::info!(
            "Application initialized (last location: {})",
            preferences.last_location
        );

        Self {
            config,
            store,
            preferences,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.store.path().to_path_buf()
    }

    /// Remember `city` as the last looked-up location and persist it.
    pub fn remember_location(&mut self, city: &str) -> Result<(), AppError> {
        self.preferences.last_location = city.to_string();
        self.store.save(&mut self.preferences)?;
        Ok(())
    }

    /// Persist preferences; failures are logged, not returned.
    pub fn shutdown(&mut self) {
        tracing::info!("Shutting down application");

        if let Err(e) = self.store.save(&mut self.preferences) {
            tracing::error!("Error saving preferences on shutdown: {}", e);
        }
    }
}
