pub mod app;
pub mod config;
pub mod error;
pub mod preferences;

pub use app::App;
pub use config::{Config, LocationConfig, LoggingConfig, ValidationResult, WeatherConfig};
pub use error::{AppError, ConfigError, NetworkError, PreferencesError, ReqwestErrorExt};
pub use preferences::{PreferenceStore, Preferences};

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initialize logging. `RUST_LOG` takes precedence over `level`.
pub fn init(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("Wearcast core initialized");
    Ok(())
}
