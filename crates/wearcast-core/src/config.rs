use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub location: LocationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Endpoints and timeouts for the weather collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub forecast_url: String,
    pub geocoding_url: String,
    pub reverse_geocoding_url: String,
    pub geolocation_url: String,

    /// Timeout for forecast and geocoding requests, in seconds
    pub request_timeout_secs: u64,

    /// Upper bound on a current-location lookup, in seconds
    pub geolocation_timeout_secs: u64,
}

impl WeatherConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_secs(self.geolocation_timeout_secs)
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            forecast_url: wearcast_weather::provider::OPEN_METEO_FORECAST_URL.to_string(),
            geocoding_url: wearcast_weather::geocode::OPEN_METEO_GEOCODING_URL.to_string(),
            reverse_geocoding_url: wearcast_weather::geocode::NOMINATIM_URL.to_string(),
            geolocation_url: wearcast_weather::location::IP_GEOLOCATION_URL.to_string(),
            request_timeout_secs: 10,
            geolocation_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// City used when neither geolocation nor a saved location is available
    pub default_city: String,

    /// Try the current location on startup
    pub auto_locate: bool,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            default_city: "London".to_string(),
            auto_locate: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when RUST_LOG is not set
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there on first use
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!("Created default config at {:?}", path);
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        let urls = [
            (&self.weather.forecast_url, "weather.forecast_url"),
            (&self.weather.geocoding_url, "weather.geocoding_url"),
            (&self.weather.reverse_geocoding_url, "weather.reverse_geocoding_url"),
            (&self.weather.geolocation_url, "weather.geolocation_url"),
        ];
        for (url, field) in urls {
            validate_url(url, field, &mut result);
        }

        if self.weather.request_timeout_secs == 0 {
            result.add_error("weather.request_timeout_secs", "Timeout must be greater than 0");
        } else if self.weather.request_timeout_secs > 120 {
            result.add_warning(
                "weather.request_timeout_secs",
                "Request timeout is unusually long (>120s)",
            );
        }

        if self.weather.geolocation_timeout_secs == 0 {
            result.add_error(
                "weather.geolocation_timeout_secs",
                "Timeout must be greater than 0",
            );
        }

        if !wearcast_weather::is_valid_city_name(&self.location.default_city) {
            result.add_error(
                "location.default_city",
                format!("Not a valid city name: {:?}", self.location.default_city),
            );
        }

        if tracing_subscriber::EnvFilter::try_new(&self.logging.level).is_err() {
            result.add_warning(
                "logging.level",
                format!("Unrecognized filter {:?}, using info", self.logging.level),
            );
        }

        result
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Directory holding config.toml and preferences.json
    pub fn config_dir() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Failed to get config directory")?
            .join("wearcast"))
    }

    fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}

fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
    match Url::parse(url_str) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                result.add_error(
                    field_name,
                    format!("URL must use http or https scheme, got: {}", url.scheme()),
                );
            }

            if url.host().is_none() {
                result.add_error(field_name, "URL must have a host");
            }

            if url.port() == Some(0) {
                result.add_error(field_name, "Port cannot be 0");
            }
        }
        Err(e) => {
            result.add_error(field_name, format!("Invalid URL: {}", e));
        }
    }
}
