use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wearcast_advisor::{AdvisorError, WeatherObservation};

/// Geographic location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub city_name: Option<String>,
    pub country_code: Option<String>,
}

impl Location {
    pub fn from_coordinates(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            city_name: None,
            country_code: None,
        }
    }
}

/// Current conditions at one location, already normalized for the advisor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: Location,
    pub observation: WeatherObservation,
    /// WMO weather code as reported by the provider
    pub weather_code: Option<i64>,
    /// Human-readable description of the weather code
    pub description: String,
    /// Wind direction in degrees (0-360, where 0/360 is North)
    pub wind_direction: Option<f64>,
    pub fetched_at: DateTime<Utc>,
}

/// Describe a WMO weather code.
/// See: https://open-meteo.com/en/docs#weathervariables
pub fn describe_weather_code(code: i64) -> &'static str {
    match code {
        0 => "clear sky",
        1 => "mainly clear",
        2 => "partly cloudy",
        3 => "overcast",
        45 => "fog",
        48 => "depositing rime fog",
        51 => "light drizzle",
        53 => "moderate drizzle",
        55 => "dense drizzle",
        56 => "light freezing drizzle",
        57 => "dense freezing drizzle",
        61 => "slight rain",
        63 => "moderate rain",
        65 => "heavy rain",
        66 => "light freezing rain",
        67 => "heavy freezing rain",
        71 => "slight snow",
        73 => "moderate snow",
        75 => "heavy snow",
        77 => "snow grains",
        80 => "slight rain showers",
        81 => "moderate rain showers",
        82 => "violent rain showers",
        85 => "slight snow showers",
        86 => "heavy snow showers",
        95 => "thunderstorm",
        96 => "thunderstorm with slight hail",
        99 => "thunderstorm with heavy hail",
        _ => "unknown conditions",
    }
}

/// Location service errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Location error: {0}")]
    Location(#[from] LocationError),
    #[error("Could not find location for \"{0}\"")]
    LocationNotFound(String),
    #[error("Invalid city name: {0:?}")]
    InvalidCityName(String),
    #[error("Weather API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error(transparent)]
    Observation(#[from] AdvisorError),
}

impl WeatherError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Unable to reach the weather service. Check your connection.".to_string(),
            Self::Location(_) => "Could not get your current location.".to_string(),
            Self::LocationNotFound(city) => {
                format!("Failed to fetch weather data for \"{city}\". Please check the city name.")
            }
            Self::InvalidCityName(_) => "Please enter a valid city name.".to_string(),
            Self::Api { status, .. } if *status >= 500 => {
                "The weather service is having trouble. Please try again later.".to_string()
            }
            Self::Api { .. } | Self::Parse(_) | Self::Observation(_) => {
                "Failed to fetch weather data for your location.".to_string()
            }
        }
    }
}
