//! Current-location lookup and location display helpers.
//!
//! Geolocation uses an IP lookup service and is always time-bounded.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::types::{Location, LocationError};

pub const IP_GEOLOCATION_URL: &str = "https://ipapi.co/json/";
pub const DEFAULT_GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(5);

const MIN_CITY_NAME_LEN: usize = 2;
const MAX_CITY_NAME_LEN: usize = 50;

#[derive(Debug, Deserialize)]
struct IpLocationResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
    country_code: Option<String>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Geolocator {
    client: Client,
    url: String,
    timeout: Duration,
}

impl Geolocator {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            timeout,
        }
    }

    /// Resolve the current position, giving up after the configured timeout.
    pub async fn locate(&self) -> Result<Location, LocationError> {
        match tokio::time::timeout(self.timeout, self.request()).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("Geolocation timed out after {:?}", self.timeout);
                Err(LocationError::Timeout)
            }
        }
    }

    async fn request(&self) -> Result<Location, LocationError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| LocationError::Other(e.to_string()))?;

        match response.status() {
            StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
                return Err(LocationError::PermissionDenied)
            }
            status if !status.is_success() => return Err(LocationError::ServiceUnavailable),
            _ => {}
        }

        let body: IpLocationResponse = response
            .json()
            .await
            .map_err(|e| LocationError::Other(e.to_string()))?;

        if body.error {
            return Err(LocationError::Other(
                body.reason.unwrap_or_else(|| "lookup refused".to_string()),
            ));
        }

        match (body.latitude, body.longitude) {
            (Some(latitude), Some(longitude)) => {
                tracing::info!("Got location: {}, {}", latitude, longitude);
                Ok(Location {
                    latitude,
                    longitude,
                    city_name: body.city.filter(|c| !c.is_empty()),
                    country_code: body.country_code,
                })
            }
            _ => Err(LocationError::Other("response had no coordinates".to_string())),
        }
    }
}

impl Default for Geolocator {
    fn default() -> Self {
        Self::new(IP_GEOLOCATION_URL, DEFAULT_GEOLOCATION_TIMEOUT)
    }
}

/// Check a user-entered city name: 2-50 characters after trimming, made of
/// letters, spaces, hyphens and apostrophes.
pub fn is_valid_city_name(name: &str) -> bool {
    let trimmed = name.trim();
    let len = trimmed.chars().count();

    (MIN_CITY_NAME_LEN..=MAX_CITY_NAME_LEN).contains(&len)
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c.is_whitespace() || c == '-' || c == '\'')
}

/// "City, CC" for display, or just the city when no country is known.
pub fn format_location_name(location: Option<&Location>) -> String {
    let Some(city) = location.and_then(|l| l.city_name.as_deref()) else {
        return "Unknown Location".to_string();
    };

    match location.and_then(|l| l.country_code.as_deref()) {
        Some(country) if !country.is_empty() => format!("{city}, {country}"),
        _ => city.to_string(),
    }
}
