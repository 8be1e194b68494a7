use crate::geocode::{self, OPEN_METEO_GEOCODING_URL};
use crate::types::{describe_weather_code, Location, WeatherError, WeatherReport};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub const OPEN_METEO_FORECAST_URL: &str = "https://api.open-meteo.com/v1";

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m,\
wind_direction_10m,weather_code,surface_pressure,visibility";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<Value>,
}

/// Fetches current conditions from Open-Meteo.
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    forecast_url: String,
    geocoding_url: String,
}

impl WeatherProvider {
    pub fn new(timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            forecast_url: OPEN_METEO_FORECAST_URL.to_string(),
            geocoding_url: OPEN_METEO_GEOCODING_URL.to_string(),
        })
    }

    /// Point the provider at different API hosts.
    pub fn with_base_urls(
        mut self,
        forecast_url: impl Into<String>,
        geocoding_url: impl Into<String>,
    ) -> Self {
        self.forecast_url = forecast_url.into();
        self.geocoding_url = geocoding_url.into();
        self
    }

    /// Geocode `city` and fetch its current conditions. The name is passed
    /// to the geocoder as-is, so canonical names like "Zürich" round-trip.
    pub async fn current_for_city(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        let location = geocode::geocode_city(&self.client, &self.geocoding_url, city.trim()).await?;
        self.current_at(&location).await
    }

    pub async fn current_at(&self, location: &Location) -> Result<WeatherReport, WeatherError> {
        let url = format!("{}/forecast", self.forecast_url.trim_end_matches('/'));
        let latitude = location.latitude.to_string();
        let longitude = location.longitude.to_string();

        tracing::info!(
            "Fetching current weather for {}, {}",
            location.latitude,
            location.longitude
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current", CURRENT_FIELDS),
                ("wind_speed_unit", "ms"),
                ("timezone", "auto"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("Forecast request failed with {}: {}", status, message);
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ForecastResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;
        let current = body
            .current
            .ok_or_else(|| WeatherError::Parse("response has no current block".to_string()))?;

        let observation = wearcast_advisor::normalize(&current)?;
        let weather_code = current.get("weather_code").and_then(Value::as_i64);
        let description = match weather_code {
            Some(code) => describe_weather_code(code).to_string(),
            None => observation.condition.label().to_lowercase(),
        };

        Ok(WeatherReport {
            location: location.clone(),
            observation,
            weather_code,
            description,
            wind_direction: current.get("wind_direction_10m").and_then(Value::as_f64),
            fetched_at: chrono::Utc::now(),
        })
    }
}
