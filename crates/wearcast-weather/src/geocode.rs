//! Geocoding: city names to coordinates (Open-Meteo) and coordinates back to
//! human-readable place names (Nominatim / OpenStreetMap). Neither needs an
//! API key.

use crate::types::{Location, WeatherError};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const OPEN_METEO_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1";
pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/reverse";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("Wearcast/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Option<Vec<SearchResult>>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country_code: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    #[serde(rename = "state_district")]
    state_district: Option<String>,
    state: Option<String>,
    county: Option<String>,
    country: Option<String>,
}

/// Resolve a city name to its best-matching location.
pub async fn geocode_city(
    client: &Client,
    base_url: &str,
    city: &str,
) -> Result<Location, WeatherError> {
    let url = format!("{}/search", base_url.trim_end_matches('/'));

    let response = client
        .get(&url)
        .query(&[
            ("name", city),
            ("count", "1"),
            ("language", "en"),
            ("format", "json"),
        ])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(WeatherError::Api {
            status: response.status().as_u16(),
            message: format!("geocoding request for {city:?} failed"),
        });
    }

    let body: SearchResponse = response
        .json()
        .await
        .map_err(|e| WeatherError::Parse(e.to_string()))?;

    let result = body
        .results
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| WeatherError::LocationNotFound(city.to_string()))?;

    tracing::debug!(
        "Geocoded {:?} to {} ({}, {})",
        city,
        result.name,
        result.latitude,
        result.longitude
    );

    Ok(Location {
        latitude: result.latitude,
        longitude: result.longitude,
        city_name: Some(result.name),
        country_code: result.country_code.or(result.country),
    })
}

/// Reverse geocode coordinates to a human-readable place name (e.g. "Seattle, WA").
/// Returns `None` on failure or timeout; the caller can fall back to coordinates.
pub async fn reverse_geocode(location: &Location) -> Option<String> {
    reverse_geocode_with(NOMINATIM_URL, location).await
}

pub async fn reverse_geocode_with(url: &str, location: &Location) -> Option<String> {
    if location.city_name.is_some() {
        return location.city_name.clone();
    }

    let client = match Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to create geocoding client: {}", e);
            return None;
        }
    };

    let url = format!(
        "{}?lat={}&lon={}&format=json&addressdetails=1&layer=address&zoom=10",
        url, location.latitude, location.longitude
    );

    let response = match client.get(&url).send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!("Reverse geocode request failed: {}", e);
            return None;
        }
    };

    if !response.status().is_success() {
        tracing::debug!("Reverse geocode returned status {}", response.status());
        return None;
    }

    let body: NominatimResponse = match response.json().await {
        Ok(b) => b,
        Err(e) => {
            tracing::debug!("Reverse geocode parse error: {}", e);
            return None;
        }
    };

    let addr = body.address?;

    // Capture state/country before the place chain consumes them
    let state = addr.state.clone();
    let country = addr.country.clone();

    // Prefer city > town > village > municipality for the primary place name
    let place = addr
        .city
        .or(addr.town)
        .or(addr.village)
        .or(addr.municipality)
        .or(addr.state_district)
        .or(addr.county)
        .or(addr.state)
        .or(addr.country)?;

    let suffix = state
        .as_deref()
        .filter(|s| !s.is_empty() && *s != place)
        .or_else(|| country.as_deref().filter(|c| !c.is_empty() && *c != place));

    let result = match suffix {
        Some(s) => format!("{}, {}", place, s),
        None => place,
    };

    tracing::info!("Reverse geocoded to: {}", result);
    Some(result)
}
