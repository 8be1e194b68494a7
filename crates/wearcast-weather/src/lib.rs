//! Weather service for Wearcast
//!
//! Provides current conditions via the Open-Meteo API, city geocoding, and a
//! time-bounded IP geolocation lookup.

pub mod types;
pub mod geocode;
pub mod location;
pub mod provider;

pub use types::*;
pub use geocode::reverse_geocode;
pub use location::{format_location_name, is_valid_city_name, Geolocator};
pub use provider::WeatherProvider;
