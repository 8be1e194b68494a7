//! Canonical weather observation and the normalizer that builds it from a
//! provider payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AdvisorError;

/// Visibility assumed when the provider does not report one (meters).
pub const DEFAULT_VISIBILITY_M: f64 = 10_000.0;

/// Sea-level standard pressure, used when the provider omits pressure (hPa).
pub const STANDARD_PRESSURE_HPA: f64 = 1013.25;

const TEMPERATURE_KEYS: &[&str] = &["temperature_2m", "temperature", "temp"];
const HUMIDITY_KEYS: &[&str] = &["relative_humidity_2m", "humidity"];
const WIND_SPEED_KEYS: &[&str] = &["wind_speed_10m", "wind_speed"];
const PRESSURE_KEYS: &[&str] = &["surface_pressure", "pressure_msl", "pressure"];
const VISIBILITY_KEYS: &[&str] = &["visibility"];
const CONDITION_KEYS: &[&str] = &["weather_code", "condition", "main"];

/// Provider label keywords, checked in order after an exact match fails.
const LABEL_KEYWORDS: &[(&str, ConditionCategory)] = &[
    ("thunder", ConditionCategory::Thunderstorm),
    ("drizzle", ConditionCategory::Drizzle),
    ("snow", ConditionCategory::Snow),
    ("sleet", ConditionCategory::Snow),
    ("rain", ConditionCategory::Rain),
    ("shower", ConditionCategory::Rain),
    ("fog", ConditionCategory::Mist),
    ("mist", ConditionCategory::Mist),
    ("haze", ConditionCategory::Mist),
    ("cloud", ConditionCategory::Clouds),
    ("overcast", ConditionCategory::Clouds),
    ("clear", ConditionCategory::Clear),
    ("sun", ConditionCategory::Clear),
];

/// Canonical condition categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConditionCategory {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Snow,
    Mist,
    Thunderstorm,
    #[default]
    Unknown,
}

impl ConditionCategory {
    /// Convert a WMO weather code (as reported by Open-Meteo).
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: i64) -> Self {
        match code {
            0 | 1 => Self::Clear,
            2 | 3 => Self::Clouds,
            45 | 48 => Self::Mist,
            51 | 53 | 55 | 56 | 57 => Self::Drizzle,
            61 | 63 | 65 | 66 | 67 | 80 | 81 | 82 => Self::Rain,
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snow,
            95 | 96 | 99 => Self::Thunderstorm,
            _ => Self::Unknown,
        }
    }

    /// Convert a provider condition label such as "Clouds" or "light rain".
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        let exact = match label.as_str() {
            "clear" => Some(Self::Clear),
            "clouds" => Some(Self::Clouds),
            "rain" => Some(Self::Rain),
            "drizzle" => Some(Self::Drizzle),
            "snow" => Some(Self::Snow),
            "mist" | "fog" => Some(Self::Mist),
            "thunderstorm" => Some(Self::Thunderstorm),
            _ => None,
        };

        exact.unwrap_or_else(|| {
            LABEL_KEYWORDS
                .iter()
                .find(|(keyword, _)| label.contains(keyword))
                .map(|(_, category)| *category)
                .unwrap_or(Self::Unknown)
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::Clouds => "Clouds",
            Self::Rain => "Rain",
            Self::Drizzle => "Drizzle",
            Self::Snow => "Snow",
            Self::Mist => "Mist",
            Self::Thunderstorm => "Thunderstorm",
            Self::Unknown => "Unknown",
        }
    }

    /// Emoji shown next to the current conditions.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Clear => "☀️",
            Self::Clouds => "☁️",
            Self::Rain => "🌧️",
            Self::Drizzle => "🌦️",
            Self::Thunderstorm => "⛈️",
            Self::Snow => "❄️",
            Self::Mist => "🌫️",
            Self::Unknown => "🌤️",
        }
    }
}

/// A normalized snapshot of the weather at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    /// Temperature in Celsius
    pub temperature: f64,
    /// Relative humidity, 0-100
    pub humidity: f64,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Pressure in hPa
    pub pressure: f64,
    pub condition: ConditionCategory,
    /// Visibility in meters
    pub visibility: f64,
}

impl WeatherObservation {
    /// Observation with calm wind, standard pressure and default visibility.
    pub fn new(temperature: f64, humidity: f64, condition: ConditionCategory) -> Self {
        Self {
            temperature,
            humidity,
            wind_speed: 0.0,
            pressure: STANDARD_PRESSURE_HPA,
            condition,
            visibility: DEFAULT_VISIBILITY_M,
        }
    }

    pub fn with_wind_speed(mut self, wind_speed: f64) -> Self {
        self.wind_speed = wind_speed;
        self
    }

    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = pressure;
        self
    }

    pub fn with_visibility(mut self, visibility: f64) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn is_raining(&self) -> bool {
        self.condition == ConditionCategory::Rain
    }

    pub fn is_snowing(&self) -> bool {
        self.condition == ConditionCategory::Snow
    }

    pub fn is_cloudy(&self) -> bool {
        self.condition == ConditionCategory::Clouds
    }

    /// Rejects non-finite measurements, which no threshold rule can classify.
    pub fn ensure_finite(&self) -> Result<(), AdvisorError> {
        let fields = [
            ("temperature", self.temperature),
            ("humidity", self.humidity),
            ("wind speed", self.wind_speed),
            ("pressure", self.pressure),
            ("visibility", self.visibility),
        ];

        match fields.iter().find(|(_, value)| !value.is_finite()) {
            Some((name, value)) => Err(AdvisorError::failure(format!(
                "{name} is not a finite number ({value})"
            ))),
            None => Ok(()),
        }
    }
}

/// Build a [`WeatherObservation`] from a provider payload.
///
/// Accepts the Open-Meteo `current` block as well as flat payloads using plain
/// field names. Temperature, humidity and condition are required; wind speed,
/// pressure and visibility fall back to defaults.
pub fn normalize(payload: &Value) -> Result<WeatherObservation, AdvisorError> {
    let fields = payload
        .as_object()
        .ok_or_else(|| AdvisorError::malformed("payload is not a JSON object"))?;

    let temperature = required_number(fields, "temperature", TEMPERATURE_KEYS)?;
    let humidity = required_number(fields, "humidity", HUMIDITY_KEYS)?;
    let condition = condition(fields)?;
    let wind_speed = optional_number(fields, "wind speed", WIND_SPEED_KEYS)?.unwrap_or(0.0);
    let pressure =
        optional_number(fields, "pressure", PRESSURE_KEYS)?.unwrap_or(STANDARD_PRESSURE_HPA);
    let visibility =
        optional_number(fields, "visibility", VISIBILITY_KEYS)?.unwrap_or(DEFAULT_VISIBILITY_M);

    if !(0.0..=100.0).contains(&humidity) {
        return Err(AdvisorError::malformed(format!(
            "humidity must be within 0-100, got {humidity}"
        )));
    }
    if wind_speed < 0.0 {
        return Err(AdvisorError::malformed(format!(
            "wind speed cannot be negative, got {wind_speed}"
        )));
    }
    if visibility < 0.0 {
        return Err(AdvisorError::malformed(format!(
            "visibility cannot be negative, got {visibility}"
        )));
    }

    Ok(WeatherObservation {
        temperature,
        humidity,
        wind_speed,
        pressure,
        condition,
        visibility,
    })
}

fn lookup<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .find(|value| !value.is_null())
}

fn optional_number(
    fields: &Map<String, Value>,
    name: &str,
    keys: &[&str],
) -> Result<Option<f64>, AdvisorError> {
    match lookup(fields, keys) {
        None => Ok(None),
        Some(value) => value.as_f64().map(Some).ok_or_else(|| {
            AdvisorError::malformed(format!("{name} must be numeric, got {value}"))
        }),
    }
}

fn required_number(
    fields: &Map<String, Value>,
    name: &str,
    keys: &[&str],
) -> Result<f64, AdvisorError> {
    optional_number(fields, name, keys)?
        .ok_or_else(|| AdvisorError::malformed(format!("missing required field: {name}")))
}

fn condition(fields: &Map<String, Value>) -> Result<ConditionCategory, AdvisorError> {
    match lookup(fields, CONDITION_KEYS) {
        None => Err(AdvisorError::malformed("missing required field: condition")),
        Some(Value::Number(code)) => Ok(code
            .as_i64()
            .map(ConditionCategory::from_wmo_code)
            .unwrap_or(ConditionCategory::Unknown)),
        Some(Value::String(label)) => Ok(ConditionCategory::from_label(label)),
        Some(other) => Err(AdvisorError::malformed(format!(
            "condition must be a code or label, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wmo_code_table() {
        assert_eq!(ConditionCategory::from_wmo_code(0), ConditionCategory::Clear);
        assert_eq!(ConditionCategory::from_wmo_code(1), ConditionCategory::Clear);
        assert_eq!(ConditionCategory::from_wmo_code(2), ConditionCategory::Clouds);
        assert_eq!(ConditionCategory::from_wmo_code(3), ConditionCategory::Clouds);
        assert_eq!(ConditionCategory::from_wmo_code(48), ConditionCategory::Mist);
        assert_eq!(ConditionCategory::from_wmo_code(57), ConditionCategory::Drizzle);
        assert_eq!(ConditionCategory::from_wmo_code(66), ConditionCategory::Rain);
        assert_eq!(ConditionCategory::from_wmo_code(82), ConditionCategory::Rain);
        assert_eq!(ConditionCategory::from_wmo_code(77), ConditionCategory::Snow);
        assert_eq!(ConditionCategory::from_wmo_code(86), ConditionCategory::Snow);
        assert_eq!(ConditionCategory::from_wmo_code(99), ConditionCategory::Thunderstorm);
    }

    #[test]
    fn test_unknown_wmo_code_is_not_an_error() {
        assert_eq!(ConditionCategory::from_wmo_code(4), ConditionCategory::Unknown);
        assert_eq!(ConditionCategory::from_wmo_code(-1), ConditionCategory::Unknown);
    }

    #[test]
    fn test_labels() {
        assert_eq!(ConditionCategory::from_label("Clouds"), ConditionCategory::Clouds);
        assert_eq!(ConditionCategory::from_label("  FOG "), ConditionCategory::Mist);
        assert_eq!(ConditionCategory::from_label("light rain"), ConditionCategory::Rain);
        assert_eq!(
            ConditionCategory::from_label("light freezing drizzle"),
            ConditionCategory::Drizzle
        );
        assert_eq!(
            ConditionCategory::from_label("thunderstorm with heavy rain"),
            ConditionCategory::Thunderstorm
        );
        assert_eq!(ConditionCategory::from_label("volcanic ash"), ConditionCategory::Unknown);
    }

    #[test]
    fn test_derived_flags() {
        let rain = WeatherObservation::new(12.0, 70.0, ConditionCategory::Rain);
        assert!(rain.is_raining());
        assert!(!rain.is_snowing());

        let drizzle = WeatherObservation::new(12.0, 70.0, ConditionCategory::Drizzle);
        assert!(!drizzle.is_raining());

        let clouds = WeatherObservation::new(12.0, 70.0, ConditionCategory::Clouds);
        assert!(clouds.is_cloudy());
    }

    #[test]
    fn test_normalize_open_meteo_current_block() {
        let payload = json!({
            "time": "2026-10-16T12:00",
            "temperature_2m": 18.4,
            "relative_humidity_2m": 62,
            "wind_speed_10m": 3.2,
            "wind_direction_10m": 240,
            "weather_code": 61,
            "surface_pressure": 1008.5
        });

        let obs = normalize(&payload).unwrap();
        assert_eq!(obs.temperature, 18.4);
        assert_eq!(obs.humidity, 62.0);
        assert_eq!(obs.wind_speed, 3.2);
        assert_eq!(obs.pressure, 1008.5);
        assert_eq!(obs.condition, ConditionCategory::Rain);
        assert_eq!(obs.visibility, DEFAULT_VISIBILITY_M);
    }

    #[test]
    fn test_normalize_defaults_optional_fields() {
        let payload = json!({ "temperature": 5, "humidity": 40, "condition": "Snow" });

        let obs = normalize(&payload).unwrap();
        assert_eq!(obs.wind_speed, 0.0);
        assert_eq!(obs.visibility, DEFAULT_VISIBILITY_M);
        assert_eq!(obs.pressure, STANDARD_PRESSURE_HPA);
        assert!(obs.is_snowing());
    }

    #[test]
    fn test_normalize_null_optional_field_uses_default() {
        let payload = json!({
            "temperature": 5,
            "humidity": 40,
            "condition": "Clear",
            "visibility": null
        });

        assert_eq!(normalize(&payload).unwrap().visibility, DEFAULT_VISIBILITY_M);
    }

    #[test]
    fn test_normalize_missing_required_field() {
        let payload = json!({ "humidity": 40, "condition": "Clear" });
        let err = normalize(&payload).unwrap_err();
        assert!(matches!(err, AdvisorError::MalformedObservation(_)));
        assert!(err.to_string().contains("temperature"));

        let payload = json!({ "temperature": 10, "humidity": 40 });
        let err = normalize(&payload).unwrap_err();
        assert!(err.to_string().contains("condition"));
    }

    #[test]
    fn test_normalize_non_numeric_field() {
        let payload = json!({ "temperature": "warm", "humidity": 40, "condition": 0 });
        let err = normalize(&payload).unwrap_err();
        assert!(err.to_string().contains("temperature must be numeric"));

        let payload = json!({
            "temperature": 10,
            "humidity": 40,
            "condition": 0,
            "wind_speed": "breezy"
        });
        assert!(normalize(&payload).is_err());
    }

    #[test]
    fn test_normalize_rejects_out_of_range_values() {
        let payload = json!({ "temperature": 10, "humidity": 140, "condition": 0 });
        assert!(normalize(&payload).is_err());

        let payload = json!({
            "temperature": 10,
            "humidity": 40,
            "condition": 0,
            "wind_speed": -2
        });
        assert!(normalize(&payload).is_err());
    }

    #[test]
    fn test_normalize_unrecognized_condition() {
        let payload = json!({ "temperature": 10, "humidity": 40, "condition": 1234 });
        assert_eq!(normalize(&payload).unwrap().condition, ConditionCategory::Unknown);

        let payload = json!({ "temperature": 10, "humidity": 40, "condition": true });
        assert!(normalize(&payload).is_err());
    }

    #[test]
    fn test_normalize_rejects_non_object() {
        assert!(normalize(&json!([1, 2, 3])).is_err());
    }

    #[test]
    fn test_ensure_finite() {
        let obs = WeatherObservation::new(10.0, 50.0, ConditionCategory::Clear);
        assert!(obs.ensure_finite().is_ok());

        let obs = WeatherObservation::new(f64::NAN, 50.0, ConditionCategory::Clear);
        let err = obs.ensure_finite().unwrap_err();
        assert!(matches!(err, AdvisorError::PredictionFailure(_)));
        assert!(err.to_string().contains("temperature"));
    }
}
