//! Threshold scoring: clothing weight, activity level and comfort index.
//!
//! Each score starts from a base value, takes additive or overriding
//! adjustments, and is clamped to [0, 1].

use serde::{Deserialize, Serialize};

use crate::observation::WeatherObservation;

/// Temperature bands for the base clothing weight, as (exclusive upper bound, weight).
const CLOTHING_BANDS: &[(f64, f64)] = &[
    (-10.0, 1.0),
    (0.0, 0.9),
    (10.0, 0.7),
    (20.0, 0.5),
    (30.0, 0.3),
];
const CLOTHING_HOT_WEIGHT: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSet {
    pub clothing_weight: f64,
    pub activity_level: f64,
    pub comfort_index: f64,
}

impl ScoreSet {
    pub fn from_observation(obs: &WeatherObservation) -> Self {
        Self {
            clothing_weight: clothing_weight(
                obs.temperature,
                obs.wind_speed,
                obs.is_raining(),
                obs.is_snowing(),
            ),
            activity_level: activity_level(
                obs.temperature,
                obs.is_raining(),
                obs.wind_speed,
                obs.visibility,
            ),
            comfort_index: comfort_index(
                obs.temperature,
                obs.humidity,
                obs.wind_speed,
                obs.pressure,
            ),
        }
    }
}

fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// How heavily to dress, 0 (lightest) to 1 (heaviest).
pub fn clothing_weight(temp: f64, wind_speed: f64, is_raining: bool, is_snowing: bool) -> f64 {
    let mut weight = CLOTHING_BANDS
        .iter()
        .find(|(upper, _)| temp < *upper)
        .map(|(_, weight)| *weight)
        .unwrap_or(CLOTHING_HOT_WEIGHT);

    if is_snowing {
        weight = weight.max(0.8);
    }
    if is_raining {
        weight += 0.1;
    }
    // Both wind bonuses stack above 25 m/s.
    if wind_speed > 15.0 {
        weight += 0.1;
    }
    if wind_speed > 25.0 {
        weight += 0.1;
    }

    clamp_unit(weight)
}

/// Suitability for outdoor activity, 0 (stay in) to 1 (ideal).
pub fn activity_level(temp: f64, is_raining: bool, wind_speed: f64, visibility: f64) -> f64 {
    let mut level = 0.7;

    if is_raining {
        level -= 0.4;
    }
    if wind_speed > 20.0 {
        level -= 0.3;
    }
    if visibility < 5000.0 {
        level -= 0.2;
    }
    if temp < -5.0 || temp > 35.0 {
        level -= 0.3;
    }

    // Ideal conditions win over every penalty.
    if (15.0..=25.0).contains(&temp) && !is_raining && wind_speed < 10.0 {
        level = 1.0;
    }

    clamp_unit(level)
}

/// Overall comfort, 0 (miserable) to 1 (perfect).
pub fn comfort_index(temp: f64, humidity: f64, wind_speed: f64, pressure: f64) -> f64 {
    let temperature_term = if (18.0..=24.0).contains(&temp) {
        0.3
    } else if (15.0..=27.0).contains(&temp) {
        0.1
    } else if temp < 5.0 || temp > 30.0 {
        -0.2
    } else {
        0.0
    };

    let humidity_term = if (40.0..=60.0).contains(&humidity) {
        0.2
    } else if humidity > 80.0 {
        -0.2
    } else if humidity < 30.0 {
        -0.1
    } else {
        0.0
    };

    let wind_term = if (5.0..=15.0).contains(&wind_speed) {
        0.1
    } else if wind_speed > 25.0 {
        -0.2
    } else {
        0.0
    };

    let pressure_term = if (993.0..=1033.0).contains(&pressure) {
        0.1
    } else {
        -0.1
    };

    clamp_unit(0.5 + temperature_term + humidity_term + wind_term + pressure_term)
}
