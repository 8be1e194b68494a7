//! Terminal and JSON rendering of a finished lookup.

use serde::Serialize;
use wearcast_advisor::{AdviceList, RecommendationBundle};
use wearcast_weather::{format_location_name, WeatherReport};

use crate::session::Snapshot;

/// Capitalize the first letter of every word: "light rain" -> "Light Rain".
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn location_line(snapshot: &Snapshot) -> String {
    let name = format_location_name(Some(&snapshot.report.location));
    if snapshot.searched {
        format!("📍 {name}")
    } else {
        format!("📍 Current Location: {name}")
    }
}

fn conditions(report: &WeatherReport) -> String {
    let obs = &report.observation;
    format!(
        "{} {}°C  {}\nHumidity {}%   Wind {} m/s   Pressure {} hPa",
        obs.condition.icon(),
        obs.temperature.round(),
        title_case(&report.description),
        obs.humidity.round(),
        obs.wind_speed.round(),
        obs.pressure.round(),
    )
}

fn section(out: &mut String, title: &str, entries: &AdviceList) {
    if entries.is_empty() {
        return;
    }
    out.push_str(&format!("\n{title}\n"));
    for entry in entries.iter() {
        out.push_str(&format!("  • {entry}\n"));
    }
}

/// Human-readable report.
pub fn text(snapshot: &Snapshot) -> String {
    let bundle = &snapshot.bundle;
    let mut out = format!(
        "{}\n{}\n",
        location_line(snapshot),
        conditions(&snapshot.report)
    );

    section(&mut out, "👕 What to Wear", &bundle.clothing);
    section(&mut out, "🎒 What to Bring", &bundle.items);
    section(&mut out, "🌞 Outdoor Activities", &bundle.activities.outdoor);
    section(&mut out, "🏠 Indoor Activities", &bundle.activities.indoor);
    section(&mut out, "💡 Tips", &bundle.activities.tips);

    out.push_str(&format!("\n{}\n", bundle.personalized_tip));
    if snapshot.degraded {
        out.push_str("(simplified advice; detailed recommendations were unavailable)\n");
    }

    out
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    location: String,
    weather: &'a WeatherReport,
    recommendations: &'a RecommendationBundle,
    degraded: bool,
}

/// The snapshot as pretty-printed JSON.
pub fn json(snapshot: &Snapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonOutput {
        location: format_location_name(Some(&snapshot.report.location)),
        weather: &snapshot.report,
        recommendations: &snapshot.bundle,
        degraded: snapshot.degraded,
    })
}
