//! Wearcast: current weather with clothing, item and activity advice.

pub mod render;
pub mod session;

pub use session::{Lookup, Snapshot, WeatherSession};
