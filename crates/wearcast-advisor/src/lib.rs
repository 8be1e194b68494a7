//! Weather-to-advice engine for Wearcast
//!
//! Normalizes a provider payload into a [`WeatherObservation`], scores it,
//! and expands the scores through fixed rule tables into clothing, items,
//! activities and a personalized tip. [`predict`] never fails: when the rule
//! pipeline errors it answers with a reduced fallback bundle.

pub mod advice;
pub mod engine;
pub mod error;
pub mod expander;
pub mod fallback;
pub mod observation;
pub mod scoring;

pub use advice::AdviceList;
pub use engine::{predict, Advisor, Prediction, PredictionPipeline, RecommendationBundle, RulePipeline};
pub use error::AdvisorError;
pub use expander::Activities;
pub use fallback::fallback;
pub use observation::{normalize, ConditionCategory, WeatherObservation};
pub use scoring::ScoreSet;
