//! Advisor error types.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdvisorError {
    /// A required field was missing or held the wrong type.
    #[error("Malformed observation: {0}")]
    MalformedObservation(String),

    /// Scoring or expansion could not complete for this observation.
    #[error("Prediction failed: {0}")]
    PredictionFailure(String),
}

impl AdvisorError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedObservation(msg.into())
    }

    pub fn failure(msg: impl Into<String>) -> Self {
        Self::PredictionFailure(msg.into())
    }

    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MalformedObservation(_) => {
                "The weather service returned incomplete data. Please try again."
            }
            Self::PredictionFailure(_) => "Recommendations are limited right now.",
        }
    }
}
