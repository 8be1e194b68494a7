//! Result assembly: scoring, expansion and the fallback boundary.

use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};

use crate::advice::AdviceList;
use crate::error::AdvisorError;
use crate::expander::{self, Activities, RuleContext};
use crate::fallback::fallback;
use crate::observation::WeatherObservation;
use crate::scoring::ScoreSet;

/// Complete advice for one observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationBundle {
    pub scores: ScoreSet,
    pub clothing: AdviceList,
    pub items: AdviceList,
    pub activities: Activities,
    pub personalized_tip: String,
}

/// Outcome of a prediction. Both variants carry the same bundle shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    /// Produced by the full rule pipeline
    Primary(RecommendationBundle),
    /// Produced by the fallback policy after the pipeline failed
    Fallback(RecommendationBundle),
}

impl Prediction {
    pub fn bundle(&self) -> &RecommendationBundle {
        match self {
            Self::Primary(bundle) | Self::Fallback(bundle) => bundle,
        }
    }

    pub fn into_bundle(self) -> RecommendationBundle {
        match self {
            Self::Primary(bundle) | Self::Fallback(bundle) => bundle,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// One way of turning an observation into a bundle.
pub trait PredictionPipeline {
    fn run(&self, observation: &WeatherObservation) -> Result<RecommendationBundle, AdvisorError>;
}

impl<F> PredictionPipeline for F
where
    F: Fn(&WeatherObservation) -> Result<RecommendationBundle, AdvisorError>,
{
    fn run(&self, observation: &WeatherObservation) -> Result<RecommendationBundle, AdvisorError> {
        self(observation)
    }
}

/// Scoring followed by the rule-table expander.
#[derive(Debug, Clone, Copy, Default)]
pub struct RulePipeline;

impl PredictionPipeline for RulePipeline {
    fn run(&self, observation: &WeatherObservation) -> Result<RecommendationBundle, AdvisorError> {
        observation.ensure_finite()?;

        let scores = ScoreSet::from_observation(observation);
        let ctx = RuleContext::new(observation, &scores);

        Ok(RecommendationBundle {
            clothing: expander::clothing(&ctx),
            items: expander::items(&ctx),
            activities: expander::activities(&ctx),
            personalized_tip: expander::personalized_tip(&ctx).to_string(),
            scores,
        })
    }
}

/// Entry point for recommendations. Never fails: pipeline errors and panics
/// are logged and answered with the fallback bundle.
#[derive(Debug, Clone, Default)]
pub struct Advisor<P = RulePipeline> {
    pipeline: P,
}

impl Advisor<RulePipeline> {
    pub fn new() -> Self {
        Self {
            pipeline: RulePipeline,
        }
    }
}

impl<P: PredictionPipeline> Advisor<P> {
    pub fn with_pipeline(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn evaluate(&self, observation: &WeatherObservation) -> Prediction {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.pipeline.run(observation)));

        match outcome {
            Ok(Ok(bundle)) => Prediction::Primary(bundle),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Prediction failed, using fallback recommendations");
                Prediction::Fallback(fallback(observation))
            }
            Err(_) => {
                tracing::error!("Prediction pipeline panicked, using fallback recommendations");
                Prediction::Fallback(fallback(observation))
            }
        }
    }

    pub fn predict(&self, observation: &WeatherObservation) -> RecommendationBundle {
        self.evaluate(observation).into_bundle()
    }
}

/// Recommendations from the default rule pipeline.
pub fn predict(observation: &WeatherObservation) -> RecommendationBundle {
    Advisor::new().predict(observation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::ConditionCategory;

    #[test]
    fn test_rule_pipeline_is_primary() {
        let obs = WeatherObservation::new(18.0, 55.0, ConditionCategory::Clouds);
        let prediction = Advisor::new().evaluate(&obs);
        assert!(!prediction.is_fallback());
        assert!(prediction.bundle().items.contains("📱 Phone"));
    }

    #[test]
    fn test_non_finite_observation_falls_back() {
        let obs = WeatherObservation::new(12.0, f64::NAN, ConditionCategory::Rain);
        let prediction = Advisor::new().evaluate(&obs);
        assert!(prediction.is_fallback());
        assert_eq!(prediction.bundle().scores.activity_level, 0.3);
    }

    #[test]
    fn test_pipeline_error_falls_back() {
        let failing = |_: &WeatherObservation| -> Result<RecommendationBundle, AdvisorError> {
            Err(AdvisorError::failure("injected"))
        };
        let obs = WeatherObservation::new(30.0, 40.0, ConditionCategory::Clear);

        let prediction = Advisor::with_pipeline(failing).evaluate(&obs);
        assert!(prediction.is_fallback());
        assert_eq!(prediction.into_bundle().scores.clothing_weight, 0.2);
    }

    #[test]
    fn test_pipeline_panic_falls_back() {
        let panicking = |_: &WeatherObservation| -> Result<RecommendationBundle, AdvisorError> {
            panic!("injected fault")
        };
        let obs = WeatherObservation::new(5.0, 40.0, ConditionCategory::Clear);

        let bundle = Advisor::with_pipeline(panicking).predict(&obs);
        assert!(!bundle.clothing.is_empty());
        assert!(!bundle.personalized_tip.is_empty());
    }
}
