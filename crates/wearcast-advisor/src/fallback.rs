//! Reduced-fidelity recommendations used when the rule pipeline fails.
//!
//! Only the temperature and the rain flag are consulted, and every comparison
//! is written so that a non-finite temperature still lands in a valid branch.

use crate::advice::AdviceList;
use crate::engine::RecommendationBundle;
use crate::expander::Activities;
use crate::observation::WeatherObservation;
use crate::scoring::ScoreSet;

pub const FALLBACK_TIP: &str = "Have a wonderful day! 😊";

pub fn fallback(observation: &WeatherObservation) -> RecommendationBundle {
    let temp = observation.temperature;
    let raining = observation.is_raining();

    let clothing_weight = if temp < 10.0 {
        0.8
    } else if temp > 25.0 {
        0.2
    } else {
        0.5
    };

    let clothing: AdviceList = if temp < 10.0 {
        ["🧥 Warm jacket", "👖 Long pants"].into_iter().collect()
    } else {
        ["👕 Comfortable clothing"].into_iter().collect()
    };

    let items: AdviceList = if raining {
        ["☔ Umbrella", "💧 Waterproof bag"].into_iter().collect()
    } else {
        ["💧 Water bottle"].into_iter().collect()
    };

    let outdoor: AdviceList = if raining {
        AdviceList::new()
    } else {
        ["🚶 Walking"].into_iter().collect()
    };

    RecommendationBundle {
        scores: ScoreSet {
            clothing_weight,
            activity_level: if raining { 0.3 } else { 0.7 },
            comfort_index: 0.5,
        },
        clothing,
        items,
        activities: Activities {
            outdoor,
            indoor: ["📚 Reading", "🏛️ Museums"].into_iter().collect(),
            tips: ["Have a great day!"].into_iter().collect(),
        },
        personalized_tip: FALLBACK_TIP.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::ConditionCategory;

    #[test]
    fn test_cold_rainy_fallback() {
        let obs = WeatherObservation::new(4.0, 90.0, ConditionCategory::Rain);
        let bundle = fallback(&obs);

        assert_eq!(bundle.scores.clothing_weight, 0.8);
        assert_eq!(bundle.scores.activity_level, 0.3);
        assert_eq!(bundle.scores.comfort_index, 0.5);
        assert!(bundle.clothing.contains("🧥 Warm jacket"));
        assert!(bundle.items.contains("☔ Umbrella"));
        assert!(bundle.activities.outdoor.is_empty());
        assert!(!bundle.activities.indoor.is_empty());
    }

    #[test]
    fn test_warm_dry_fallback() {
        let obs = WeatherObservation::new(28.0, 40.0, ConditionCategory::Clear);
        let bundle = fallback(&obs);

        assert_eq!(bundle.scores.clothing_weight, 0.2);
        assert_eq!(bundle.scores.activity_level, 0.7);
        assert_eq!(bundle.items.as_slice(), &["💧 Water bottle"]);
        assert!(bundle.activities.outdoor.contains("🚶 Walking"));
        assert_eq!(bundle.personalized_tip, FALLBACK_TIP);
    }

    #[test]
    fn test_fallback_survives_non_finite_temperature() {
        let obs = WeatherObservation::new(f64::NAN, f64::INFINITY, ConditionCategory::Unknown);
        let bundle = fallback(&obs);

        assert_eq!(bundle.scores.clothing_weight, 0.5);
        assert!(!bundle.clothing.is_empty());
        assert!(!bundle.items.is_empty());
        assert!(!bundle.activities.is_empty());
        assert!(!bundle.personalized_tip.is_empty());
    }
}
