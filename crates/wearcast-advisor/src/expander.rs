//! Rule tables that expand an observation and its scores into advice.
//!
//! Every cascade is a static table of rows evaluated top to bottom, so the
//! order of a table is its precedence.

use serde::{Deserialize, Serialize};

use crate::advice::AdviceList;
use crate::observation::WeatherObservation;
use crate::scoring::ScoreSet;

/// Inputs visible to every rule predicate.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub observation: &'a WeatherObservation,
    pub scores: &'a ScoreSet,
}

impl<'a> RuleContext<'a> {
    pub fn new(observation: &'a WeatherObservation, scores: &'a ScoreSet) -> Self {
        Self {
            observation,
            scores,
        }
    }

    fn temp(&self) -> f64 {
        self.observation.temperature
    }

    fn wind(&self) -> f64 {
        self.observation.wind_speed
    }
}

type Predicate = fn(&RuleContext<'_>) -> bool;

/// Additive rule: when `applies` holds, every entry of `advice` is inserted.
struct AdviceRule {
    name: &'static str,
    applies: Predicate,
    advice: &'static [&'static str],
}

struct ActivityRule {
    name: &'static str,
    applies: Predicate,
    outdoor: &'static [&'static str],
    tips: &'static [&'static str],
}

struct ActivityTier {
    /// Selected when the activity level is strictly above this value.
    above: f64,
    outdoor: &'static [&'static str],
    indoor: &'static [&'static str],
}

struct TipRule {
    name: &'static str,
    applies: Predicate,
    tip: &'static str,
}

// Clothing tiers by temperature, as (inclusive upper bound, base items).
const CLOTHING_TIERS: &[(f64, &[&str])] = &[
    (
        -10.0,
        &[
            "🧥 Heavy winter coat",
            "🧤 Insulated gloves",
            "👢 Winter boots",
            "🧣 Warm scarf",
            "🎿 Thermal underwear",
        ],
    ),
    (
        0.0,
        &["🧥 Winter jacket", "🧤 Gloves", "👢 Warm boots", "🧣 Scarf"],
    ),
    (
        10.0,
        &[
            "🧥 Warm jacket or coat",
            "👖 Long pants",
            "👟 Closed shoes",
            "🧣 Light scarf (optional)",
        ],
    ),
    (
        20.0,
        &[
            "👕 Light sweater or cardigan",
            "👖 Long pants or jeans",
            "👟 Comfortable shoes",
        ],
    ),
    (
        30.0,
        &[
            "👕 T-shirt or light shirt",
            "🩳 Shorts or light pants",
            "👟 Breathable shoes",
        ],
    ),
];

const HOT_CLOTHING: &[&str] = &[
    "👕 Lightweight, breathable clothing",
    "🩳 Shorts",
    "🩴 Sandals or breathable shoes",
    "👒 Sun hat",
];

const CLOTHING_RULES: &[AdviceRule] = &[
    AdviceRule {
        name: "rain",
        applies: |ctx| ctx.observation.is_raining(),
        advice: &["☔ Waterproof jacket or raincoat", "👢 Waterproof shoes or rain boots"],
    },
    AdviceRule {
        name: "snow",
        applies: |ctx| ctx.observation.is_snowing(),
        advice: &["❄️ Waterproof outer layer", "👢 Non-slip winter boots"],
    },
    AdviceRule {
        name: "wind",
        applies: |ctx| ctx.wind() > 15.0,
        advice: &["🌬️ Windbreaker or wind-resistant jacket", "👒 Secure hat or cap"],
    },
    AdviceRule {
        name: "sun",
        applies: |ctx| ctx.temp() > 25.0,
        advice: &["🕶️ Sunglasses", "👒 Sun protection hat"],
    },
];

const BASELINE_ITEMS: &[&str] = &["📱 Phone", "💳 Wallet", "🔑 Keys"];

const ITEM_RULES: &[AdviceRule] = &[
    AdviceRule {
        name: "rain",
        applies: |ctx| ctx.observation.is_raining(),
        advice: &["☔ Umbrella", "💧 Waterproof bag cover", "🧻 Tissues"],
    },
    AdviceRule {
        name: "snow",
        applies: |ctx| ctx.observation.is_snowing(),
        advice: &["🧤 Extra gloves", "🧻 Tissues"],
    },
    AdviceRule {
        name: "heat",
        applies: |ctx| ctx.temp() > 25.0,
        advice: &["🧴 Sunscreen (SPF 30+)", "💧 Water bottle", "🕶️ Sunglasses"],
    },
    AdviceRule {
        name: "cold",
        applies: |ctx| ctx.temp() < 5.0,
        advice: &["🔥 Hand warmers", "☕ Thermos with hot drink"],
    },
    AdviceRule {
        name: "humid",
        applies: |ctx| ctx.observation.humidity > 80.0,
        advice: &["🧻 Extra tissues", "💧 Dehumidifying packets"],
    },
    AdviceRule {
        name: "wind",
        applies: |ctx| ctx.wind() > 20.0,
        advice: &["🎯 Secure bag or backpack"],
    },
    AdviceRule {
        name: "health",
        applies: |ctx| ctx.temp() < 10.0 || ctx.observation.humidity > 70.0,
        advice: &["💊 Hand sanitizer"],
    },
];

const ACTIVITY_TIERS: &[ActivityTier] = &[
    ActivityTier {
        above: 0.8,
        outdoor: &[
            "🚶 Walking or hiking",
            "🚴 Cycling",
            "🏃 Jogging or running",
            "🏐 Outdoor sports",
            "📸 Photography walk",
            "🧺 Picnic in the park",
            "🌳 Nature exploration",
        ],
        indoor: &[],
    },
    ActivityTier {
        above: 0.5,
        outdoor: &["🚶 Light walking", "☕ Outdoor café visits", "🛍️ Outdoor markets"],
        indoor: &["🏛️ Museums", "🛍️ Shopping centers"],
    },
];

const INDOOR_ACTIVITIES: &[&str] = &[
    "🏛️ Museums and galleries",
    "📚 Libraries",
    "🛍️ Indoor shopping",
    "🎬 Movie theaters",
    "🎮 Gaming centers",
    "☕ Cozy cafés",
    "🍽️ Indoor dining",
];

const ACTIVITY_RULES: &[ActivityRule] = &[
    ActivityRule {
        name: "snow",
        applies: |ctx| ctx.observation.is_snowing() && ctx.temp() > -10.0,
        outdoor: &["⛄ Snow activities (if you enjoy winter sports)"],
        tips: &[],
    },
    ActivityRule {
        name: "heat",
        applies: |ctx| ctx.temp() > 30.0,
        outdoor: &["🏊 Swimming", "🌊 Water sports"],
        tips: &["Stay hydrated and seek shade frequently"],
    },
    ActivityRule {
        name: "freezing",
        applies: |ctx| ctx.temp() < 0.0,
        outdoor: &[],
        tips: &["Limit outdoor exposure, dress warmly"],
    },
    ActivityRule {
        name: "gale",
        applies: |ctx| ctx.wind() > 25.0,
        outdoor: &[],
        tips: &["Avoid activities with loose items outdoors"],
    },
    ActivityRule {
        name: "low visibility",
        applies: |ctx| ctx.observation.visibility < 5000.0,
        outdoor: &[],
        tips: &["Be extra careful if driving or walking outdoors"],
    },
];

const TIP_RULES: &[TipRule] = &[
    TipRule {
        name: "snow",
        applies: |ctx| ctx.observation.is_snowing(),
        tip: "❄️ Snow day! Perfect for cozy indoor activities with hot cocoa.",
    },
    TipRule {
        name: "high comfort",
        applies: |ctx| ctx.scores.comfort_index > 0.8,
        tip: "🌟 Perfect weather conditions! Great time to enjoy outdoor activities and get some fresh air.",
    },
    TipRule {
        name: "low comfort",
        applies: |ctx| ctx.scores.comfort_index < 0.3,
        tip: "🏠 Weather conditions are challenging today. Stay comfortable indoors and take care of yourself.",
    },
    TipRule {
        name: "active",
        applies: |ctx| ctx.scores.activity_level > 0.7,
        tip: "🏃 Excellent weather for being active! Don't forget to stay hydrated and enjoy the outdoors.",
    },
    TipRule {
        name: "hot",
        applies: |ctx| ctx.temp() > 30.0,
        tip: "🌞 Hot day ahead! Seek shade, wear light colors, and drink plenty of water.",
    },
    TipRule {
        name: "cold",
        applies: |ctx| ctx.temp() < 5.0,
        tip: "🧥 Bundle up today! Layer your clothing and keep extremities warm.",
    },
    TipRule {
        name: "rain",
        applies: |ctx| ctx.observation.is_raining(),
        tip: "☔ Rainy day vibes! Perfect for indoor activities or a cozy walk with an umbrella.",
    },
    TipRule {
        name: "windy",
        applies: |ctx| ctx.wind() > 20.0,
        tip: "🌬️ Windy conditions today! Secure loose items and dress in wind-resistant clothing.",
    },
];

pub const DEFAULT_TIP: &str = "😊 Have a wonderful day! Check the weather again if conditions change.";

/// Activity suggestions split by setting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activities {
    pub outdoor: AdviceList,
    pub indoor: AdviceList,
    pub tips: AdviceList,
}

impl Activities {
    pub fn is_empty(&self) -> bool {
        self.outdoor.is_empty() && self.indoor.is_empty() && self.tips.is_empty()
    }
}

fn apply_rules(list: &mut AdviceList, rules: &[AdviceRule], ctx: &RuleContext<'_>) {
    for rule in rules {
        if (rule.applies)(ctx) {
            tracing::trace!(rule = rule.name, "advice rule fired");
            list.extend_from(rule.advice);
        }
    }
}

/// Temperature-tier clothing plus weather-specific additions.
pub fn clothing(ctx: &RuleContext<'_>) -> AdviceList {
    let temp = ctx.temp();
    let tier = CLOTHING_TIERS
        .iter()
        .find(|(upper, _)| temp <= *upper)
        .map(|(_, items)| *items)
        .unwrap_or(HOT_CLOTHING);

    let mut list = AdviceList::new();
    list.extend_from(tier);
    apply_rules(&mut list, CLOTHING_RULES, ctx);
    list
}

/// Things to carry: the baseline essentials plus weather-specific items.
pub fn items(ctx: &RuleContext<'_>) -> AdviceList {
    let mut list = AdviceList::new();
    list.extend_from(BASELINE_ITEMS);
    apply_rules(&mut list, ITEM_RULES, ctx);
    list
}

pub fn activities(ctx: &RuleContext<'_>) -> Activities {
    let level = ctx.scores.activity_level;
    let mut activities = Activities::default();

    match ACTIVITY_TIERS.iter().find(|tier| level > tier.above) {
        Some(tier) => {
            activities.outdoor.extend_from(tier.outdoor);
            activities.indoor.extend_from(tier.indoor);
        }
        None => activities.indoor.extend_from(INDOOR_ACTIVITIES),
    }

    for rule in ACTIVITY_RULES {
        if (rule.applies)(ctx) {
            tracing::trace!(rule = rule.name, "activity rule fired");
            activities.outdoor.extend_from(rule.outdoor);
            activities.tips.extend_from(rule.tips);
        }
    }

    activities
}

/// The first matching tip in priority order, or the generic default.
pub fn personalized_tip(ctx: &RuleContext<'_>) -> &'static str {
    TIP_RULES
        .iter()
        .find(|rule| (rule.applies)(ctx))
        .map(|rule| {
            tracing::trace!(rule = rule.name, "tip selected");
            rule.tip
        })
        .unwrap_or(DEFAULT_TIP)
}
