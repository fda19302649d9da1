//! Classification of free-text condition labels into visual categories,
//! and the icon chosen for each category.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionCategory {
    Clear,
    PartlyCloudy,
    Cloudy,
    Rain,
    Snow,
    Thunder,
    Fog,
    Unknown,
}

impl ConditionCategory {
    /// Total over every input. More specific categories are tested first, so a
    /// label mentioning both cloud and sun is partly cloudy rather than clear.
    pub fn classify(condition: &str) -> Self {
        let c = condition.to_lowercase();
        let has = |needle: &str| c.contains(needle);

        if has("cloud") && (has("sun") || has("partly")) {
            Self::PartlyCloudy
        } else if has("clear") || has("sun") {
            Self::Clear
        } else if has("rain") || has("drizzle") {
            Self::Rain
        } else if has("snow") || has("sleet") {
            Self::Snow
        } else if has("thunder") || has("storm") {
            Self::Thunder
        } else if has("fog") || has("mist") || has("haze") {
            Self::Fog
        } else if has("cloud") {
            Self::Cloudy
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::PartlyCloudy => "partly-cloudy",
            Self::Cloudy => "cloudy",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Thunder => "thunder",
            Self::Fog => "fog",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ConditionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Icon {
    Sun,
    CloudSun,
    Cloud,
    CloudRain,
    CloudSnow,
    Lightning,
    CloudFog,
}

impl Icon {
    pub fn for_category(category: ConditionCategory) -> Self {
        match category {
            ConditionCategory::Clear => Self::Sun,
            ConditionCategory::PartlyCloudy => Self::CloudSun,
            ConditionCategory::Cloudy => Self::Cloud,
            ConditionCategory::Rain => Self::CloudRain,
            ConditionCategory::Snow => Self::CloudSnow,
            ConditionCategory::Thunder => Self::Lightning,
            ConditionCategory::Fog => Self::CloudFog,
            // unrecognised labels still get a friendly glyph
            ConditionCategory::Unknown => Self::Sun,
        }
    }

    pub fn for_condition(condition: &str) -> Self {
        Self::for_category(ConditionCategory::classify(condition))
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Sun => "☀",
            Self::CloudSun => "⛅",
            Self::Cloud => "☁",
            Self::CloudRain => "🌧",
            Self::CloudSnow => "🌨",
            Self::Lightning => "⚡",
            Self::CloudFog => "🌫",
        }
    }
}
