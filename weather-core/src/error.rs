//! Typed failures for the weather, summary and geolocation sources.
//!
//! Every `Display` string is a single line that is safe to show to the end user.
//! Transport detail is logged where it happens and never copied into a message.

use thiserror::Error;

/// Failures of a weather fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    /// The caller supplied an unusable query (blank city, out-of-range coordinates).
    #[error("{0}")]
    InvalidInput(String),

    /// A required credential or setting is missing.
    #[error("{0}")]
    Configuration(String),

    /// The provider could not resolve the requested location.
    #[error("Could not find weather data for {query}. Check the spelling and try again.")]
    NotFound { query: String },

    /// The provider answered with an error, or could not be reached at all.
    #[error("{message}")]
    Upstream { status: Option<u16>, message: String },
}

impl WeatherError {
    pub(crate) fn blank_city() -> Self {
        Self::InvalidInput("Please enter a valid city name.".to_string())
    }

    pub(crate) fn missing_weather_key() -> Self {
        Self::Configuration(
            "No weather API key configured. Set OPENWEATHER_API_KEY or run `weatherdash configure`."
                .to_string(),
        )
    }

    /// Network-level failure; the raw cause is deliberately not carried.
    pub(crate) fn unreachable() -> Self {
        Self::Upstream {
            status: None,
            message: "Unable to reach the weather service. Please try again in a moment."
                .to_string(),
        }
    }

    pub(crate) fn unreadable() -> Self {
        Self::Upstream {
            status: None,
            message: "The weather service sent an unexpected response. Please try again."
                .to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Failure of the generative-text backend. Never shown to the end user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummaryError {
    #[error("Failed to generate weather summary: {0}")]
    Generation(String),
}

/// Failure of the platform location capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("Geolocation failed: {0}")]
    PermissionDenied(String),

    #[error("Geolocation is not supported on this device.")]
    Unsupported,
}
