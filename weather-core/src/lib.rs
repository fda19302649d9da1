//! Core library for the `weatherdash` terminal dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather source and the normalization of its payloads
//! - The Gemini summary source with a templated fallback
//! - Condition classification, icons and background themes
//! - The presentation controller and plain-text views
//!
//! It is used by `weatherdash-cli`, but can also be reused by other front ends.

pub mod condition;
pub mod config;
pub mod controller;
pub mod error;
pub mod location;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod summary;
pub mod theme;
pub mod view;

pub use condition::{ConditionCategory, Icon};
pub use config::{Config, SummaryConfig, WeatherConfig};
pub use controller::{Controller, Phase, PhaseEvent, PresentationState};
pub use error::{GeolocationError, SummaryError, WeatherError};
pub use location::{FixedGeolocator, Geolocator};
pub use model::{
    Coordinates, CurrentSnapshot, DailyPoint, HourlyPoint, LocationQuery, WeatherRecord,
};
pub use provider::{WeatherSource, openweather::OpenWeatherSource, source_from_config};
pub use summary::{GeminiSummarizer, SUMMARY_FALLBACK, SummarySource};
pub use theme::{Theme, ThemeState};
