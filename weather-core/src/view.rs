//! Plain-text renderers. Each one is a pure function of the data it is given.

use std::fmt::Write;

use tokio::time::Instant;

use crate::{
    condition::Icon,
    controller::{Phase, PresentationState},
    model::{CurrentSnapshot, DailyPoint, HourlyPoint},
    theme::ThemeState,
};

pub const SEARCH_PLACEHOLDER: &str = "Search for a city...";
pub const SEARCH_HELP: &str = "Enter a city name, `@` to use your location, or Esc to quit";
pub const LOADING_WEATHER: &str = "Fetching weather data...";
pub const LOADING_SUMMARY: &str = "Generating summary...";

/// Title line with the active theme; names the outgoing theme and its opacity while a fade runs.
pub fn render_header(theme: &ThemeState, now: Instant) -> String {
    let current = theme.current();
    let (from, to) = current.gradient();
    let mut out = format!("Weather Dashboard  ·  your AI-powered forecast  [{current}: {from} → {to}]");
    if let Some(previous) = theme.previous(now) {
        let percent = (theme.previous_opacity(now) * 100.0).round();
        let _ = write!(out, "  (fading out {previous} {percent}%)");
    }
    out
}

pub fn render_error(message: &str) -> String {
    format!("⚠ Error: {message}")
}

pub fn render_current(city: &str, current: &CurrentSnapshot) -> String {
    let icon = Icon::for_condition(&current.condition);
    format!(
        "{city}\n\
         {}  {}°C  {}\n\
         Feels like {}°C · Wind {} km/h · Humidity {}% · Visibility {} km",
        icon.glyph(),
        current.temperature,
        current.condition,
        current.feels_like,
        current.wind_speed,
        current.humidity,
        current.visibility,
    )
}

pub fn render_hourly(points: &[HourlyPoint]) -> String {
    let mut out = String::from("Hourly Forecast\n");
    for p in points {
        let _ = writeln!(
            out,
            "  {:>5}  {}  {:>4}°  💧{:>3}%",
            p.time,
            Icon::for_condition(&p.condition).glyph(),
            p.temperature,
            p.precipitation_chance,
        );
    }
    out
}

pub fn render_daily(days: &[DailyPoint]) -> String {
    let mut out = format!("{}-Day Forecast\n", days.len());
    for d in days {
        let _ = writeln!(
            out,
            "  {}  {}  {:>4}° / {:>4}°  {}",
            d.date().format("%a"),
            Icon::for_condition(d.condition()).glyph(),
            d.max_temp(),
            d.min_temp(),
            d.condition(),
        );
    }
    out
}

pub fn render_summary(summary: &str, loading: bool) -> String {
    if loading {
        format!("✨ AI Summary\n  {LOADING_SUMMARY}")
    } else {
        format!("✨ AI Summary\n  {summary}")
    }
}

/// Whole screen for the current presentation state at `now`.
pub fn render_dashboard(state: &PresentationState, now: Instant) -> String {
    let mut sections = vec![render_header(&state.theme, now)];

    if let Some(error) = &state.error {
        sections.push(render_error(error));
    }

    match (&state.record, state.phase) {
        (_, Phase::LoadingWeather) if state.error.is_none() => {
            sections.push(LOADING_WEATHER.to_string());
        }
        (Some(record), _) => {
            sections.push(render_current(&state.city, &record.current));
            sections.push(render_summary(&state.summary, state.summary_loading));
            sections.push(render_hourly(&record.hourly));
            sections.push(render_daily(&record.forecast));
        }
        (None, _) => {}
    }

    sections.join("\n\n")
}
