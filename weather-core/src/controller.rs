//! Presentation state and the fetch-then-summarize cycle that drives it.
//!
//! A cycle runs `Idle -> LoadingWeather -> LoadingSummary -> Ready`, or ends in
//! `Failed` when the weather fetch fails. Each cycle borrows the controller
//! mutably, so two cycles can never interleave their writes.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::{
    WeatherError,
    location::Geolocator,
    model::{LocationQuery, WeatherRecord},
    provider::WeatherSource,
    summary::{SUMMARY_FALLBACK, SummarySource},
    theme::{Theme, ThemeState},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    LoadingWeather,
    LoadingSummary,
    Ready,
    Failed,
}

/// Published on every phase change when an event channel is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseEvent {
    pub cycle: u64,
    pub phase: Phase,
}

#[derive(Debug, Clone, Default)]
pub struct PresentationState {
    pub record: Option<WeatherRecord>,
    /// Label of the active location, taken from the last record.
    pub city: String,
    pub weather_loading: bool,
    pub summary_loading: bool,
    pub error: Option<String>,
    pub summary: String,
    pub theme: ThemeState,
    pub phase: Phase,
}

#[derive(Debug)]
pub struct Controller {
    weather: Arc<dyn WeatherSource>,
    summary: Arc<dyn SummarySource>,
    default_city: String,
    state: PresentationState,
    cycle: u64,
    events: Option<UnboundedSender<PhaseEvent>>,
}

impl Controller {
    pub fn new(
        weather: Arc<dyn WeatherSource>,
        summary: Arc<dyn SummarySource>,
        default_city: impl Into<String>,
    ) -> Self {
        let default_city = default_city.into();
        Self {
            weather,
            summary,
            state: PresentationState { city: default_city.clone(), ..Default::default() },
            default_city,
            cycle: 0,
            events: None,
        }
    }

    pub fn with_events(mut self, events: UnboundedSender<PhaseEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn state(&self) -> &PresentationState {
        &self.state
    }

    /// Number of cycles started so far.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// The fetch issued when the dashboard first opens.
    pub async fn initial_load(&mut self) -> Phase {
        let city = self.default_city.clone();
        self.run_cycle(LocationQuery::City(city)).await
    }

    /// Blank input is reported inline and leaves everything else untouched.
    pub async fn search(&mut self, input: &str) -> Phase {
        let city = input.trim();
        if city.is_empty() {
            self.state.error = Some(WeatherError::blank_city().to_string());
            return self.state.phase;
        }

        self.run_cycle(LocationQuery::City(city.to_string())).await
    }

    /// A location failure is reported without starting a cycle.
    pub async fn geolocate(&mut self, locator: &dyn Geolocator) -> Phase {
        match locator.locate().await {
            Ok(coordinates) => self.run_cycle(LocationQuery::Coordinates(coordinates)).await,
            Err(e) => {
                warn!(error = %e, "geolocation unavailable");
                self.state.error = Some(e.to_string());
                self.state.phase
            }
        }
    }

    /// Releases the outgoing theme once its fade window has closed.
    pub fn tick(&mut self, now: Instant) {
        self.state.theme.tick(now);
    }

    async fn run_cycle(&mut self, query: LocationQuery) -> Phase {
        self.cycle += 1;
        info!(cycle = self.cycle, ?query, "starting weather cycle");

        self.state.error = None;
        self.state.summary.clear();
        self.state.weather_loading = true;
        self.enter(Phase::LoadingWeather);

        let fetched = self.weather.fetch(&query).await;
        self.state.weather_loading = false;

        match fetched {
            Ok(record) => {
                self.state.city = record.city.clone();
                self.state.record = Some(record);
                self.refresh_theme();

                self.state.summary_loading = true;
                self.enter(Phase::LoadingSummary);

                self.state.summary = self.summarize_current().await;
                self.state.summary_loading = false;
                self.enter(Phase::Ready);
            }
            Err(e) => {
                warn!(cycle = self.cycle, error = %e, "weather fetch failed");
                self.state.error = Some(e.to_string());
                self.state.record = None;
                self.refresh_theme();
                self.enter(Phase::Failed);
            }
        }

        self.state.phase
    }

    async fn summarize_current(&self) -> String {
        let Some(record) = self.state.record.as_ref() else {
            return String::new();
        };

        match self.summary.summarize(record).await {
            Ok(text) => text,
            Err(e) => {
                warn!(cycle = self.cycle, error = %e, "summary unavailable, using fallback");
                SUMMARY_FALLBACK.to_string()
            }
        }
    }

    fn refresh_theme(&mut self) {
        let next = Theme::for_record(self.state.record.as_ref());
        let previous = self.state.theme.current();
        if self.state.theme.transition(next, Instant::now()) {
            info!(from = %previous, to = %next, "theme changed");
        }
    }

    fn enter(&mut self, phase: Phase) {
        self.state.phase = phase;
        if let Some(events) = &self.events {
            // a dropped receiver just means nobody is watching
            let _ = events.send(PhaseEvent { cycle: self.cycle, phase });
        }
    }
}
