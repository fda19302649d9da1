//! Background themes and the timed cross-fade between them.

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

use crate::condition::ConditionCategory;
use crate::model::WeatherRecord;

/// How long the outgoing theme stays visible while fading out.
pub const CROSS_FADE: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    Bright,
    Muted,
    DarkSlate,
    PaleBlue,
    DeepIndigo,
    #[default]
    NeutralSlate,
}

impl Theme {
    pub fn for_category(category: ConditionCategory) -> Self {
        match category {
            ConditionCategory::Clear => Self::Bright,
            ConditionCategory::PartlyCloudy | ConditionCategory::Cloudy => Self::Muted,
            ConditionCategory::Rain => Self::DarkSlate,
            ConditionCategory::Snow => Self::PaleBlue,
            ConditionCategory::Thunder => Self::DeepIndigo,
            ConditionCategory::Fog | ConditionCategory::Unknown => Self::NeutralSlate,
        }
    }

    /// Theme of the record's current condition, or the default when there is none.
    pub fn for_record(record: Option<&WeatherRecord>) -> Self {
        record
            .map(|r| Self::for_category(ConditionCategory::classify(&r.current.condition)))
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bright => "bright",
            Self::Muted => "muted",
            Self::DarkSlate => "dark-slate",
            Self::PaleBlue => "pale-blue",
            Self::DeepIndigo => "deep-indigo",
            Self::NeutralSlate => "neutral-slate",
        }
    }

    /// Gradient stops, top-left to bottom-right.
    pub fn gradient(&self) -> (&'static str, &'static str) {
        match self {
            Self::Bright => ("sky-500", "indigo-500"),
            Self::Muted => ("slate-500", "slate-700"),
            Self::DarkSlate => ("slate-700", "gray-900"),
            Self::PaleBlue => ("sky-200", "blue-400"),
            Self::DeepIndigo => ("indigo-800", "gray-900"),
            Self::NeutralSlate => ("slate-800", "gray-900"),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CrossFade {
    previous: Theme,
    started: Instant,
}

impl CrossFade {
    fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started)
    }

    fn is_running(&self, now: Instant) -> bool {
        self.elapsed(now) < CROSS_FADE
    }
}

/// The displayed theme plus, during a fade, the outgoing one.
///
/// Reads take the current instant, so an expired fade is never reported even if
/// nobody calls [`ThemeState::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThemeState {
    current: Theme,
    fade: Option<CrossFade>,
}

impl ThemeState {
    pub fn current(&self) -> Theme {
        self.current
    }

    /// The outgoing theme while its fade window is open.
    pub fn previous(&self, now: Instant) -> Option<Theme> {
        self.running(now).map(|f| f.previous)
    }

    /// True once the outgoing layer has started to animate out, until the window closes.
    pub fn is_fading_out(&self, now: Instant) -> bool {
        self.running(now).is_some_and(|f| now > f.started)
    }

    /// Switches to `next`. Returns `true` when a fade was started.
    ///
    /// A change arriving mid-fade replaces the pending fade, so its window never closes on the new theme.
    pub fn transition(&mut self, next: Theme, now: Instant) -> bool {
        if next == self.current {
            return false;
        }

        self.fade = Some(CrossFade { previous: self.current, started: now });
        self.current = next;
        true
    }

    /// Forgets the outgoing theme once [`CROSS_FADE`] has elapsed.
    pub fn tick(&mut self, now: Instant) {
        if self.running(now).is_none() {
            self.fade = None;
        }
    }

    /// Opacity of the outgoing layer in `0.0..=1.0`; zero when no fade is running.
    pub fn previous_opacity(&self, now: Instant) -> f32 {
        self.running(now).map_or(0.0, |fade| {
            (1.0 - fade.elapsed(now).as_secs_f32() / CROSS_FADE.as_secs_f32()).clamp(0.0, 1.0)
        })
    }

    fn running(&self, now: Instant) -> Option<&CrossFade> {
        self.fade.as_ref().filter(|f| f.is_running(now))
    }
}
