use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::model::Coordinates;

pub const ENV_WEATHER_KEY: &str = "OPENWEATHER_API_KEY";
pub const ENV_SUMMARY_KEY: &str = "GEMINI_API_KEY";
pub const ENV_CITY: &str = "WEATHERDASH_CITY";
pub const ENV_LAT: &str = "WEATHERDASH_LAT";
pub const ENV_LON: &str = "WEATHERDASH_LON";

fn default_weather_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_summary_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_city() -> String {
    "London".to_string()
}

const fn default_weather_timeout() -> u64 {
    10
}

const fn default_summary_timeout() -> u64 {
    30
}

/// Upstream weather provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_weather_url")]
    pub base_url: String,

    #[serde(default = "default_weather_timeout")]
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_url(),
            timeout_secs: default_weather_timeout(),
        }
    }
}

impl WeatherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The API key, unless absent or blank.
    pub fn configured_key(&self) -> Option<&str> {
        non_blank(self.api_key.as_deref())
    }
}

/// Generative-text backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_summary_url")]
    pub base_url: String,

    #[serde(default = "default_summary_timeout")]
    pub timeout_secs: u64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_summary_url(),
            timeout_secs: default_summary_timeout(),
        }
    }
}

impl SummaryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn configured_key(&self) -> Option<&str> {
        non_blank(self.api_key.as_deref())
    }
}

fn non_blank(key: Option<&str>) -> Option<&str> {
    key.filter(|k| !k.trim().is_empty())
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// default_city = "Paris"
///
/// [weather]
/// api_key = "..."
///
/// [summary]
/// api_key = "..."
/// model = "gemini-2.5-flash"
///
/// [location]
/// lat = 48.85
/// lon = 2.35
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_city")]
    pub default_city: String,

    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub summary: SummaryConfig,

    /// Fixed position served when the user asks for their own location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinates>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_city: default_city(),
            weather: WeatherConfig::default(),
            summary: SummaryConfig::default(),
            location: None,
        }
    }
}

impl Config {
    /// Load the config file (if any), then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_env(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Load config from `path`, or return defaults if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform config file.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherdash", "weatherdash")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay values from the environment. Blank values count as unset.
    ///
    /// `lookup` is usually `std::env::var`; taking a closure keeps this testable
    /// without touching the process environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(key) = get(ENV_WEATHER_KEY) {
            self.weather.api_key = Some(key);
        }
        if let Some(key) = get(ENV_SUMMARY_KEY) {
            self.summary.api_key = Some(key);
        }
        if let Some(city) = get(ENV_CITY) {
            self.default_city = city;
        }

        let lat = get(ENV_LAT).and_then(|v| v.parse::<f64>().ok());
        let lon = get(ENV_LON).and_then(|v| v.parse::<f64>().ok());
        if let (Some(lat), Some(lon)) = (lat, lon) {
            self.location = Some(Coordinates::new(lat, lon));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_have_no_credentials() {
        let cfg = Config::default();

        assert_eq!(cfg.default_city, "London");
        assert_eq!(cfg.summary.model, "gemini-2.5-flash");
        assert!(cfg.weather.configured_key().is_none());
        assert!(cfg.summary.configured_key().is_none());
        assert_eq!(cfg.weather.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = Config::default();
        cfg.weather.api_key = Some("FROM_FILE".into());

        cfg.apply_env(env(&[
            (ENV_WEATHER_KEY, "FROM_ENV"),
            (ENV_SUMMARY_KEY, "GEMINI"),
            (ENV_CITY, "Paris"),
            (ENV_LAT, "48.85"),
            (ENV_LON, "2.35"),
        ]));

        assert_eq!(cfg.weather.configured_key(), Some("FROM_ENV"));
        assert_eq!(cfg.summary.configured_key(), Some("GEMINI"));
        assert_eq!(cfg.default_city, "Paris");
        assert_eq!(cfg.location, Some(Coordinates::new(48.85, 2.35)));
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut cfg = Config::default();
        cfg.weather.api_key = Some("FROM_FILE".into());

        cfg.apply_env(env(&[(ENV_WEATHER_KEY, "   "), (ENV_LAT, "48.85")]));

        assert_eq!(cfg.weather.configured_key(), Some("FROM_FILE"));
        // a lone latitude is not a location
        assert!(cfg.location.is_none());
    }

    #[test]
    fn blank_stored_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.summary.api_key = Some(String::new());

        assert!(cfg.summary.configured_key().is_none());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.default_city = "Oslo".into();
        cfg.weather.api_key = Some("OW".into());
        cfg.location = Some(Coordinates::new(59.91, 10.75));
        cfg.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[summary]\napi_key = \"G\"\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();

        assert_eq!(cfg.summary.configured_key(), Some("G"));
        assert_eq!(cfg.summary.model, "gemini-2.5-flash");
        assert_eq!(cfg.default_city, "London");
        assert_eq!(cfg.weather.base_url, "https://api.openweathermap.org/data/2.5");
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_city = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
