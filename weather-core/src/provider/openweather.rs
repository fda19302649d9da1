use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, instrument, warn};

use crate::{
    WeatherConfig, WeatherError,
    model::{CURRENT_LOCATION_LABEL, Coordinates, WeatherRecord},
    normalize::{OwCurrentResponse, OwForecastResponse, normalize},
};

use super::WeatherSource;

/// OpenWeather 2.5 `weather` + `forecast` endpoints, in the provider's standard units.
#[derive(Debug, Clone)]
pub struct OpenWeatherSource {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

/// Body of a non-2xx OpenWeather response.
#[derive(Debug, Deserialize)]
struct OwErrorBody {
    message: Option<String>,
}

impl OpenWeatherSource {
    pub fn new(config: WeatherConfig) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(config.timeout()).build().map_err(|e| {
            warn!(error = %e, "failed to build HTTP client");
            WeatherError::Configuration("Failed to initialise the HTTP client.".to_string())
        })?;

        Ok(Self {
            api_key: config.configured_key().map(str::to_string),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn api_key(&self) -> Result<&str, WeatherError> {
        self.api_key.as_deref().ok_or_else(WeatherError::missing_weather_key)
    }

    /// Fetch current conditions and forecast concurrently, then normalize.
    async fn fetch_both(
        &self,
        params: &[(&str, String)],
        not_found_label: &str,
        fallback_label: &str,
    ) -> Result<WeatherRecord, WeatherError> {
        let (current, forecast) = tokio::try_join!(
            self.get_json::<OwCurrentResponse>("weather", params, not_found_label),
            self.get_json::<OwForecastResponse>("forecast", params, not_found_label),
        )?;

        normalize(&current, &forecast, fallback_label, Utc::now())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        not_found_label: &str,
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(%url, "requesting OpenWeather {endpoint}");

        let res = self.http.get(&url).query(params).send().await.map_err(|e| {
            warn!(error = %e, endpoint, "OpenWeather request failed");
            WeatherError::unreachable()
        })?;

        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Err(WeatherError::NotFound { query: not_found_label.to_string() });
        }

        let body = res.text().await.map_err(|e| {
            warn!(error = %e, endpoint, "failed to read OpenWeather response body");
            WeatherError::unreachable()
        })?;

        if !status.is_success() {
            warn!(%status, body = %truncate_body(&body), endpoint, "OpenWeather returned an error");
            return Err(upstream_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, body = %truncate_body(&body), endpoint, "failed to parse OpenWeather JSON");
            WeatherError::unreadable()
        })
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherSource {
    #[instrument(skip(self))]
    async fn fetch_by_city(&self, name: &str) -> Result<WeatherRecord, WeatherError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WeatherError::blank_city());
        }

        let params = [("q", name.to_string()), ("appid", self.api_key()?.to_string())];
        self.fetch_both(&params, &format!("\"{name}\""), name).await
    }

    #[instrument(skip(self))]
    async fn fetch_by_coordinates(
        &self,
        coordinates: Coordinates,
    ) -> Result<WeatherRecord, WeatherError> {
        if !coordinates.is_valid() {
            return Err(WeatherError::InvalidInput(
                "Coordinates out of range: latitude must be within -90..90 and longitude within -180..180."
                    .to_string(),
            ));
        }

        let params = [
            ("lat", coordinates.lat.to_string()),
            ("lon", coordinates.lon.to_string()),
            ("appid", self.api_key()?.to_string()),
        ];
        self.fetch_both(&params, "your current location", CURRENT_LOCATION_LABEL)
            .await
    }
}

fn upstream_error(status: StatusCode, body: &str) -> WeatherError {
    let detail = serde_json::from_str::<OwErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

    WeatherError::Upstream {
        status: Some(status.as_u16()),
        message: format!("The weather service returned an error ({detail}). Please try again."),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
