//! Short natural-language summaries of a [`WeatherRecord`].

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::{debug, instrument, warn};

use crate::{SummaryConfig, SummaryError, model::WeatherRecord};

/// Shown in place of a summary when the backend fails.
pub const SUMMARY_FALLBACK: &str = "Could not generate a weather summary at this time.";

#[async_trait]
pub trait SummarySource: Send + Sync + Debug {
    async fn summarize(&self, record: &WeatherRecord) -> Result<String, SummaryError>;
}

/// Deterministic summary used when no backend credential is configured.
pub fn template_summary(record: &WeatherRecord) -> String {
    format!(
        "It's a pleasant day in {}. The current temperature is {}°C, feeling like {}°C. \
         Expect {} skies. The forecast shows similar conditions for the next few days.",
        record.city,
        record.current.temperature,
        record.current.feels_like,
        record.current.condition.to_lowercase(),
    )
}

pub fn build_prompt(record: &WeatherRecord) -> String {
    // serializing plain data structs cannot fail
    let data = serde_json::to_string_pretty(record).unwrap_or_default();

    format!(
        "You are a friendly and enthusiastic weather assistant.\n\
         Based on the following JSON weather data, provide a short, conversational, and helpful summary of the weather.\n\
         - Start by mentioning the city name.\n\
         - Describe the current conditions, including temperature and what it feels like.\n\
         - Briefly touch on the general forecast for the next few days.\n\
         - Keep the tone light and engaging.\n\
         - The summary should be a single paragraph of no more than 3-4 sentences.\n\
         \n\
         Weather Data:\n\
         {data}\n"
    )
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Gemini `generateContent` client. Without an API key it answers from [`template_summary`].
#[derive(Debug, Clone)]
pub struct GeminiSummarizer {
    api_key: Option<String>,
    model: String,
    base_url: String,
    http: Client,
}

impl GeminiSummarizer {
    pub fn new(config: SummaryConfig) -> Result<Self, SummaryError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| SummaryError::Generation(format!("HTTP client: {e}")))?;

        let api_key = config.configured_key().map(str::to_string);
        if api_key.is_none() {
            warn!("no summary API key configured; using templated summaries");
        }

        Ok(Self {
            api_key,
            model: config.model,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String, SummaryError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        debug!(%url, "requesting summary");

        let request = GenerateRequest { contents: [Content { parts: [RequestPart { text: prompt }] }] };

        let res = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SummaryError::Generation(format!("request failed: {e}")))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(SummaryError::Generation(format!(
                "backend returned {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: GenerateResponse = res
            .json()
            .await
            .map_err(|e| SummaryError::Generation(format!("invalid response: {e}")))?;

        parsed
            .text()
            .ok_or_else(|| SummaryError::Generation("backend returned no text".to_string()))
    }
}

#[async_trait]
impl SummarySource for GeminiSummarizer {
    #[instrument(skip_all, fields(city = %record.city))]
    async fn summarize(&self, record: &WeatherRecord) -> Result<String, SummaryError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(template_summary(record));
        };

        self.generate(api_key, &build_prompt(record)).await
    }
}
