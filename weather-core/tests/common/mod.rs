//! Payload builders shared by the mock-server tests.

#![allow(dead_code)]

use chrono::Utc;
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use weatherdash_core::{SummaryConfig, WeatherConfig};

pub const WEATHER_KEY: &str = "TEST_OW_KEY";
pub const SUMMARY_KEY: &str = "TEST_GEMINI_KEY";
pub const MODEL: &str = "gemini-2.5-flash";

pub fn weather_config(server: &MockServer) -> WeatherConfig {
    WeatherConfig {
        api_key: Some(WEATHER_KEY.to_string()),
        base_url: server.uri(),
        timeout_secs: 5,
    }
}

pub fn summary_config(server: &MockServer) -> SummaryConfig {
    SummaryConfig {
        api_key: Some(SUMMARY_KEY.to_string()),
        model: MODEL.to_string(),
        base_url: server.uri(),
        timeout_secs: 5,
    }
}

/// Sample current-conditions payload (Kelvin, m/s, metres).
pub fn current_payload(name: &str, main: &str) -> Value {
    json!({
        "coord": { "lon": 2.35, "lat": 48.85 },
        "weather": [{ "id": 803, "main": main, "description": "broken clouds", "icon": "04d" }],
        "main": {
            "temp": 293.15,
            "feels_like": 292.15,
            "temp_min": 291.0,
            "temp_max": 295.0,
            "pressure": 1015,
            "humidity": 64
        },
        "visibility": 10000,
        "wind": { "speed": 10.0, "deg": 250 },
        "dt": Utc::now().timestamp(),
        "timezone": 0,
        "name": name,
        "cod": 200
    })
}

/// Forty 3-hourly points starting at the next 3-hour boundary.
pub fn forecast_payload(name: &str) -> Value {
    let now = Utc::now().timestamp();
    let start = now - now.rem_euclid(10_800) + 10_800;

    let list: Vec<Value> = (0..40)
        .map(|i| {
            let kelvin = 285.15 + (i % 8) as f64;
            json!({
                "dt": start + i * 10_800,
                "main": {
                    "temp": kelvin,
                    "feels_like": kelvin - 1.0,
                    "temp_min": kelvin - 1.0,
                    "temp_max": kelvin + 1.0,
                    "humidity": 70
                },
                "weather": [{ "id": 500, "main": "Rain", "description": "light rain", "icon": "10d" }],
                "pop": 0.45
            })
        })
        .collect();

    json!({
        "cod": "200",
        "cnt": 40,
        "list": list,
        "city": { "id": 2988507, "name": name, "country": "FR", "timezone": 0 }
    })
}

pub fn error_payload(code: u16, message: &str) -> Value {
    json!({ "cod": code.to_string(), "message": message })
}

pub fn gemini_payload(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

pub async fn mount_weather(server: &MockServer, name: &str, main: &str) {
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_payload(name, main)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_payload(name)))
        .mount(server)
        .await;
}
