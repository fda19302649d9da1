//! Turns the provider's current-conditions and forecast payloads into a [`WeatherRecord`].
//!
//! Everything here is pure: the caller supplies "now", so the output depends on the
//! inputs alone. Local times (hour labels, day buckets, the midday pick) use the UTC
//! offset the provider reports for the location.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Timelike, Utc};
use serde::Deserialize;

use crate::error::WeatherError;
use crate::model::{CurrentSnapshot, DailyPoint, HourlyPoint, WeatherRecord};

pub const HOURLY_POINTS: usize = 8;
pub const FORECAST_DAYS: usize = 5;

/// The provider caps visibility at 10 km and omits it when unlimited.
const DEFAULT_VISIBILITY_M: f64 = 10_000.0;
const UNKNOWN_CONDITION: &str = "Unknown";
const MIDDAY_SECS: i64 = 12 * 3600;

#[derive(Debug, Clone, Deserialize)]
pub struct OwMain {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub humidity: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwWeather {
    pub main: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwWind {
    pub speed: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwCurrentResponse {
    #[serde(default)]
    pub name: String,
    pub main: OwMain,
    #[serde(default)]
    pub weather: Vec<OwWeather>,
    pub wind: OwWind,
    pub visibility: Option<f64>,
    /// Shift in seconds from UTC.
    pub timezone: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwCity {
    #[serde(default)]
    pub name: String,
    pub timezone: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwForecastEntry {
    pub dt: i64,
    pub main: OwMain,
    #[serde(default)]
    pub weather: Vec<OwWeather>,
    /// Probability of precipitation, 0..=1.
    pub pop: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwForecastResponse {
    pub city: OwCity,
    pub list: Vec<OwForecastEntry>,
}

pub fn kelvin_to_celsius(kelvin: f64) -> i32 {
    (kelvin - 273.15).round() as i32
}

pub fn mps_to_kmh(mps: f64) -> i32 {
    (mps * 3.6).round() as i32
}

pub fn metres_to_km(metres: f64) -> i32 {
    (metres / 1000.0).round() as i32
}

pub fn precipitation_percent(pop: f64) -> u8 {
    (pop.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// `3PM`, `12AM`, ...
pub fn hour_label(at: DateTime<FixedOffset>) -> String {
    at.format("%-I%p").to_string()
}

fn condition_of(weather: &[OwWeather]) -> &str {
    weather.first().map(|w| w.main.as_str()).unwrap_or(UNKNOWN_CONDITION)
}

fn location_offset(current: &OwCurrentResponse, forecast: &OwForecastResponse) -> FixedOffset {
    forecast
        .city
        .timezone
        .or(current.timezone)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}

/// Builds the record. `fallback_label` names the place when the payload carries no name.
pub fn normalize(
    current: &OwCurrentResponse,
    forecast: &OwForecastResponse,
    fallback_label: &str,
    now: DateTime<Utc>,
) -> Result<WeatherRecord, WeatherError> {
    let offset = location_offset(current, forecast);

    let mut points: Vec<(DateTime<FixedOffset>, &OwForecastEntry)> = forecast
        .list
        .iter()
        .filter_map(|e| DateTime::from_timestamp(e.dt, 0).map(|t| (t.with_timezone(&offset), e)))
        .collect();
    points.sort_by_key(|(t, _)| *t);

    if points.is_empty() {
        return Err(WeatherError::Upstream {
            status: None,
            message: "The weather service returned no forecast data. Please try again.".to_string(),
        });
    }

    let city = match current.name.trim() {
        "" => fallback_label.to_string(),
        _ => current.name.clone(),
    };

    Ok(WeatherRecord {
        city,
        current: snapshot(current),
        hourly: hourly_series(&points),
        forecast: daily_series(&points, now.with_timezone(&offset).date_naive()),
    })
}

fn snapshot(current: &OwCurrentResponse) -> CurrentSnapshot {
    CurrentSnapshot {
        temperature: kelvin_to_celsius(current.main.temp),
        condition: condition_of(&current.weather).to_string(),
        wind_speed: mps_to_kmh(current.wind.speed),
        humidity: current.main.humidity,
        feels_like: kelvin_to_celsius(current.main.feels_like),
        visibility: metres_to_km(current.visibility.unwrap_or(DEFAULT_VISIBILITY_M)),
    }
}

fn hourly_series(points: &[(DateTime<FixedOffset>, &OwForecastEntry)]) -> Vec<HourlyPoint> {
    points
        .iter()
        .take(HOURLY_POINTS)
        .map(|(at, entry)| HourlyPoint {
            time: hour_label(*at),
            temperature: kelvin_to_celsius(entry.main.temp),
            condition: condition_of(&entry.weather).to_string(),
            precipitation_chance: precipitation_percent(entry.pop.unwrap_or(0.0)),
        })
        .collect()
}

fn daily_series(
    points: &[(DateTime<FixedOffset>, &OwForecastEntry)],
    today: NaiveDate,
) -> Vec<DailyPoint> {
    let mut days: BTreeMap<NaiveDate, Vec<(DateTime<FixedOffset>, &OwForecastEntry)>> =
        BTreeMap::new();
    for (at, entry) in points {
        days.entry(at.date_naive()).or_default().push((*at, *entry));
    }

    let mut days: Vec<_> = days.into_iter().collect();

    // today's partial data is dropped, unless nothing else would remain
    if days.len() > 1 && days.first().is_some_and(|(date, _)| *date == today) {
        days.remove(0);
    }

    days.into_iter()
        .take(FORECAST_DAYS)
        .map(|(date, entries)| summarize_day(date, &entries))
        .collect()
}

fn summarize_day(date: NaiveDate, entries: &[(DateTime<FixedOffset>, &OwForecastEntry)]) -> DailyPoint {
    let min = entries
        .iter()
        .map(|(_, e)| e.main.temp_min.unwrap_or(e.main.temp))
        .fold(f64::INFINITY, f64::min);
    let max = entries
        .iter()
        .map(|(_, e)| e.main.temp_max.unwrap_or(e.main.temp))
        .fold(f64::NEG_INFINITY, f64::max);

    // min_by_key keeps the earliest of equally distant points
    let condition = entries
        .iter()
        .min_by_key(|(at, _)| (i64::from(at.num_seconds_from_midnight()) - MIDDAY_SECS).abs())
        .map(|(_, e)| condition_of(&e.weather))
        .unwrap_or(UNKNOWN_CONDITION);

    DailyPoint::new(date, kelvin_to_celsius(min), kelvin_to_celsius(max), condition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::{Value, json};

    fn ts(y: i32, m: u32, d: u32, h: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap().timestamp()
    }

    fn current_json(name: &str) -> Value {
        json!({
            "name": name,
            "main": { "temp": 293.15, "feels_like": 292.15, "temp_min": 290.0, "temp_max": 295.0, "humidity": 64 },
            "weather": [{ "main": "Clouds", "description": "broken clouds" }],
            "wind": { "speed": 10.0 },
            "visibility": 9000,
            "timezone": 0
        })
    }

    fn entry_json(dt: i64, kelvin: f64, main: &str, pop: f64) -> Value {
        json!({
            "dt": dt,
            "main": { "temp": kelvin, "feels_like": kelvin, "temp_min": kelvin - 1.0, "temp_max": kelvin + 1.0, "humidity": 70 },
            "weather": [{ "main": main, "description": main.to_lowercase() }],
            "pop": pop
        })
    }

    /// 3-hourly points from 2024-05-01 09:00 UTC; the 12:00 point of each day is rainy.
    fn forecast_json(points: usize, timezone: i32) -> Value {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let list: Vec<Value> = (0..points)
            .map(|i| {
                let at = start + Duration::hours(3 * i as i64);
                let main = if at.hour() == 12 { "Rain" } else { "Clouds" };
                entry_json(at.timestamp(), 283.15 + (i % 8) as f64, main, 0.37)
            })
            .collect();

        json!({ "city": { "name": "London", "timezone": timezone }, "list": list })
    }

    fn parse(current: Value, forecast: Value) -> (OwCurrentResponse, OwForecastResponse) {
        (
            serde_json::from_value(current).expect("current payload"),
            serde_json::from_value(forecast).expect("forecast payload"),
        )
    }

    fn morning_of_may_first() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap()
    }

    #[test]
    fn unit_conversions() {
        assert_eq!(kelvin_to_celsius(293.15), 20);
        assert_eq!(kelvin_to_celsius(273.15), 0);
        assert_eq!(kelvin_to_celsius(268.0), -5);
        assert_eq!(mps_to_kmh(10.0), 36);
        assert_eq!(mps_to_kmh(0.0), 0);
        assert_eq!(metres_to_km(9000.0), 9);
        assert_eq!(metres_to_km(10_000.0), 10);
        assert_eq!(precipitation_percent(0.37), 37);
        assert_eq!(precipitation_percent(1.0), 100);
    }

    #[test]
    fn current_snapshot_is_converted() {
        let (current, forecast) = parse(current_json("London"), forecast_json(48, 0));
        let record = normalize(&current, &forecast, "London", morning_of_may_first()).unwrap();

        assert_eq!(record.city, "London");
        assert_eq!(
            record.current,
            CurrentSnapshot {
                temperature: 20,
                condition: "Clouds".to_string(),
                wind_speed: 36,
                humidity: 64,
                feels_like: 19,
                visibility: 9,
            }
        );
    }

    #[test]
    fn hourly_series_takes_first_eight_points() {
        let (current, forecast) = parse(current_json("London"), forecast_json(48, 0));
        let record = normalize(&current, &forecast, "London", morning_of_may_first()).unwrap();

        let labels: Vec<&str> = record.hourly.iter().map(|h| h.time.as_str()).collect();
        assert_eq!(labels, ["9AM", "12PM", "3PM", "6PM", "9PM", "12AM", "3AM", "6AM"]);
        assert_eq!(record.hourly[0].temperature, 10);
        assert_eq!(record.hourly[1].condition, "Rain");
        assert!(record.hourly.iter().all(|h| h.precipitation_chance == 37));
    }

    #[test]
    fn daily_series_skips_today_and_keeps_five_days() {
        let (current, forecast) = parse(current_json("London"), forecast_json(48, 0));
        let record = normalize(&current, &forecast, "London", morning_of_may_first()).unwrap();

        let dates: Vec<String> = record.forecast.iter().map(|d| d.date().to_string()).collect();
        assert_eq!(dates, ["2024-05-02", "2024-05-03", "2024-05-04", "2024-05-05", "2024-05-06"]);

        for day in &record.forecast {
            assert!(day.min_temp() <= day.max_temp());
            assert_eq!(day.min_temp(), 9);
            assert_eq!(day.max_temp(), 18);
            assert_eq!(day.condition(), "Rain", "midday point represents {}", day.date());
        }
    }

    #[test]
    fn short_forecast_returns_what_is_available() {
        // today plus two full days
        let (current, forecast) = parse(current_json("London"), forecast_json(21, 0));
        let record = normalize(&current, &forecast, "London", morning_of_may_first()).unwrap();

        assert_eq!(record.forecast.len(), 2);
        assert_eq!(record.forecast[0].date().to_string(), "2024-05-02");
    }

    #[test]
    fn today_is_kept_when_it_is_the_only_day() {
        let (current, forecast) = parse(current_json("London"), forecast_json(3, 0));
        let record = normalize(&current, &forecast, "London", morning_of_may_first()).unwrap();

        assert_eq!(record.forecast.len(), 1);
        assert_eq!(record.forecast[0].date().to_string(), "2024-05-01");
        assert!(!record.hourly.is_empty());
    }

    #[test]
    fn buckets_by_location_local_date() {
        let forecast = json!({
            "city": { "name": "Cairo", "timezone": 7200 },
            "list": [
                entry_json(ts(2024, 5, 1, 9), 300.15, "Clear", 0.0),
                // 22:00 UTC is midnight on the 2nd in UTC+2
                entry_json(ts(2024, 5, 1, 22), 290.15, "Clear", 0.0),
                entry_json(ts(2024, 5, 2, 10), 305.15, "Clear", 0.0),
            ]
        });
        let (current, forecast) = parse(current_json("Cairo"), forecast);
        let record = normalize(&current, &forecast, "Cairo", morning_of_may_first()).unwrap();

        assert_eq!(record.forecast.len(), 1);
        let day = &record.forecast[0];
        assert_eq!(day.date().to_string(), "2024-05-02");
        assert_eq!(day.min_temp(), 16);
        assert_eq!(day.max_temp(), 33);
        assert_eq!(record.hourly[0].time, "11AM");
    }

    #[test]
    fn midday_pick_falls_back_to_nearest_point() {
        let forecast = json!({
            "city": { "name": "London", "timezone": 0 },
            "list": [
                entry_json(ts(2024, 5, 1, 9), 290.0, "Clear", 0.0),
                entry_json(ts(2024, 5, 2, 0), 285.0, "Snow", 0.0),
                entry_json(ts(2024, 5, 2, 3), 285.0, "Mist", 0.0),
                entry_json(ts(2024, 5, 2, 21), 285.0, "Rain", 0.0),
            ]
        });
        let (current, forecast) = parse(current_json("London"), forecast);
        let record = normalize(&current, &forecast, "London", morning_of_may_first()).unwrap();

        assert_eq!(record.forecast[0].condition(), "Mist");
    }

    #[test]
    fn unnamed_location_uses_fallback_label() {
        let (current, forecast) = parse(current_json(""), forecast_json(8, 0));
        let record =
            normalize(&current, &forecast, crate::model::CURRENT_LOCATION_LABEL, morning_of_may_first())
                .unwrap();

        assert_eq!(record.city, "Current Location");
    }

    #[test]
    fn missing_optional_fields_get_defaults() {
        let current = json!({
            "main": { "temp": 280.15, "feels_like": 278.15, "humidity": 90 },
            "weather": [],
            "wind": { "speed": 2.5 }
        });
        let forecast = json!({
            "city": {},
            "list": [{ "dt": ts(2024, 5, 1, 12), "main": { "temp": 281.15, "feels_like": 281.15, "humidity": 90 } }]
        });
        let (current, forecast) = parse(current, forecast);
        let record = normalize(&current, &forecast, "Somewhere", morning_of_may_first()).unwrap();

        assert_eq!(record.city, "Somewhere");
        assert_eq!(record.current.condition, "Unknown");
        assert_eq!(record.current.visibility, 10);
        assert_eq!(record.current.wind_speed, 9);
        assert_eq!(record.hourly[0].precipitation_chance, 0);
        assert_eq!(record.forecast[0].min_temp(), 8);
        assert_eq!(record.forecast[0].max_temp(), 8);
    }

    #[test]
    fn empty_forecast_is_an_upstream_error() {
        let (current, forecast) =
            parse(current_json("London"), json!({ "city": { "name": "London" }, "list": [] }));
        let err = normalize(&current, &forecast, "London", morning_of_may_first()).unwrap_err();

        assert!(matches!(err, WeatherError::Upstream { .. }));
    }

    #[test]
    fn normalize_is_deterministic() {
        let (current, forecast) = parse(current_json("London"), forecast_json(48, 3600));
        let now = morning_of_may_first();

        assert_eq!(
            normalize(&current, &forecast, "London", now).unwrap(),
            normalize(&current, &forecast, "London", now).unwrap()
        );
    }
}
