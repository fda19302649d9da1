use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Label used when a coordinate lookup resolves to no named place.
pub const CURRENT_LOCATION_LABEL: &str = "Current Location";

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// What the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coordinates(Coordinates),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSnapshot {
    /// °C
    pub temperature: i32,
    pub condition: String,
    /// km/h
    pub wind_speed: i32,
    /// %
    pub humidity: u8,
    /// °C
    pub feels_like: i32,
    /// km
    pub visibility: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyPoint {
    pub time: String,
    pub temperature: i32,
    pub condition: String,
    /// 0..=100
    pub precipitation_chance: u8,
}

/// One forecast day. Fields are private so `min_temp <= max_temp` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPoint {
    date: NaiveDate,
    max_temp: i32,
    min_temp: i32,
    condition: String,
}

impl DailyPoint {
    /// The two bounds may be given in either order.
    pub fn new(date: NaiveDate, a: i32, b: i32, condition: impl Into<String>) -> Self {
        Self {
            date,
            max_temp: a.max(b),
            min_temp: a.min(b),
            condition: condition.into(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn max_temp(&self) -> i32 {
        self.max_temp
    }

    pub fn min_temp(&self) -> i32 {
        self.min_temp
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }
}

/// The unit handed between the sources and the view layer. Rebuilt on every fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecord {
    pub city: String,
    pub current: CurrentSnapshot,
    pub hourly: Vec<HourlyPoint>,
    pub forecast: Vec<DailyPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_point_orders_bounds() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 2).expect("valid date");
        let day = DailyPoint::new(date, 4, 17, "Rain");
        assert_eq!(day.min_temp(), 4);
        assert_eq!(day.max_temp(), 17);

        let same = DailyPoint::new(date, 17, 4, "Rain");
        assert_eq!(day, same);
    }

    #[test]
    fn coordinates_range_check() {
        assert!(Coordinates::new(51.5, -0.12).is_valid());
        assert!(Coordinates::new(-90.0, 180.0).is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, -180.5).is_valid());
        assert!(!Coordinates::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn record_serializes_with_camel_case_fields() {
        let record = WeatherRecord {
            city: "Oslo".to_string(),
            current: CurrentSnapshot {
                temperature: 3,
                condition: "Snow".to_string(),
                wind_speed: 12,
                humidity: 80,
                feels_like: -1,
                visibility: 6,
            },
            hourly: vec![],
            forecast: vec![],
        };

        let json = serde_json::to_value(&record).expect("serializable");
        assert_eq!(json["current"]["feelsLike"], -1);
        assert_eq!(json["current"]["windSpeed"], 12);
    }
}
