//! Weather sources and construction of the configured one.

use crate::{
    WeatherConfig, WeatherError,
    model::{Coordinates, LocationQuery, WeatherRecord},
    provider::openweather::OpenWeatherSource,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// A source of normalized weather records.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch_by_city(&self, name: &str) -> Result<WeatherRecord, WeatherError>;

    async fn fetch_by_coordinates(
        &self,
        coordinates: Coordinates,
    ) -> Result<WeatherRecord, WeatherError>;

    async fn fetch(&self, query: &LocationQuery) -> Result<WeatherRecord, WeatherError> {
        match query {
            LocationQuery::City(name) => self.fetch_by_city(name).await,
            LocationQuery::Coordinates(coordinates) => self.fetch_by_coordinates(*coordinates).await,
        }
    }
}

/// Construct the weather source from config.
///
/// A missing API key is not an error here; each fetch reports it instead.
pub fn source_from_config(config: &WeatherConfig) -> Result<Box<dyn WeatherSource>, WeatherError> {
    Ok(Box::new(OpenWeatherSource::new(config.clone())?))
}
