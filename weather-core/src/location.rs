//! The "where am I" capability behind the geolocate control.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{GeolocationError, model::Coordinates};

#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, GeolocationError>;
}

/// Serves a position fixed by configuration or command-line flags.
#[derive(Debug, Clone, Default)]
pub struct FixedGeolocator {
    position: Option<Coordinates>,
}

impl FixedGeolocator {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        let position = self.position.ok_or(GeolocationError::Unsupported)?;

        if !position.is_valid() {
            return Err(GeolocationError::PermissionDenied(format!(
                "configured position ({}, {}) is not a valid coordinate",
                position.lat, position.lon
            )));
        }

        Ok(position)
    }
}
