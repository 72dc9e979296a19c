//! Ping coordinates
//!
//! Latitude and longitude are stored as plain reals. No range is enforced,
//! the only requirement is that both values are finite.

use serde::Serialize;

use super::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    lat: f64,
    lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Result<Self, ValidationError> {
        if !lat.is_finite() {
            return Err(ValidationError::NotFinite { field: "lat" });
        }
        if !lon.is_finite() {
            return Err(ValidationError::NotFinite { field: "lon" });
        }
        Ok(Self { lat, lon })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}
