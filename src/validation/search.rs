use garde::Validate;

use crate::error::{AppError, Result};

/// Default search radius in metres.
pub const DEFAULT_RADIUS_M: u32 = 1000;
/// Smallest accepted radius in metres.
pub const MIN_RADIUS_M: u32 = 100;
/// Largest accepted radius in metres.
pub const MAX_RADIUS_M: u32 = 100_000;

/// A coordinate-radius query as entered by the user.
#[derive(Debug, Clone, Copy, PartialEq, Validate)]
pub struct CoordinateQuery {
    #[garde(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[garde(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    /// Radius in metres.
    #[garde(range(min = 100, max = 100_000))]
    pub radius_m: u32,
}

impl CoordinateQuery {
    pub fn new(latitude: f64, longitude: f64, radius_m: u32) -> Self {
        Self {
            latitude,
            longitude,
            radius_m,
        }
    }

    /// The radius as sent to the API.
    pub fn radius_km(&self) -> f64 {
        f64::from(self.radius_m) / 1000.0
    }
}

/// Validates a coordinate query.
pub fn validate_coordinates(query: &CoordinateQuery) -> Result<()> {
    if !query.latitude.is_finite() || !query.longitude.is_finite() {
        return Err(AppError::Validation(
            "Coordinates must be finite numbers".to_string(),
        ));
    }
    query.validate()?;
    Ok(())
}

/// Validates a radius given without coordinates.
pub fn validate_radius(radius_m: u32) -> Result<()> {
    if !(MIN_RADIUS_M..=MAX_RADIUS_M).contains(&radius_m) {
        return Err(AppError::Validation(format!(
            "Radius must be between {} and {} metres",
            MIN_RADIUS_M, MAX_RADIUS_M
        )));
    }
    Ok(())
}

/// Validates an address search: the address must not be blank.
pub fn validate_address(address: &str) -> Result<()> {
    if address.trim().is_empty() {
        return Err(AppError::Validation("Address must not be blank".to_string()));
    }
    Ok(())
}

/// Validates a general search: it needs coordinates, a non-blank address,
/// or both.
pub fn validate_area(address: Option<&str>, coordinates: Option<(f64, f64)>) -> Result<()> {
    if coordinates.is_none() && address.is_none_or(|a| a.trim().is_empty()) {
        return Err(AppError::Validation(
            "Enter an address or coordinates".to_string(),
        ));
    }
    if let Some(address) = address {
        validate_address(address)?;
    }
    Ok(())
}
