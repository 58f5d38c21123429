//! Validation utilities for recommendation request parameters
//!
//! All validators reject bad input before any database work happens, so a
//! request with an impossible coordinate or a non-positive radius never
//! reaches the query layer.

use crate::error::RecsError;

/// Validate latitude is within the WGS84 range
///
/// # Examples
///
/// ```
/// use grocery_recs_core::validation::validate_latitude;
///
/// assert!(validate_latitude(47.3769).is_ok());
/// assert!(validate_latitude(-90.0).is_ok());
/// assert!(validate_latitude(90.0).is_ok());
/// assert!(validate_latitude(91.0).is_err());
/// assert!(validate_latitude(f64::NAN).is_err());
/// ```
pub fn validate_latitude(lat: f64) -> Result<(), RecsError> {
    if (-90.0..=90.0).contains(&lat) {
        Ok(())
    } else {
        Err(RecsError::validation_field(
            format!("Latitude must be between -90 and 90, got {}", lat),
            "lat",
        ))
    }
}

/// Validate longitude is within the WGS84 range
///
/// # Examples
///
/// ```
/// use grocery_recs_core::validation::validate_longitude;
///
/// assert!(validate_longitude(8.5417).is_ok());
/// assert!(validate_longitude(-180.0).is_ok());
/// assert!(validate_longitude(180.0).is_ok());
/// assert!(validate_longitude(181.0).is_err());
/// ```
pub fn validate_longitude(lon: f64) -> Result<(), RecsError> {
    if (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        Err(RecsError::validation_field(
            format!("Longitude must be between -180 and 180, got {}", lon),
            "lon",
        ))
    }
}

/// Validate search radius is a finite positive distance in kilometres
///
/// # Examples
///
/// ```
/// use grocery_recs_core::validation::validate_radius_km;
///
/// assert!(validate_radius_km(5.0).is_ok());
/// assert!(validate_radius_km(0.0).is_err());
/// assert!(validate_radius_km(-2.5).is_err());
/// assert!(validate_radius_km(f64::INFINITY).is_err());
/// ```
pub fn validate_radius_km(radius_km: f64) -> Result<(), RecsError> {
    if radius_km.is_finite() && radius_km > 0.0 {
        Ok(())
    } else {
        Err(RecsError::validation_field(
            format!("Radius must be a positive distance, got {}", radius_km),
            "radius_km",
        ))
    }
}

/// Validate result limit is positive
///
/// # Examples
///
/// ```
/// use grocery_recs_core::validation::validate_limit;
///
/// assert!(validate_limit(20).is_ok());
/// assert!(validate_limit(0).is_err());
/// assert!(validate_limit(-5).is_err());
/// ```
pub fn validate_limit(limit: i64) -> Result<(), RecsError> {
    if limit > 0 {
        Ok(())
    } else {
        Err(RecsError::validation_field(
            format!("Limit must be positive, got {}", limit),
            "limit",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latitude_validation() {
        assert!(validate_latitude(0.0).is_ok());
        assert!(validate_latitude(47.3769).is_ok());
        assert!(validate_latitude(-90.0).is_ok());
        assert!(validate_latitude(90.0).is_ok());

        assert!(validate_latitude(90.0001).is_err());
        assert!(validate_latitude(-91.0).is_err());
        assert!(validate_latitude(f64::NAN).is_err());
        assert!(validate_latitude(f64::INFINITY).is_err());
    }

    #[test]
    fn test_longitude_validation() {
        assert!(validate_longitude(0.0).is_ok());
        assert!(validate_longitude(8.5417).is_ok());
        assert!(validate_longitude(-180.0).is_ok());
        assert!(validate_longitude(180.0).is_ok());

        assert!(validate_longitude(180.5).is_err());
        assert!(validate_longitude(-200.0).is_err());
        assert!(validate_longitude(f64::NAN).is_err());
    }

    #[test]
    fn test_radius_validation() {
        assert!(validate_radius_km(5.0).is_ok());
        assert!(validate_radius_km(0.001).is_ok());

        assert!(validate_radius_km(0.0).is_err());
        assert!(validate_radius_km(-2.5).is_err());
        assert!(validate_radius_km(f64::NAN).is_err());
        assert!(validate_radius_km(f64::INFINITY).is_err());
    }

    #[test]
    fn test_limit_validation() {
        assert!(validate_limit(1).is_ok());
        assert!(validate_limit(20).is_ok());

        assert!(validate_limit(0).is_err());
        assert!(validate_limit(-5).is_err());
    }

    #[test]
    fn test_validation_error_names_field() {
        match validate_radius_km(-1.0).unwrap_err() {
            RecsError::ValidationError { field, .. } => {
                assert_eq!(field.as_deref(), Some("radius_km"));
            }
            _ => panic!("Expected ValidationError"),
        }
    }
}
