//! Geographic coordinate types and distance math.
//!
//! Provides the validated [`Position`] type used throughout the safety
//! monitor, great-circle (haversine) distance in meters, and a flat-earth
//! bearing for short-range track derivation.
//!
//! # Distance metric
//!
//! All proximity thresholds in this crate are meter-denominated and computed
//! with the haversine formula. Raw coordinate-delta comparisons distort with
//! latitude and are not used.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum valid latitude in degrees.
pub const MIN_LAT: f64 = -90.0;
/// Maximum valid latitude in degrees.
pub const MAX_LAT: f64 = 90.0;
/// Minimum valid longitude in degrees.
pub const MIN_LON: f64 = -180.0;
/// Maximum valid longitude in degrees.
pub const MAX_LON: f64 = 180.0;

/// Mean Earth radius in meters, used by the haversine formula.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Errors from coordinate validation.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum CoordError {
    /// Latitude outside [-90, 90] degrees.
    #[error("invalid latitude {0} (expected -90.0..=90.0)")]
    InvalidLatitude(f64),

    /// Longitude outside [-180, 180] degrees.
    #[error("invalid longitude {0} (expected -180.0..=180.0)")]
    InvalidLongitude(f64),

    /// A coordinate component is NaN or infinite.
    #[error("coordinate is not a finite number")]
    NotFinite,
}

/// A geographic position in WGS84 degrees.
///
/// Fields are public for literal construction of trusted reference data;
/// anything arriving from an external source must pass [`Position::new`] or
/// [`Position::validate`] before entering distance math.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Position {
    /// Create a validated position.
    ///
    /// # Errors
    ///
    /// Returns [`CoordError`] when either component is non-finite or out of
    /// range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordError> {
        let position = Self {
            latitude,
            longitude,
        };
        position.validate()?;
        Ok(position)
    }

    /// Validate this position's components.
    ///
    /// # Errors
    ///
    /// Returns [`CoordError`] when either component is non-finite or out of
    /// range.
    pub fn validate(&self) -> Result<(), CoordError> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(CoordError::NotFinite);
        }
        if !(MIN_LAT..=MAX_LAT).contains(&self.latitude) {
            return Err(CoordError::InvalidLatitude(self.latitude));
        }
        if !(MIN_LON..=MAX_LON).contains(&self.longitude) {
            return Err(CoordError::InvalidLongitude(self.longitude));
        }
        Ok(())
    }

    /// Great-circle distance to another position, in meters.
    pub fn distance_m(&self, other: &Position) -> f64 {
        haversine_distance_m(self, other)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.5}, {:.5})", self.latitude, self.longitude)
    }
}

/// Haversine great-circle distance between two positions, in meters.
#[inline]
pub fn haversine_distance_m(a: &Position, b: &Position) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (dlon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Bearing from `from` to `to` using a flat-earth approximation.
///
/// Accurate enough for the short pedestrian-scale distances the track
/// history works with. Returns degrees in [0, 360), where 0 = North and
/// 90 = East.
#[inline]
pub fn bearing_deg(from: &Position, to: &Position) -> f64 {
    let dlat = to.latitude - from.latitude;
    let dlon = to.longitude - from.longitude;

    let bearing = dlon.atan2(dlat).to_degrees();
    if bearing < 0.0 {
        bearing + 360.0
    } else {
        bearing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_valid_position() {
        let position = Position::new(51.505, -0.09).unwrap();
        assert_eq!(position.latitude, 51.505);
        assert_eq!(position.longitude, -0.09);
    }

    #[test]
    fn test_new_rejects_out_of_range_latitude() {
        let result = Position::new(90.5, 0.0);
        assert!(matches!(result, Err(CoordError::InvalidLatitude(_))));
    }

    #[test]
    fn test_new_rejects_out_of_range_longitude() {
        let result = Position::new(0.0, -180.5);
        assert!(matches!(result, Err(CoordError::InvalidLongitude(_))));
    }

    #[test]
    fn test_new_rejects_non_finite() {
        assert_eq!(Position::new(f64::NAN, 0.0), Err(CoordError::NotFinite));
        assert_eq!(Position::new(0.0, f64::NAN), Err(CoordError::NotFinite));
        assert_eq!(
            Position::new(f64::INFINITY, 0.0),
            Err(CoordError::NotFinite)
        );
    }

    #[test]
    fn test_validate_literal() {
        let position = Position {
            latitude: 51.508,
            longitude: -0.11,
        };
        assert!(position.validate().is_ok());
    }

    #[test]
    fn test_haversine_zero_for_same_point() {
        let p = Position::new(51.505, -0.09).unwrap();
        assert_eq!(haversine_distance_m(&p, &p), 0.0);
    }

    #[test]
    fn test_haversine_known_distance() {
        // One degree of latitude is ~111.2 km everywhere.
        let a = Position::new(51.0, 0.0).unwrap();
        let b = Position::new(52.0, 0.0).unwrap();
        let distance = haversine_distance_m(&a, &b);
        assert!(
            (distance - 111_195.0).abs() < 200.0,
            "expected ~111.2km, got {distance}m"
        );
    }

    #[test]
    fn test_haversine_short_distance() {
        // 0.0001 degrees of latitude is ~11m.
        let a = Position::new(51.508, -0.11).unwrap();
        let b = Position::new(51.5081, -0.11).unwrap();
        let distance = haversine_distance_m(&a, &b);
        assert!(
            (5.0..20.0).contains(&distance),
            "expected ~11m, got {distance}m"
        );
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = Position::new(0.0, 0.0).unwrap();
        let north = Position::new(1.0, 0.0).unwrap();
        let east = Position::new(0.0, 1.0).unwrap();
        let south = Position::new(-1.0, 0.0).unwrap();
        let west = Position::new(0.0, -1.0).unwrap();

        assert!((bearing_deg(&origin, &north) - 0.0).abs() < 0.1);
        assert!((bearing_deg(&origin, &east) - 90.0).abs() < 0.1);
        assert!((bearing_deg(&origin, &south) - 180.0).abs() < 0.1);
        assert!((bearing_deg(&origin, &west) - 270.0).abs() < 0.1);
    }

    #[test]
    fn test_display_format() {
        let position = Position::new(51.505, -0.09).unwrap();
        assert_eq!(format!("{}", position), "(51.50500, -0.09000)");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_valid_range_always_accepted(
                lat in MIN_LAT..=MAX_LAT,
                lon in MIN_LON..=MAX_LON
            ) {
                prop_assert!(Position::new(lat, lon).is_ok());
            }

            #[test]
            fn test_out_of_range_latitude_rejected(
                lat in 90.001..1000.0_f64,
                lon in MIN_LON..=MAX_LON
            ) {
                let result = Position::new(lat, lon);
                prop_assert!(matches!(result, Err(CoordError::InvalidLatitude(_))));
            }

            #[test]
            fn test_distance_symmetric(
                lat_a in -85.0..85.0_f64,
                lon_a in -179.0..179.0_f64,
                lat_b in -85.0..85.0_f64,
                lon_b in -179.0..179.0_f64
            ) {
                let a = Position::new(lat_a, lon_a)?;
                let b = Position::new(lat_b, lon_b)?;
                let ab = haversine_distance_m(&a, &b);
                let ba = haversine_distance_m(&b, &a);
                prop_assert!((ab - ba).abs() < 1e-6);
            }

            #[test]
            fn test_distance_non_negative(
                lat_a in -85.0..85.0_f64,
                lon_a in -179.0..179.0_f64,
                lat_b in -85.0..85.0_f64,
                lon_b in -179.0..179.0_f64
            ) {
                let a = Position::new(lat_a, lon_a)?;
                let b = Position::new(lat_b, lon_b)?;
                prop_assert!(haversine_distance_m(&a, &b) >= 0.0);
            }

            #[test]
            fn test_bearing_in_range(
                lat_a in -85.0..85.0_f64,
                lon_a in -179.0..179.0_f64,
                lat_b in -85.0..85.0_f64,
                lon_b in -179.0..179.0_f64
            ) {
                let a = Position::new(lat_a, lon_a)?;
                let b = Position::new(lat_b, lon_b)?;
                let bearing = bearing_deg(&a, &b);
                prop_assert!((0.0..360.0).contains(&bearing));
            }
        }
    }
}
