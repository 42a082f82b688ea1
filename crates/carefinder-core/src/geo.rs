//! Validated WGS84 coordinates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Why a latitude/longitude pair was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    #[error("latitude {0} is not a finite number")]
    NonFiniteLatitude(f64),

    #[error("longitude {0} is not a finite number")]
    NonFiniteLongitude(f64),

    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// A latitude/longitude pair that has passed range validation.
///
/// The only way to obtain one is [`Coordinate::new`] (or deserializing, which
/// goes through the same check), so anything holding a `Coordinate` can rely
/// on both components being finite and in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoordinateError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    /// Validates and builds a coordinate.
    ///
    /// # Errors
    ///
    /// Returns a [`CoordinateError`] if either component is NaN or infinite,
    /// or if latitude is outside `[-90, 90]` or longitude outside `[-180, 180]`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() {
            return Err(CoordinateError::NonFiniteLatitude(latitude));
        }
        if !longitude.is_finite() {
            return Err(CoordinateError::NonFiniteLongitude(longitude));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parses a `"lat,lng"` pair such as `"40.7128,-74.0060"`.
    ///
    /// Returns `None` when the text is not two comma-separated numbers or the
    /// numbers fail range validation.
    #[must_use]
    pub fn parse_pair(text: &str) -> Option<Self> {
        let (lat, lng) = text.split_once(',')?;
        let lat = lat.trim().parse::<f64>().ok()?;
        let lng = lng.trim().parse::<f64>().ok()?;
        Self::new(lat, lng).ok()
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4},{:.4}", self.latitude, self.longitude)
    }
}

/// Great-circle distance between two coordinates in kilometres.
#[must_use]
pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lng = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_boundary_values() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        for lat in [90.000_001, -90.5, 120.0, -1000.0] {
            assert_eq!(
                Coordinate::new(lat, 0.0),
                Err(CoordinateError::LatitudeOutOfRange(lat))
            );
        }
    }

    #[test]
    fn rejects_out_of_range_longitude() {
        for lng in [180.000_001, -180.5, 360.0] {
            assert_eq!(
                Coordinate::new(0.0, lng),
                Err(CoordinateError::LongitudeOutOfRange(lng))
            );
        }
    }

    #[test]
    fn rejects_nan_and_infinity() {
        assert!(matches!(
            Coordinate::new(f64::NAN, 0.0),
            Err(CoordinateError::NonFiniteLatitude(_))
        ));
        assert!(matches!(
            Coordinate::new(0.0, f64::INFINITY),
            Err(CoordinateError::NonFiniteLongitude(_))
        ));
    }

    #[test]
    fn parse_pair_reads_ipinfo_style_loc() {
        let coord = Coordinate::parse_pair("40.7128,-74.0060").expect("valid pair");
        assert!((coord.latitude() - 40.7128).abs() < f64::EPSILON);
        assert!((coord.longitude() + 74.006).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_pair_tolerates_spaces() {
        assert!(Coordinate::parse_pair(" 12.97 , 77.59 ").is_some());
    }

    #[test]
    fn parse_pair_rejects_garbage() {
        assert!(Coordinate::parse_pair("").is_none());
        assert!(Coordinate::parse_pair("40.7128").is_none());
        assert!(Coordinate::parse_pair("north,west").is_none());
        assert!(Coordinate::parse_pair("95.0,10.0").is_none());
    }

    #[test]
    fn deserialize_validates_range() {
        let ok: Result<Coordinate, _> =
            serde_json::from_str(r#"{"latitude": 13.03, "longitude": 77.55}"#);
        assert!(ok.is_ok());

        let bad: Result<Coordinate, _> =
            serde_json::from_str(r#"{"latitude": 91.0, "longitude": 77.55}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn haversine_is_zero_for_same_point() {
        let p = Coordinate::new(40.7128, -74.006).unwrap();
        assert!(haversine_km(p, p).abs() < 1e-9);
    }

    #[test]
    fn haversine_new_york_to_london() {
        let nyc = Coordinate::new(40.7128, -74.006).unwrap();
        let london = Coordinate::new(51.5074, -0.1278).unwrap();
        let km = haversine_km(nyc, london);
        assert!((km - 5570.0).abs() < 10.0, "got {km}");
    }
}
