use carefinder_core::CoordinateError;
use thiserror::Error;

/// Why the device geolocation tier produced no usable coordinate.
///
/// None of these is terminal on its own: the finder falls back to IP
/// geolocation and only reports the device failure if that also fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeviceError {
    #[error("geolocation is not supported by this runtime")]
    Unsupported,

    #[error("location permission was denied")]
    PermissionDenied,

    #[error("device position is unavailable")]
    PositionUnavailable,

    #[error("timed out waiting for a device position")]
    Timeout,

    #[error("device reported an invalid coordinate: {0}")]
    InvalidCoordinate(#[from] CoordinateError),
}

/// Failures of the free-text geocoding service.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("geocoder returned an unexpected payload: {0}")]
    Payload(String),

    #[error("geocoder returned no results")]
    NoResults,

    #[error("geocoder returned a malformed coordinate (lat={lat:?}, lon={lon:?})")]
    MalformedCoordinate { lat: String, lon: String },
}

/// Terminal outcomes of a resolution attempt.
///
/// Every variant is recoverable: the caller renders it as a message and the
/// user may retry with either trigger.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocatorError {
    #[error("location access requires a secure origin (https or localhost), got {origin}")]
    InsecureContext { origin: String },

    #[error("location unavailable: device geolocation failed ({device}) and no IP geolocation provider answered")]
    AllIpProvidersFailed { device: DeviceError },

    #[error("please enter a location to search")]
    EmptyQuery,

    #[error("could not find location \"{query}\"")]
    LocationNotFound { query: String },

    #[error("could not reach the facility service: {reason}")]
    BackendUnreachable { reason: String },

    #[error("failed to set up HTTP clients: {0}")]
    Setup(String),
}

impl LocatorError {
    /// Short machine-readable name of the condition.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            LocatorError::InsecureContext { .. } => "insecure_context",
            LocatorError::AllIpProvidersFailed { .. } => "all_ip_providers_failed",
            LocatorError::EmptyQuery => "empty_query",
            LocatorError::LocationNotFound { .. } => "location_not_found",
            LocatorError::BackendUnreachable { .. } => "backend_unreachable",
            LocatorError::Setup(_) => "setup",
        }
    }

    /// Whether the failure happened before a coordinate was resolved.
    #[must_use]
    pub fn is_location_failure(&self) -> bool {
        matches!(
            self,
            LocatorError::InsecureContext { .. }
                | LocatorError::AllIpProvidersFailed { .. }
                | LocatorError::EmptyQuery
                | LocatorError::LocationNotFound { .. }
        )
    }
}

impl From<carefinder_api::ApiError> for LocatorError {
    fn from(error: carefinder_api::ApiError) -> Self {
        LocatorError::BackendUnreachable {
            reason: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_not_found_names_query() {
        let err = LocatorError::LocationNotFound {
            query: "Nowhere, XX".to_string(),
        };
        assert_eq!(err.to_string(), "could not find location \"Nowhere, XX\"");
        assert!(err.is_location_failure());
    }

    #[test]
    fn all_ip_providers_failed_includes_device_cause() {
        let err = LocatorError::AllIpProvidersFailed {
            device: DeviceError::PermissionDenied,
        };
        assert!(err.to_string().contains("permission was denied"));
        assert_eq!(err.kind(), "all_ip_providers_failed");
    }

    #[test]
    fn backend_error_is_not_a_location_failure() {
        let err = LocatorError::from(carefinder_api::ApiError::Backend("quota".to_string()));
        assert!(matches!(err, LocatorError::BackendUnreachable { ref reason } if reason.contains("quota")));
        assert!(!err.is_location_failure());
    }

    #[test]
    fn device_invalid_coordinate_wraps_cause() {
        let cause = carefinder_core::Coordinate::new(95.0, 0.0).unwrap_err();
        let err = DeviceError::from(cause);
        assert_eq!(
            err,
            DeviceError::InvalidCoordinate(CoordinateError::LatitudeOutOfRange(95.0))
        );
    }
}
