//! Device geolocation tier.
//!
//! The runtime supplies a [`DeviceLocator`]; the finder validates whatever it
//! returns and falls back to IP geolocation on any failure.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::DeviceError;

/// Options passed with every device position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    /// Upper bound on how long the device may take to answer.
    pub timeout: Duration,
    /// A cached position younger than this is acceptable.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(5 * 60),
        }
    }
}

/// A raw position reported by the device, not yet range-checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DevicePosition {
    pub latitude: f64,
    pub longitude: f64,
    /// Accuracy radius in metres, when the device reports one.
    pub accuracy_m: Option<f64>,
}

/// Source of the device's own position (GPS, OS location service, ...).
#[async_trait]
pub trait DeviceLocator: Send + Sync {
    /// Requests the current position.
    ///
    /// Implementations should honour `options`; the finder additionally
    /// enforces `options.timeout` around the call.
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<DevicePosition, DeviceError>;
}

/// Runtime without any geolocation capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDeviceLocation;

#[async_trait]
impl DeviceLocator for NoDeviceLocation {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<DevicePosition, DeviceError> {
        Err(DeviceError::Unsupported)
    }
}

/// A position fix supplied up front, e.g. read from a GPS receiver by the
/// caller and passed on the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedDeviceLocation {
    position: DevicePosition,
}

impl FixedDeviceLocation {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            position: DevicePosition {
                latitude,
                longitude,
                accuracy_m: None,
            },
        }
    }
}

#[async_trait]
impl DeviceLocator for FixedDeviceLocation {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<DevicePosition, DeviceError> {
        Ok(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_match_browser_request() {
        let options = PositionOptions::default();
        assert!(options.enable_high_accuracy);
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(options.maximum_age, Duration::from_secs(300));
    }

    #[tokio::test]
    async fn no_device_reports_unsupported() {
        let result = NoDeviceLocation
            .current_position(&PositionOptions::default())
            .await;
        assert_eq!(result, Err(DeviceError::Unsupported));
    }

    #[tokio::test]
    async fn fixed_device_returns_its_position_unvalidated() {
        let device = FixedDeviceLocation::new(123.0, 4.0);
        let position = device
            .current_position(&PositionOptions::default())
            .await
            .unwrap();
        assert!((position.latitude - 123.0).abs() < f64::EPSILON);
    }
}
