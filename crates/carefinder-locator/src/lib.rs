//! Location resolution and nearby-facility lookup.
//!
//! [`FacilityFinder`] turns a [`Trigger`] into a coordinate, trying device
//! geolocation, then IP geolocation providers in priority order, or geocoding
//! a manual query, and then asks the backend for facilities around it.

pub mod device;
pub mod error;
pub(crate) mod fetch;
pub mod finder;
pub mod geocode;
pub mod ip;
pub mod origin;
pub mod state;

pub use device::{
    DeviceLocator, DevicePosition, FixedDeviceLocation, NoDeviceLocation, PositionOptions,
};
pub use error::{DeviceError, GeocodeError, LocatorError};
pub use finder::{FacilityFinder, Resolution, Trigger};
pub use geocode::{GeocodedPlace, Geocoder};
pub use ip::{IpEndpoint, IpFix, IpProvider};
pub use origin::is_secure_origin;
pub use state::{Condition, FinderState, LocationSource};
