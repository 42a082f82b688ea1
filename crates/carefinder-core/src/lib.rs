pub mod app_config;
mod config;
pub mod facility;
pub mod geo;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use facility::Facility;
pub use geo::{haversine_km, Coordinate, CoordinateError};

/// Search radius, in metres, sent with every nearby-facility lookup.
pub const DEFAULT_SEARCH_RADIUS_M: u32 = 25_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
