pub mod client;
pub mod error;
pub mod types;

pub use client::BackendClient;
pub use error::ApiError;
pub use types::{ChatResponse, ChatRole, ChatTurn, NearbyRequest, NearbyResponse};
