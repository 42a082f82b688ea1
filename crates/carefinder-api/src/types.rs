//! Backend request and response types.
//!
//! Every backend response carries a top-level `success` flag; when it is
//! `false` an `error` string explains why.

use carefinder_core::Facility;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// POST /hospitals/nearby
// ---------------------------------------------------------------------------

/// Body of a nearby-facility lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyRequest {
    pub lat: f64,
    pub lng: f64,
    /// Search radius in metres.
    pub radius: u32,
}

/// Response to a nearby-facility lookup.
///
/// `data` is ordered by the backend (nearest first); clients present it as-is.
#[derive(Debug, Deserialize)]
pub struct NearbyResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<Facility>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// POST /chatbot/message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One prior exchange sent along with a new chatbot message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub message: &'a str,
    pub conversation_history: &'a [ChatTurn],
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}
