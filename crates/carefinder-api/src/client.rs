//! HTTP client for the CareFinder REST backend.
//!
//! Wraps `reqwest` with backend-specific envelope handling: every endpoint
//! returns `{"success": bool, ...}` and a `false` flag is surfaced as
//! [`ApiError::Backend`] carrying the backend's `error` text. Requests are
//! never retried.

use std::time::Duration;

use carefinder_core::{Coordinate, Facility};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::types::{ChatRequest, ChatResponse, ChatTurn, NearbyRequest, NearbyResponse};

/// Client for the CareFinder backend.
///
/// Use [`BackendClient::new`] with the configured base URL (for example
/// `http://localhost:5000/api`); tests point it at a wiremock server.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
}

impl BackendClient {
    /// Creates a new client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`ApiError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Normalise to exactly one trailing slash so `Url::join` appends
        // endpoint paths instead of replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Looks up facilities within `radius_m` metres of `coordinate`.
    ///
    /// The returned list keeps the backend's order. An empty list is a
    /// successful answer, not an error.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Backend`] if the backend reports `success: false`.
    /// - [`ApiError::Http`] on network failure.
    /// - [`ApiError::UnexpectedStatus`] on a non-2xx status without an error body.
    /// - [`ApiError::Deserialize`] if the response does not match the expected shape.
    pub async fn nearby_facilities(
        &self,
        coordinate: Coordinate,
        radius_m: u32,
    ) -> Result<Vec<Facility>, ApiError> {
        let body = NearbyRequest {
            lat: coordinate.latitude(),
            lng: coordinate.longitude(),
            radius: radius_m,
        };
        let response: NearbyResponse = self.post_json("hospitals/nearby", &body).await?;
        if !response.success {
            return Err(ApiError::Backend(
                response
                    .error
                    .unwrap_or_else(|| "nearby lookup failed".to_string()),
            ));
        }

        tracing::debug!(
            %coordinate,
            radius_m,
            count = response.data.len(),
            message = response.message.as_deref().unwrap_or(""),
            "nearby lookup returned"
        );
        Ok(response.data)
    }

    /// Sends one message to the medical assistant with the prior turns.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Backend`] if the backend reports `success: false` or
    ///   omits the reply text.
    /// - [`ApiError::Http`], [`ApiError::UnexpectedStatus`] or
    ///   [`ApiError::Deserialize`] as for [`Self::nearby_facilities`].
    pub async fn send_chat_message(
        &self,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<String, ApiError> {
        let body = ChatRequest {
            message: message.trim(),
            conversation_history: history,
        };
        let response: ChatResponse = self.post_json("chatbot/message", &body).await?;
        match (response.success, response.response) {
            (true, Some(reply)) => Ok(reply),
            _ => Err(ApiError::Backend(
                response
                    .error
                    .unwrap_or_else(|| "assistant returned no reply".to_string()),
            )),
        }
    }

    /// Returns `true` when `GET /health` answers with a 2xx status.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the backend cannot be reached at all.
    pub async fn health(&self) -> Result<bool, ApiError> {
        let url = self.endpoint("health")?;
        let response = self.client.get(url).send().await?;
        Ok(response.status().is_success())
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    /// Sends a JSON POST and decodes the JSON body.
    ///
    /// The body is read for non-2xx statuses too: the backend reports
    /// validation failures as `400` with `{"success": false, "error": ...}`.
    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let response = self.client.post(url.clone()).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(Self::status_error(status, &url, &text));
        }

        serde_json::from_str(&text).map_err(|e| ApiError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }

    fn status_error(status: StatusCode, url: &Url, text: &str) -> ApiError {
        let message = serde_json::from_str::<serde_json::Value>(text)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_owned)
            });
        match message {
            Some(msg) => ApiError::Backend(msg),
            None => ApiError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> BackendClient {
        BackendClient::new(base_url, 5, "carefinder-test")
            .expect("client construction should not fail")
    }

    #[test]
    fn endpoint_appends_to_base_path() {
        let client = test_client("http://localhost:5000/api");
        let url = client.endpoint("hospitals/nearby").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/hospitals/nearby");
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let client = test_client("http://localhost:5000/api/");
        let url = client.endpoint("health").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/health");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = BackendClient::new("not a url", 5, "carefinder-test");
        assert!(matches!(result, Err(ApiError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn status_error_prefers_backend_message() {
        let url = Url::parse("http://localhost/api/hospitals/nearby").unwrap();
        let err = BackendClient::status_error(
            StatusCode::BAD_REQUEST,
            &url,
            r#"{"success": false, "error": "Latitude and longitude are required"}"#,
        );
        assert!(
            matches!(err, ApiError::Backend(ref m) if m == "Latitude and longitude are required")
        );
    }

    #[test]
    fn status_error_falls_back_to_status_code() {
        let url = Url::parse("http://localhost/api/hospitals/nearby").unwrap();
        let err = BackendClient::status_error(StatusCode::BAD_GATEWAY, &url, "<html>");
        assert!(matches!(err, ApiError::UnexpectedStatus { status: 502, .. }));
    }
}
