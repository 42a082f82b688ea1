//! Low-level HTTP helpers shared by the IP and geocoding tiers.

use std::time::Duration;

use reqwest::{Client, Url};

/// Builds the HTTP client used for third-party location services.
pub(crate) fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()
}

/// Fetch a URL and parse the body as JSON. Non-2xx statuses are errors.
pub(crate) async fn fetch_json(
    client: &Client,
    url: Url,
) -> Result<serde_json::Value, reqwest::Error> {
    client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await?
        .error_for_status()?
        .json::<serde_json::Value>()
        .await
}
