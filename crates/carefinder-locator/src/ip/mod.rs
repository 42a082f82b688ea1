//! IP geolocation tier.
//!
//! Providers are queried strictly one after another in priority order
//! (`ipapi.co`, then `ipinfo.io`). Each provider has its own response shape
//! and its own parser; the first provider yielding a valid coordinate wins and
//! the rest are never contacted. Failures are logged and skipped, never
//! retried.

mod formats;

use carefinder_core::Coordinate;
use reqwest::{Client, Url};

use crate::fetch::fetch_json;

/// A supported IP geolocation provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IpProvider {
    /// `ipapi.co`, reporting `{latitude, longitude, city}`.
    IpApi,
    /// `ipinfo.io`, reporting `{loc: "lat,lng", city}`.
    IpInfo,
}

impl IpProvider {
    /// Fixed query order.
    pub const PRIORITY: [IpProvider; 2] = [IpProvider::IpApi, IpProvider::IpInfo];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            IpProvider::IpApi => "ipapi.co",
            IpProvider::IpInfo => "ipinfo.io",
        }
    }

    /// Extracts a coordinate (and city, if present) from this provider's
    /// response shape. Returns `None` for anything else.
    #[must_use]
    pub fn parse(self, payload: &serde_json::Value) -> Option<(Coordinate, Option<String>)> {
        match self {
            IpProvider::IpApi => formats::parse_ipapi(payload),
            IpProvider::IpInfo => formats::parse_ipinfo(payload),
        }
    }
}

impl std::fmt::Display for IpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A provider paired with the URL it is queried at.
#[derive(Debug, Clone)]
pub struct IpEndpoint {
    pub provider: IpProvider,
    pub url: Url,
}

/// Coordinate obtained from IP geolocation.
#[derive(Debug, Clone, PartialEq)]
pub struct IpFix {
    pub provider: IpProvider,
    pub coordinate: Coordinate,
    pub city: Option<String>,
}

/// Query each endpoint in order until one yields a valid coordinate.
///
/// Returns `None` when every provider failed (network error, non-2xx status,
/// unexpected shape, or out-of-range coordinate).
pub(crate) async fn resolve_by_ip(client: &Client, endpoints: &[IpEndpoint]) -> Option<IpFix> {
    for endpoint in endpoints {
        let provider = endpoint.provider;
        let payload = match fetch_json(client, endpoint.url.clone()).await {
            Ok(payload) => payload,
            Err(error) => {
                tracing::warn!(%provider, %error, "IP geolocation request failed");
                continue;
            }
        };

        match provider.parse(&payload) {
            Some((coordinate, city)) => {
                tracing::debug!(%provider, %coordinate, city = city.as_deref(), "resolved location by IP");
                return Some(IpFix {
                    provider,
                    coordinate,
                    city,
                });
            }
            None => {
                tracing::warn!(%provider, "IP geolocation response had no usable coordinate");
            }
        }
    }

    None
}
