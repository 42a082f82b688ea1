//! The facility finder controller.
//!
//! Resolves a coordinate through the tiers (device → IP → manual geocoding),
//! asks the backend for nearby facilities, and owns the displayed
//! [`FinderState`].
//!
//! Attempts are never cancelled. Each one takes a ticket when it starts and
//! only commits its outcome to the displayed state if no newer attempt has
//! started in the meantime, so the most recently initiated attempt always
//! wins regardless of completion order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use carefinder_api::BackendClient;
use carefinder_core::{AppConfig, Coordinate, Facility};
use reqwest::{Client, Url};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::device::{DeviceLocator, PositionOptions};
use crate::error::{DeviceError, LocatorError};
use crate::geocode::Geocoder;
use crate::ip::{resolve_by_ip, IpEndpoint, IpProvider};
use crate::origin::is_secure_origin;
use crate::state::{FinderState, LocationSource};

/// What started a resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Device geolocation, falling back to IP geolocation.
    UseCurrentLocation,
    /// Free text to geocode, e.g. `"Mathikere, Bangalore"`.
    ManualQuery(String),
}

/// Successful outcome of [`FacilityFinder::resolve_and_rank`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub coordinate: Coordinate,
    pub source: LocationSource,
    /// In backend order; never re-sorted.
    pub facilities: Vec<Facility>,
}

pub struct FacilityFinder {
    origin: String,
    device: Arc<dyn DeviceLocator>,
    position_options: PositionOptions,
    http: Client,
    ip_endpoints: Vec<IpEndpoint>,
    geocoder: Geocoder,
    backend: BackendClient,
    radius_m: u32,
    state: RwLock<FinderState>,
    generation: AtomicU64,
}

impl FacilityFinder {
    /// Builds a finder from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LocatorError::Setup`] if an HTTP client cannot be built or a
    /// configured URL is invalid.
    pub fn new(config: &AppConfig, device: Arc<dyn DeviceLocator>) -> Result<Self, LocatorError> {
        let setup = |e: &dyn std::fmt::Display| LocatorError::Setup(e.to_string());

        let http = crate::fetch::build_client(config.request_timeout_secs, &config.user_agent)
            .map_err(|e| setup(&e))?;
        let backend = BackendClient::new(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )
        .map_err(|e| setup(&e))?;
        let geocoder = Geocoder::new(http.clone(), &config.geocoder_url).map_err(|e| setup(&e))?;

        let ip_endpoints = IpProvider::PRIORITY
            .iter()
            .map(|&provider| {
                let raw = match provider {
                    IpProvider::IpApi => &config.ipapi_url,
                    IpProvider::IpInfo => &config.ipinfo_url,
                };
                Url::parse(raw)
                    .map(|url| IpEndpoint { provider, url })
                    .map_err(|e| setup(&format!("invalid {provider} URL '{raw}': {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            origin: config.origin.clone(),
            device,
            position_options: PositionOptions::default(),
            http,
            ip_endpoints,
            geocoder,
            backend,
            radius_m: config.search_radius_m,
            state: RwLock::new(FinderState::default()),
            generation: AtomicU64::new(0),
        })
    }

    /// Overrides the device request options (the defaults mirror a browser
    /// high-accuracy request with a 10 s timeout and 5 min cache tolerance).
    #[must_use]
    pub fn with_position_options(mut self, options: PositionOptions) -> Self {
        self.position_options = options;
        self
    }

    /// Snapshot of the displayed state.
    pub async fn state(&self) -> FinderState {
        self.state.read().await.clone()
    }

    /// Resolves a coordinate for `trigger` and fetches nearby facilities.
    ///
    /// The displayed state is replaced with the outcome unless a newer
    /// attempt started while this one was running.
    ///
    /// # Errors
    ///
    /// - [`LocatorError::InsecureContext`] if the origin may not use geolocation.
    /// - [`LocatorError::AllIpProvidersFailed`] if device and IP tiers both failed.
    /// - [`LocatorError::EmptyQuery`] for a blank manual query.
    /// - [`LocatorError::LocationNotFound`] if the query could not be geocoded.
    /// - [`LocatorError::BackendUnreachable`] if the facility lookup failed.
    pub async fn resolve_and_rank(&self, trigger: Trigger) -> Result<Resolution, LocatorError> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.begin(ticket).await;

        let (next, outcome) = match self.locate(&trigger).await {
            Err(error) => (FinderState::failed(error.clone(), None), Err(error)),
            Ok((coordinate, source)) => match self.rank(coordinate).await {
                Ok(facilities) => (
                    FinderState::resolved(coordinate, source.clone(), facilities.clone()),
                    Ok(Resolution {
                        coordinate,
                        source,
                        facilities,
                    }),
                ),
                Err(error) => (
                    FinderState::failed(error.clone(), Some((coordinate, source))),
                    Err(error),
                ),
            },
        };

        self.commit(ticket, next).await;
        outcome
    }

    async fn begin(&self, ticket: u64) {
        let mut state = self.state.write().await;
        if self.is_current(ticket) {
            let searching = FinderState::searching(&state);
            *state = searching;
        }
    }

    async fn commit(&self, ticket: u64, next: FinderState) {
        let mut state = self.state.write().await;
        if self.is_current(ticket) {
            *state = next;
        } else {
            tracing::debug!(ticket, "discarding outcome of superseded attempt");
        }
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    async fn locate(&self, trigger: &Trigger) -> Result<(Coordinate, LocationSource), LocatorError> {
        match trigger {
            Trigger::UseCurrentLocation => self.locate_current().await,
            Trigger::ManualQuery(query) => self.locate_query(query).await,
        }
    }

    async fn locate_current(&self) -> Result<(Coordinate, LocationSource), LocatorError> {
        if !is_secure_origin(&self.origin) {
            return Err(LocatorError::InsecureContext {
                origin: self.origin.clone(),
            });
        }

        let device_error = match self.device_position().await {
            Ok(located) => return Ok(located),
            Err(error) => error,
        };
        tracing::info!(error = %device_error, "device location failed; trying IP geolocation");

        match resolve_by_ip(&self.http, &self.ip_endpoints).await {
            Some(fix) => Ok((
                fix.coordinate,
                LocationSource::IpLookup {
                    provider: fix.provider,
                    city: fix.city,
                },
            )),
            None => Err(LocatorError::AllIpProvidersFailed {
                device: device_error,
            }),
        }
    }

    async fn device_position(&self) -> Result<(Coordinate, LocationSource), DeviceError> {
        let options = self.position_options;
        let position = tokio::time::timeout(
            options.timeout,
            self.device.current_position(&options),
        )
        .await
        .map_err(|_| DeviceError::Timeout)??;

        let coordinate = Coordinate::new(position.latitude, position.longitude)?;
        tracing::debug!(%coordinate, accuracy_m = position.accuracy_m, "resolved device location");
        Ok((
            coordinate,
            LocationSource::Device {
                accuracy_m: position.accuracy_m,
            },
        ))
    }

    async fn locate_query(&self, query: &str) -> Result<(Coordinate, LocationSource), LocatorError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(LocatorError::EmptyQuery);
        }

        match self.geocoder.geocode(trimmed).await {
            Ok(place) => Ok((
                place.coordinate,
                LocationSource::Geocoded {
                    query: trimmed.to_string(),
                    display_name: place.display_name,
                },
            )),
            Err(error) => {
                tracing::warn!(query, %error, "geocoding failed");
                Err(LocatorError::LocationNotFound {
                    query: query.to_string(),
                })
            }
        }
    }

    async fn rank(&self, coordinate: Coordinate) -> Result<Vec<Facility>, LocatorError> {
        let facilities = self
            .backend
            .nearby_facilities(coordinate, self.radius_m)
            .await?;
        tracing::info!(%coordinate, count = facilities.len(), "facility lookup complete");
        Ok(facilities)
    }
}
