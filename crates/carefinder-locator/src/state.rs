//! Displayed state of the facility finder.

use carefinder_core::{Coordinate, Facility};
use serde::Serialize;

use crate::error::LocatorError;
use crate::ip::IpProvider;

/// Which tier produced the active coordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum LocationSource {
    Device {
        accuracy_m: Option<f64>,
    },
    IpLookup {
        provider: IpProvider,
        city: Option<String>,
    },
    Geocoded {
        query: String,
        display_name: Option<String>,
    },
}

/// User-visible outcome of the most recent attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Facilities were found and are listed.
    Ready { count: usize },
    /// The lookup succeeded but returned nothing. Not an error.
    NoFacilitiesFound,
    Failed(LocatorError),
}

impl Condition {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Condition::Ready { count } => format!("found {count} facilities near you"),
            Condition::NoFacilitiesFound => {
                "no facilities found in the search area; try another location".to_string()
            }
            Condition::Failed(error) => error.to_string(),
        }
    }
}

/// Snapshot of what the finder currently shows.
///
/// Never edited in place: each transition builds a new record and swaps it
/// in whole.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FinderState {
    pub coordinate: Option<Coordinate>,
    pub source: Option<LocationSource>,
    pub facilities: Vec<Facility>,
    pub loading: bool,
    /// `None` before the first attempt and while one is in flight.
    pub condition: Option<Condition>,
}

impl FinderState {
    /// State shown while a new attempt runs: the previous location stays on
    /// screen, its facilities do not.
    #[must_use]
    pub(crate) fn searching(previous: &FinderState) -> Self {
        Self {
            coordinate: previous.coordinate,
            source: previous.source.clone(),
            facilities: Vec::new(),
            loading: true,
            condition: None,
        }
    }

    #[must_use]
    pub(crate) fn resolved(
        coordinate: Coordinate,
        source: LocationSource,
        facilities: Vec<Facility>,
    ) -> Self {
        let condition = if facilities.is_empty() {
            Condition::NoFacilitiesFound
        } else {
            Condition::Ready {
                count: facilities.len(),
            }
        };
        Self {
            coordinate: Some(coordinate),
            source: Some(source),
            facilities,
            loading: false,
            condition: Some(condition),
        }
    }

    /// Failure state. `located` carries the coordinate when the failure came
    /// after location resolution (the facility lookup failed).
    #[must_use]
    pub(crate) fn failed(error: LocatorError, located: Option<(Coordinate, LocationSource)>) -> Self {
        let (coordinate, source) = match located {
            Some((coordinate, source)) => (Some(coordinate), Some(source)),
            None => (None, None),
        };
        Self {
            coordinate,
            source,
            facilities: Vec::new(),
            loading: false,
            condition: Some(Condition::Failed(error)),
        }
    }

    /// Facilities whose name or address contains `term`, in displayed order.
    #[must_use]
    pub fn filter(&self, term: &str) -> Vec<&Facility> {
        self.facilities.iter().filter(|f| f.matches(term)).collect()
    }

    /// Facilities tagged with `tag` (exact, case-insensitive), in displayed
    /// order.
    #[must_use]
    pub fn filter_by_type(&self, tag: &str) -> Vec<&Facility> {
        self.filter_matching("", Some(tag))
    }

    /// Both list filters at once: the name/address `term` and, when given,
    /// the category tag.
    #[must_use]
    pub fn filter_matching(&self, term: &str, facility_type: Option<&str>) -> Vec<&Facility> {
        self.facilities
            .iter()
            .filter(|f| f.matches(term) && facility_type.is_none_or(|tag| f.has_type(tag)))
            .collect()
    }
}
