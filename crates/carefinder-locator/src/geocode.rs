//! Free-text geocoding against a Nominatim-compatible `/search` endpoint.

use carefinder_core::Coordinate;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::GeocodeError;
use crate::fetch::fetch_json;

/// One candidate from the geocoder. Nominatim encodes coordinates as strings.
#[derive(Debug, Deserialize)]
struct Candidate {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// A place resolved from free text.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub coordinate: Coordinate,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Client,
    search_url: Url,
}

impl Geocoder {
    /// Creates a geocoder for the service rooted at `base_url`, e.g.
    /// `https://nominatim.openstreetmap.org`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Payload`] if `base_url` is not a valid URL.
    pub fn new(client: Client, base_url: &str) -> Result<Self, GeocodeError> {
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let search_url = Url::parse(&normalised)
            .and_then(|base| base.join("search"))
            .map_err(|e| GeocodeError::Payload(format!("invalid geocoder URL '{base_url}': {e}")))?;
        Ok(Self { client, search_url })
    }

    fn build_url(&self, query: &str) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("limit", "1")
            .append_pair("q", query);
        url
    }

    /// Geocodes `query` and returns the first candidate only.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::Http`] on network failure or non-2xx status.
    /// - [`GeocodeError::Payload`] if the body is not an array or its first
    ///   element is not a candidate.
    /// - [`GeocodeError::NoResults`] if the array is empty.
    /// - [`GeocodeError::MalformedCoordinate`] if the first candidate's
    ///   coordinate does not parse or is out of range.
    pub async fn geocode(&self, query: &str) -> Result<GeocodedPlace, GeocodeError> {
        let payload = fetch_json(&self.client, self.build_url(query)).await?;
        let first = first_candidate(payload)?;
        let coordinate = parse_candidate(&first.lat, &first.lon).ok_or_else(|| {
            GeocodeError::MalformedCoordinate {
                lat: first.lat.clone(),
                lon: first.lon.clone(),
            }
        })?;

        Ok(GeocodedPlace {
            coordinate,
            display_name: first.display_name,
        })
    }
}

/// Decodes only the first element, so later entries cannot fail the lookup.
fn first_candidate(payload: serde_json::Value) -> Result<Candidate, GeocodeError> {
    let serde_json::Value::Array(candidates) = payload else {
        return Err(GeocodeError::Payload(
            "expected an array of candidates".to_string(),
        ));
    };
    let first = candidates
        .into_iter()
        .next()
        .ok_or(GeocodeError::NoResults)?;
    serde_json::from_value(first).map_err(|e| GeocodeError::Payload(e.to_string()))
}

fn parse_candidate(lat: &str, lon: &str) -> Option<Coordinate> {
    let lat = lat.trim().parse::<f64>().ok()?;
    let lon = lon.trim().parse::<f64>().ok()?;
    Coordinate::new(lat, lon).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_geocoder(base: &str) -> Geocoder {
        Geocoder::new(Client::new(), base).expect("valid base URL")
    }

    #[test]
    fn build_url_encodes_query() {
        let geocoder = test_geocoder("https://nominatim.openstreetmap.org/");
        let url = geocoder.build_url("Nowhere, XX");
        assert_eq!(
            url.as_str(),
            "https://nominatim.openstreetmap.org/search?format=json&limit=1&q=Nowhere%2C+XX"
        );
    }

    #[test]
    fn build_url_keeps_base_path() {
        let geocoder = test_geocoder("http://localhost:8088/nominatim");
        let url = geocoder.build_url("Mathikere");
        assert_eq!(url.path(), "/nominatim/search");
    }

    #[test]
    fn first_candidate_ignores_later_entries() {
        let payload = serde_json::json!([
            { "lat": "13.0340", "lon": "77.5520", "display_name": "Mathikere" },
            { "display_name": "no coordinates" }
        ]);
        let first = first_candidate(payload).expect("first entry is valid");
        assert_eq!(first.lat, "13.0340");
        assert_eq!(first.display_name.as_deref(), Some("Mathikere"));
    }

    #[test]
    fn first_candidate_rejects_non_array_and_empty() {
        assert!(matches!(
            first_candidate(serde_json::json!({ "error": "bad" })),
            Err(GeocodeError::Payload(_))
        ));
        assert!(matches!(
            first_candidate(serde_json::json!([])),
            Err(GeocodeError::NoResults)
        ));
    }

    #[test]
    fn parse_candidate_accepts_string_numbers() {
        let coordinate = parse_candidate("13.0340", " 77.5520 ").expect("valid");
        assert!((coordinate.latitude() - 13.034).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_candidate_rejects_malformed_values() {
        assert!(parse_candidate("", "77.5").is_none());
        assert!(parse_candidate("abc", "77.5").is_none());
        assert!(parse_candidate("13.0", "200.0").is_none());
        assert!(parse_candidate("NaN", "77.5").is_none());
    }
}
