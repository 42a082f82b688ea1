use serde::{Deserialize, Deserializer, Serialize};

use crate::geo::{Coordinate, CoordinateError};

/// A medical facility as returned by the backend's nearby lookup.
///
/// Facilities arrive in batches and are treated as immutable values: a new
/// search replaces the whole batch rather than editing individual records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    /// Backend identifier. Some backends emit numeric IDs, so both forms are
    /// accepted and normalised to a string.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    /// Average rating on a 0–5 scale. Out-of-range values are dropped.
    #[serde(default, deserialize_with = "bounded_rating")]
    pub rating: Option<f64>,
    #[serde(default, rename = "user_ratings_total")]
    pub review_count: Option<u32>,
    /// Distance in kilometres, as computed by the backend.
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub distance_text: Option<String>,
    #[serde(default)]
    pub duration_text: Option<String>,
    #[serde(default)]
    pub directions_url: Option<String>,
    #[serde(default)]
    pub place_id: Option<String>,
    /// Category tags, e.g. `["hospital", "health"]`.
    #[serde(default)]
    pub types: Vec<String>,
}

impl Facility {
    /// Returns the facility's position as a validated [`Coordinate`].
    ///
    /// # Errors
    ///
    /// Returns a [`CoordinateError`] when the backend supplied an invalid
    /// latitude or longitude.
    pub fn coordinate(&self) -> Result<Coordinate, CoordinateError> {
        Coordinate::new(self.lat, self.lng)
    }

    /// Case-insensitive substring match against name and address.
    #[must_use]
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        needle.is_empty()
            || self.name.to_lowercase().contains(&needle)
            || self.address.to_lowercase().contains(&needle)
    }

    /// Exact, case-insensitive match against one of the category tags. A
    /// blank tag matches every facility.
    #[must_use]
    pub fn has_type(&self, tag: &str) -> bool {
        let tag = tag.trim();
        tag.is_empty() || self.types.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Int(n) => n.to_string(),
        Id::Float(n) => n.to_string(),
    })
}

fn bounded_rating<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw.filter(|r| (0.0..=5.0).contains(r)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend_facility() -> serde_json::Value {
        serde_json::json!({
            "id": "demo_ramaiah_memorial",
            "name": "M.S. Ramaiah Memorial Hospital",
            "lat": 13.034,
            "lng": 77.552,
            "address": "MSR Nagar, MSRIT Post, Mathikere, Bangalore 560054",
            "rating": 4.2,
            "user_ratings_total": 1250,
            "place_id": "demo_ramaiah_memorial",
            "types": ["hospital", "health"],
            "distance": 2.4,
            "distance_text": "2.4 km",
            "duration_text": "9 min",
            "directions_url": "https://www.google.com/maps/dir/13.03,77.55/13.034,77.552"
        })
    }

    #[test]
    fn deserializes_full_backend_record() {
        let facility: Facility = serde_json::from_value(backend_facility()).unwrap();
        assert_eq!(facility.id, "demo_ramaiah_memorial");
        assert_eq!(facility.review_count, Some(1250));
        assert_eq!(facility.distance_text.as_deref(), Some("2.4 km"));
        assert_eq!(facility.duration_text.as_deref(), Some("9 min"));
        assert_eq!(facility.types, vec!["hospital", "health"]);
        assert!(facility.coordinate().is_ok());
    }

    #[test]
    fn optional_fields_default_to_none() {
        let facility: Facility = serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "Eastside Clinic",
            "lat": 40.7148,
            "lng": -73.996
        }))
        .unwrap();
        assert_eq!(facility.id, "7");
        assert!(facility.address.is_empty());
        assert!(facility.rating.is_none());
        assert!(facility.distance.is_none());
        assert!(facility.directions_url.is_none());
        assert!(facility.types.is_empty());
    }

    #[test]
    fn out_of_range_rating_is_dropped() {
        let mut value = backend_facility();
        value["rating"] = serde_json::json!(7.5);
        let facility: Facility = serde_json::from_value(value).unwrap();
        assert!(facility.rating.is_none());
    }

    #[test]
    fn matches_name_or_address_case_insensitively() {
        let facility: Facility = serde_json::from_value(backend_facility()).unwrap();
        assert!(facility.matches("ramaiah"));
        assert!(facility.matches("BANGALORE"));
        assert!(facility.matches("  "));
        assert!(!facility.matches("manipal"));
    }

    #[test]
    fn has_type_is_exact_and_case_insensitive() {
        let facility: Facility = serde_json::from_value(backend_facility()).unwrap();
        assert!(facility.has_type("Hospital"));
        assert!(facility.has_type(" health "));
        assert!(facility.has_type(""));
        assert!(!facility.has_type("hosp"));
        assert!(!facility.has_type("pharmacy"));
    }
}
