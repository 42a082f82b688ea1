//! Response shapes of the supported IP geolocation providers.

use carefinder_core::Coordinate;

/// `ipapi.co`: `{"latitude": 40.71, "longitude": -74.0, "city": "New York"}`.
///
/// Rate-limited or failed lookups come back as `{"error": true, "reason": ...}`.
pub(super) fn parse_ipapi(payload: &serde_json::Value) -> Option<(Coordinate, Option<String>)> {
    if payload
        .get("error")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false)
    {
        tracing::debug!(
            reason = payload.get("reason").and_then(serde_json::Value::as_str),
            "ipapi reported an error"
        );
        return None;
    }

    let lat = payload.get("latitude").and_then(serde_json::Value::as_f64)?;
    let lng = payload.get("longitude").and_then(serde_json::Value::as_f64)?;
    let coordinate = Coordinate::new(lat, lng).ok()?;
    Some((coordinate, city(payload)))
}

/// `ipinfo.io`: `{"loc": "40.7128,-74.0060", "city": "New York"}`.
pub(super) fn parse_ipinfo(payload: &serde_json::Value) -> Option<(Coordinate, Option<String>)> {
    let loc = payload.get("loc").and_then(serde_json::Value::as_str)?;
    let coordinate = Coordinate::parse_pair(loc)?;
    Some((coordinate, city(payload)))
}

fn city(payload: &serde_json::Value) -> Option<String> {
    payload
        .get("city")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipapi_reads_numeric_fields() {
        let payload = serde_json::json!({
            "ip": "203.0.113.7",
            "city": "Bengaluru",
            "latitude": 12.9719,
            "longitude": 77.5937
        });
        let (coordinate, city) = parse_ipapi(&payload).expect("valid payload");
        assert!((coordinate.latitude() - 12.9719).abs() < f64::EPSILON);
        assert_eq!(city.as_deref(), Some("Bengaluru"));
    }

    #[test]
    fn ipapi_error_payload_is_rejected() {
        let payload = serde_json::json!({
            "error": true,
            "reason": "RateLimited",
            "latitude": 0.0,
            "longitude": 0.0
        });
        assert!(parse_ipapi(&payload).is_none());
    }

    #[test]
    fn ipapi_missing_or_out_of_range_fields_are_rejected() {
        assert!(parse_ipapi(&serde_json::json!({ "latitude": 12.9 })).is_none());
        assert!(parse_ipapi(&serde_json::json!({ "latitude": "12.9", "longitude": "77.5" })).is_none());
        assert!(parse_ipapi(&serde_json::json!({ "latitude": 91.0, "longitude": 0.0 })).is_none());
    }

    #[test]
    fn ipapi_shape_is_not_accepted_by_ipinfo_parser() {
        let payload = serde_json::json!({ "latitude": 12.9, "longitude": 77.5 });
        assert!(parse_ipinfo(&payload).is_none());
    }

    #[test]
    fn ipinfo_reads_loc_string() {
        let payload = serde_json::json!({
            "ip": "203.0.113.7",
            "city": "New York",
            "loc": "40.7128,-74.0060"
        });
        let (coordinate, city) = parse_ipinfo(&payload).expect("valid payload");
        assert!((coordinate.longitude() + 74.006).abs() < f64::EPSILON);
        assert_eq!(city.as_deref(), Some("New York"));
    }

    #[test]
    fn ipinfo_malformed_loc_is_rejected() {
        assert!(parse_ipinfo(&serde_json::json!({ "loc": "" })).is_none());
        assert!(parse_ipinfo(&serde_json::json!({ "loc": "40.7" })).is_none());
        assert!(parse_ipinfo(&serde_json::json!({ "loc": [40.7, -74.0] })).is_none());
        assert!(parse_ipinfo(&serde_json::json!({ "bogon": true })).is_none());
    }

    #[test]
    fn blank_city_is_dropped() {
        let payload = serde_json::json!({ "loc": "1.0,2.0", "city": "  " });
        let (_, city) = parse_ipinfo(&payload).unwrap();
        assert!(city.is_none());
    }
}
