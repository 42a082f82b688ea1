//! Terminal rendering of the finder state.

use std::io::{self, Write};

use carefinder_core::{haversine_km, Facility};
use carefinder_locator::{Condition, FinderState, LocationSource};

/// Writes a human-readable listing. Failures are left to the caller, which
/// reports them on stderr.
pub(crate) fn write_state<W: Write>(
    out: &mut W,
    state: &FinderState,
    filter: Option<&str>,
    facility_type: Option<&str>,
) -> io::Result<()> {
    if let (Some(coordinate), Some(source)) = (state.coordinate, state.source.as_ref()) {
        writeln!(out, "Location: {coordinate} ({})", describe_source(source))?;
    }

    match &state.condition {
        Some(Condition::Ready { .. }) => {}
        Some(Condition::NoFacilitiesFound) => {
            writeln!(out, "{}", Condition::NoFacilitiesFound.message())?;
            return Ok(());
        }
        Some(Condition::Failed(_)) | None => return Ok(()),
    }

    let shown = state.filter_matching(filter.unwrap_or(""), facility_type);
    if shown.is_empty() {
        writeln!(out, "No facilities match {}.", describe_filter(filter, facility_type))?;
        return Ok(());
    }

    for (index, facility) in shown.iter().enumerate() {
        writeln!(out)?;
        writeln!(out, "{:>2}. {}", index + 1, facility.name)?;
        if !facility.address.is_empty() {
            writeln!(out, "    {}", facility.address)?;
        }
        writeln!(out, "    {}", distance_line(state, facility))?;
        if let Some(rating) = rating_line(facility) {
            writeln!(out, "    {rating}")?;
        }
        if !facility.types.is_empty() {
            writeln!(out, "    Types: {}", facility.types.join(", "))?;
        }
        if let Some(url) = &facility.directions_url {
            writeln!(out, "    Directions: {url}")?;
        }
    }
    Ok(())
}

/// JSON view of the state for `--json`.
pub(crate) fn state_json(
    state: &FinderState,
    filter: Option<&str>,
    facility_type: Option<&str>,
) -> serde_json::Value {
    let (status, message) = match &state.condition {
        Some(Condition::Failed(error)) => (error.kind(), error.to_string()),
        Some(condition @ Condition::NoFacilitiesFound) => ("no_facilities_found", condition.message()),
        Some(condition @ Condition::Ready { .. }) => ("ready", condition.message()),
        None => ("idle", String::new()),
    };
    serde_json::json!({
        "status": status,
        "message": message,
        "coordinate": state.coordinate,
        "source": state.source,
        "facilities": state.filter_matching(filter.unwrap_or(""), facility_type),
    })
}

fn describe_filter(filter: Option<&str>, facility_type: Option<&str>) -> String {
    let mut parts = Vec::new();
    if let Some(term) = filter {
        parts.push(format!("\"{term}\""));
    }
    if let Some(tag) = facility_type {
        parts.push(format!("type \"{tag}\""));
    }
    if parts.is_empty() {
        "the current filters".to_string()
    } else {
        parts.join(" with ")
    }
}

fn describe_source(source: &LocationSource) -> String {
    match source {
        LocationSource::Device {
            accuracy_m: Some(accuracy),
        } => format!("device, ±{accuracy:.0} m"),
        LocationSource::Device { accuracy_m: None } => "device".to_string(),
        LocationSource::IpLookup {
            provider,
            city: Some(city),
        } => format!("approximate, {city} via {provider}"),
        LocationSource::IpLookup {
            provider,
            city: None,
        } => format!("approximate, via {provider}"),
        LocationSource::Geocoded {
            display_name: Some(name),
            ..
        } => name.clone(),
        LocationSource::Geocoded { query, .. } => query.clone(),
    }
}

fn distance_line(state: &FinderState, facility: &Facility) -> String {
    let distance = facility
        .distance_text
        .clone()
        .or_else(|| facility.distance.map(|km| format!("{km:.1} km")));

    match (distance, &facility.duration_text) {
        (Some(distance), Some(duration)) => format!("{distance} · {duration}"),
        (Some(distance), None) => distance,
        (None, _) => {
            let straight_line = state
                .coordinate
                .zip(facility.coordinate().ok())
                .map(|(from, to)| haversine_km(from, to));
            match straight_line {
                Some(km) => format!("~{km:.1} km straight-line"),
                None => "Distance unknown".to_string(),
            }
        }
    }
}

/// The backend reports an unrated place as rating 0 with no reviews.
fn rating_line(facility: &Facility) -> Option<String> {
    let rating = facility.rating?;
    if rating.abs() < f64::EPSILON && matches!(facility.review_count, None | Some(0)) {
        return None;
    }
    Some(match facility.review_count {
        Some(count) => format!("Rating {rating:.1}/5 ({count} reviews)"),
        None => format!("Rating {rating:.1}/5"),
    })
}
