//! Map marker projection
//!
//! Turns raw user records into map markers. Records carry their
//! position in one of two shapes: a nested `location` object with
//! `lat`/`lon`, or flat `latitude`/`longitude` fields whose values may
//! be numbers or numeric strings. Records with no usable position
//! produce no marker.

use serde_json::Value;

/// A single map marker derived from a user record.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub lat: f64,
    pub lng: f64,
    /// Pretty-printed JSON of the full source record.
    pub label: String,
    /// Markers always request focus so the map pans to fresh results.
    pub focus: bool,
}

/// Project one record into a marker, or `None` when the record has no
/// resolvable position.
pub fn project(record: &Value) -> Option<Marker> {
    let (lat, lng) = position(record)?;
    let label = serde_json::to_string_pretty(record).ok()?;

    Some(Marker {
        lat,
        lng,
        label,
        focus: true,
    })
}

/// Project a batch of records, dropping the ones without a position.
pub fn project_all(records: &[Value]) -> Vec<Marker> {
    records.iter().filter_map(project).collect()
}

/// Resolve a record's coordinates. The nested `location` object wins
/// when both of its components parse; otherwise the flat fields are
/// tried before giving up.
fn position(record: &Value) -> Option<(f64, f64)> {
    if let Some(location) = record.get("location") {
        let nested = coord(location.get("lat")).zip(coord(location.get("lon")));
        if nested.is_some() {
            return nested;
        }
    }

    coord(record.get("latitude")).zip(coord(record.get("longitude")))
}

/// Read one coordinate component, accepting JSON numbers and numeric
/// strings. Non-finite values are rejected.
fn coord(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    parsed.is_finite().then_some(parsed)
}
