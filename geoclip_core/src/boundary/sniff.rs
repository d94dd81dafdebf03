//! Recognizes the shape of untyped boundary input.
//!
//! Checks run in a fixed order and the first match wins:
//! 1. an object tagged with `kind` is a [`Boundary`] in its serialized form,
//! 2. an array is a ring of `[lat, lng]` pairs,
//! 3. an object with two corners (`southWest`/`northEast`, `_southWest`/`_northEast`
//!    or `south_west`/`north_east`) is a rectangle,
//! 4. an object with `latlngs` is a polygon,
//! 5. an object whose `type` is `Polygon`, `MultiPolygon` or `Feature` is GeoJSON.

use super::{Boundary, GeoJson};
use crate::{ClipError, LatLng};
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::str::FromStr;

const CORNER_KEYS: [(&str, &str); 3] = [
	("southWest", "northEast"),
	("_southWest", "_northEast"),
	("south_west", "north_east"),
];

impl Boundary {
	/// Decides which boundary shape `value` is.
	///
	/// # Errors
	/// Returns [`ClipError::UnsupportedBoundaryFormat`] when nothing matches or the
	/// matched shape is malformed.
	pub fn sniff(value: &Value) -> Result<Boundary> {
		let boundary = match value {
			Value::Array(_) => Boundary::Ring {
				points: parse(value, "array of [lat, lng] pairs")?,
			},
			Value::Object(map) => sniff_object(value, map)?,
			other => return Err(ClipError::unsupported(format!("got a JSON {}", json_kind(other))).into()),
		};
		log::trace!("recognized boundary as {}", boundary.kind());
		Ok(boundary)
	}
}

fn sniff_object(value: &Value, map: &Map<String, Value>) -> Result<Boundary> {
	if map.contains_key("kind") {
		return parse(value, "tagged boundary");
	}

	for (sw_key, ne_key) in CORNER_KEYS {
		if let (Some(sw), Some(ne)) = (map.get(sw_key), map.get(ne_key)) {
			return Ok(Boundary::Rect {
				south_west: parse::<LatLng>(sw, sw_key)?,
				north_east: parse::<LatLng>(ne, ne_key)?,
			});
		}
	}

	if let Some(latlngs) = map.get("latlngs") {
		return Ok(Boundary::Polygon {
			rings: parse_rings(latlngs)?,
		});
	}

	match map.get("type") {
		Some(Value::String(kind)) if matches!(kind.as_str(), "Polygon" | "MultiPolygon" | "Feature") => {
			Ok(Boundary::GeoJson {
				geometry: parse::<GeoJson>(value, "GeoJSON geometry")?,
			})
		}
		Some(Value::String(kind)) => Err(ClipError::unsupported(format!("GeoJSON type '{kind}'")).into()),
		_ => {
			let keys = map.keys().map(String::as_str).collect::<Vec<_>>().join(", ");
			Err(ClipError::unsupported(format!("object with keys [{keys}]")).into())
		}
	}
}

/// `latlngs` may hold a single ring or a list of rings.
fn parse_rings(latlngs: &Value) -> Result<Vec<Vec<LatLng>>> {
	if let Ok(rings) = serde_json::from_value::<Vec<Vec<LatLng>>>(latlngs.clone()) {
		return Ok(rings);
	}
	Ok(vec![parse(latlngs, "latlngs")?])
}

fn parse<T: DeserializeOwned>(value: &Value, what: &str) -> Result<T> {
	serde_json::from_value(value.clone())
		.map_err(|err| ClipError::unsupported(format!("malformed {what}: {err}")).into())
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

impl TryFrom<&Value> for Boundary {
	type Error = anyhow::Error;

	fn try_from(value: &Value) -> Result<Self> {
		Boundary::sniff(value)
	}
}

/// Parses JSON text and sniffs its shape.
impl FromStr for Boundary {
	type Err = anyhow::Error;

	fn from_str(s: &str) -> Result<Self> {
		let value: Value =
			serde_json::from_str(s).map_err(|err| ClipError::unsupported(format!("invalid JSON: {err}")))?;
		Boundary::sniff(&value)
	}
}
