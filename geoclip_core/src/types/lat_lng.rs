//! Geographic points and corner-based bounds.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

/// A geographic position in degrees, latitude first.
///
/// Deserializes from either a `[lat, lng]` pair or a `{"lat": …, "lng": …}` object
/// (`lon` is accepted as an alias) and always serializes as a `[lat, lng]` pair.
///
/// # Examples
/// ```
/// use geoclip_core::LatLng;
///
/// let berlin = LatLng::new(52.52, 13.405);
/// assert_eq!(berlin.as_array(), [52.52, 13.405]);
/// assert_eq!(LatLng::from([52.52, 13.405]), berlin);
/// ```
#[derive(Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(from = "LatLngRepr", into = "[f64; 2]")]
pub struct LatLng {
	pub lat: f64,
	pub lng: f64,
}

impl LatLng {
	#[must_use]
	pub fn new(lat: f64, lng: f64) -> Self {
		Self { lat, lng }
	}

	/// Builds a point from a GeoJSON position, which stores longitude first.
	#[must_use]
	pub fn from_lng_lat(lng: f64, lat: f64) -> Self {
		Self { lat, lng }
	}

	#[must_use]
	pub fn as_array(&self) -> [f64; 2] {
		[self.lat, self.lng]
	}

	#[must_use]
	pub fn is_finite(&self) -> bool {
		self.lat.is_finite() && self.lng.is_finite()
	}
}

impl From<[f64; 2]> for LatLng {
	fn from(value: [f64; 2]) -> Self {
		LatLng::new(value[0], value[1])
	}
}

impl From<&[f64; 2]> for LatLng {
	fn from(value: &[f64; 2]) -> Self {
		LatLng::new(value[0], value[1])
	}
}

impl From<(f64, f64)> for LatLng {
	fn from(value: (f64, f64)) -> Self {
		LatLng::new(value.0, value.1)
	}
}

impl From<LatLng> for [f64; 2] {
	fn from(value: LatLng) -> Self {
		value.as_array()
	}
}

/// `geo` uses x = longitude, y = latitude.
impl From<geo::Coord<f64>> for LatLng {
	fn from(value: geo::Coord<f64>) -> Self {
		LatLng::from_lng_lat(value.x, value.y)
	}
}

impl From<LatLng> for geo::Coord<f64> {
	fn from(value: LatLng) -> Self {
		geo::Coord {
			x: value.lng,
			y: value.lat,
		}
	}
}

impl Debug for LatLng {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "LatLng({}, {})", self.lat, self.lng)
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LatLngRepr {
	Pair([f64; 2]),
	Object {
		lat: f64,
		#[serde(alias = "lon")]
		lng: f64,
	},
}

impl From<LatLngRepr> for LatLng {
	fn from(value: LatLngRepr) -> Self {
		match value {
			LatLngRepr::Pair([lat, lng]) | LatLngRepr::Object { lat, lng } => LatLng::new(lat, lng),
		}
	}
}

/// A rectangle given by its south-west and north-east corners.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct LatLngBounds {
	#[serde(alias = "southWest", alias = "_southWest")]
	pub south_west: LatLng,
	#[serde(alias = "northEast", alias = "_northEast")]
	pub north_east: LatLng,
}

impl LatLngBounds {
	#[must_use]
	pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
		Self { south_west, north_east }
	}

	/// The closed corner ring SW, SE, NE, NW, SW.
	#[must_use]
	pub fn to_ring_points(&self) -> Vec<LatLng> {
		let sw = self.south_west;
		let ne = self.north_east;
		vec![
			sw,
			LatLng::new(sw.lat, ne.lng),
			ne,
			LatLng::new(ne.lat, sw.lng),
			sw,
		]
	}
}
