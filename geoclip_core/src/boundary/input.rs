use crate::{BoundaryRing, ClipError, LatLng, LatLngBounds};
use anyhow::Result;
use serde::Deserialize;

/// A GeoJSON position: longitude, latitude and optional further values.
pub type Position = Vec<f64>;

/// Every way a clip boundary can be described.
///
/// The serialized form is tagged with `kind`:
///
/// ```json
/// {"kind": "ring", "points": [[10, 10], [10, 20], [20, 20]]}
/// {"kind": "rect", "south_west": [10, 10], "north_east": [20, 20]}
/// {"kind": "polygon", "rings": [[[10, 10], [10, 20], [20, 20]]]}
/// {"kind": "geojson", "geometry": {"type": "Polygon", "coordinates": [...]}}
/// ```
///
/// Untagged input of unknown shape goes through [`Boundary::sniff`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Boundary {
	/// Ordered `[lat, lng]` points.
	Ring { points: Vec<LatLng> },
	/// Axis-aligned rectangle given by two corners.
	Rect {
		#[serde(alias = "southWest")]
		south_west: LatLng,
		#[serde(alias = "northEast")]
		north_east: LatLng,
	},
	/// Polygon with one or more rings; only the first ring is used.
	Polygon { rings: Vec<Vec<LatLng>> },
	/// GeoJSON geometry (longitude first).
	#[serde(rename = "geojson")]
	GeoJson { geometry: GeoJson },
}

/// The GeoJSON objects a boundary may be read from.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJson {
	Polygon { coordinates: Vec<Vec<Position>> },
	MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
	Feature { geometry: Box<GeoJson> },
}

impl Boundary {
	/// Converts this boundary into the canonical closed ring.
	///
	/// Holes, later rings and later polygons are ignored.
	pub fn normalize(&self) -> Result<BoundaryRing> {
		match self {
			Boundary::Ring { points } => BoundaryRing::new(points.clone()),
			Boundary::Rect { south_west, north_east } => {
				BoundaryRing::new(LatLngBounds::new(*south_west, *north_east).to_ring_points())
			}
			Boundary::Polygon { rings } => {
				let first = rings
					.first()
					.ok_or_else(|| ClipError::unsupported("polygon without rings"))?;
				BoundaryRing::new(first.clone())
			}
			Boundary::GeoJson { geometry } => BoundaryRing::new(geometry.exterior_ring()?),
		}
	}

	/// Short name of the variant, used in log messages.
	#[must_use]
	pub fn kind(&self) -> &'static str {
		match self {
			Boundary::Ring { .. } => "ring",
			Boundary::Rect { .. } => "rect",
			Boundary::Polygon { .. } => "polygon",
			Boundary::GeoJson { .. } => "geojson",
		}
	}
}

impl GeoJson {
	/// First ring of the first polygon, converted to `[lat, lng]` order.
	pub fn exterior_ring(&self) -> Result<Vec<LatLng>> {
		match self {
			GeoJson::Polygon { coordinates } => {
				let ring = coordinates
					.first()
					.ok_or_else(|| ClipError::unsupported("GeoJSON Polygon without rings"))?;
				positions_to_points(ring)
			}
			GeoJson::MultiPolygon { coordinates } => {
				if coordinates.len() > 1 {
					log::debug!(
						"MultiPolygon has {} polygons, only the first one is used",
						coordinates.len()
					);
				}
				let ring = coordinates
					.first()
					.and_then(|polygon| polygon.first())
					.ok_or_else(|| ClipError::unsupported("GeoJSON MultiPolygon without polygons"))?;
				positions_to_points(ring)
			}
			GeoJson::Feature { geometry } => geometry.exterior_ring(),
		}
	}
}

fn positions_to_points(positions: &[Position]) -> Result<Vec<LatLng>> {
	positions
		.iter()
		.map(|position| match position.as_slice() {
			[lng, lat, ..] => Ok(LatLng::from_lng_lat(*lng, *lat)),
			_ => Err(ClipError::unsupported("GeoJSON position needs at least longitude and latitude").into()),
		})
		.collect()
}

impl From<Vec<LatLng>> for Boundary {
	fn from(points: Vec<LatLng>) -> Self {
		Boundary::Ring { points }
	}
}

impl From<Vec<[f64; 2]>> for Boundary {
	fn from(pairs: Vec<[f64; 2]>) -> Self {
		Boundary::Ring {
			points: pairs.into_iter().map(LatLng::from).collect(),
		}
	}
}

impl From<&[[f64; 2]]> for Boundary {
	fn from(pairs: &[[f64; 2]]) -> Self {
		Boundary::Ring {
			points: pairs.iter().map(LatLng::from).collect(),
		}
	}
}

impl From<LatLngBounds> for Boundary {
	fn from(bounds: LatLngBounds) -> Self {
		Boundary::Rect {
			south_west: bounds.south_west,
			north_east: bounds.north_east,
		}
	}
}

impl From<GeoJson> for Boundary {
	fn from(geometry: GeoJson) -> Self {
		Boundary::GeoJson { geometry }
	}
}

impl From<&BoundaryRing> for Boundary {
	fn from(ring: &BoundaryRing) -> Self {
		Boundary::Ring {
			points: ring.points().to_vec(),
		}
	}
}

/// A `geo` polygon is a polygon-like object: exterior first, then its holes.
impl From<geo::Polygon<f64>> for Boundary {
	fn from(polygon: geo::Polygon<f64>) -> Self {
		let (exterior, interiors) = polygon.into_inner();
		let rings = std::iter::once(exterior)
			.chain(interiors)
			.map(|line| line.0.into_iter().map(LatLng::from).collect())
			.collect();
		Boundary::Polygon { rings }
	}
}
