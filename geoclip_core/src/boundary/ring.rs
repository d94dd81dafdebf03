use crate::{ClipError, GeoBBox, LatLng};
use anyhow::Result;
use itertools::Itertools;
use serde::Serialize;
use std::fmt::{self, Debug};

/// A closed boundary ring: at least three distinct vertices and first point equal to the last.
///
/// The only way to obtain one is through [`BoundaryRing::new`] (or
/// [`crate::Boundary::normalize`]), so every instance upholds these invariants.
#[derive(Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BoundaryRing {
	points: Vec<LatLng>,
}

impl BoundaryRing {
	/// Validates `points` and closes the ring if the last point differs from the first.
	///
	/// # Errors
	/// * [`ClipError::UnsupportedBoundaryFormat`] if a coordinate is not finite.
	/// * [`ClipError::DegenerateBoundary`] if fewer than 3 distinct vertices remain.
	pub fn new(mut points: Vec<LatLng>) -> Result<BoundaryRing> {
		if let Some(bad) = points.iter().find(|p| !p.is_finite()) {
			return Err(ClipError::unsupported(format!("coordinates must be finite numbers, found {bad:?}")).into());
		}

		let distinct = points.iter().unique_by(|p| (p.lat.to_bits(), p.lng.to_bits())).count();
		if distinct < 3 {
			return Err(ClipError::DegenerateBoundary { distinct }.into());
		}

		if points.first() != points.last() {
			points.push(points[0]);
		}

		Ok(BoundaryRing { points })
	}

	#[must_use]
	pub fn points(&self) -> &[LatLng] {
		&self.points
	}

	/// Number of points including the closing one.
	#[must_use]
	pub fn len(&self) -> usize {
		self.points.len()
	}

	/// Never true; present for API symmetry with `len`.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.points.is_empty()
	}

	/// The ring as `[lat, lng]` pairs.
	#[must_use]
	pub fn to_pairs(&self) -> Vec<[f64; 2]> {
		self.points.iter().map(LatLng::as_array).collect()
	}

	/// Axis-aligned extent of the ring.
	#[must_use]
	pub fn bounds(&self) -> GeoBBox {
		let mut bbox = GeoBBox {
			x_min: f64::MAX,
			y_min: f64::MAX,
			x_max: f64::MIN,
			y_max: f64::MIN,
		};
		for point in &self.points {
			bbox.x_min = bbox.x_min.min(point.lng);
			bbox.y_min = bbox.y_min.min(point.lat);
			bbox.x_max = bbox.x_max.max(point.lng);
			bbox.y_max = bbox.y_max.max(point.lat);
		}
		bbox
	}

	/// The ring as a `geo` polygon without holes (x = longitude).
	#[must_use]
	pub fn to_geo_polygon(&self) -> geo::Polygon<f64> {
		let exterior: Vec<geo::Coord<f64>> = self.points.iter().map(|p| geo::Coord::from(*p)).collect();
		geo::Polygon::new(geo::LineString::from(exterior), vec![])
	}

	/// Whether `point` is inside the ring (even-odd rule, lng as x and lat as y).
	#[must_use]
	pub fn contains(&self, point: &LatLng) -> bool {
		let xy: Vec<[f64; 2]> = self.points.iter().map(|p| [p.lng, p.lat]).collect();
		crate::geometry::contains_xy(&xy, point.lng, point.lat)
	}
}

impl Debug for BoundaryRing {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.points.iter()).finish()
	}
}

impl TryFrom<Vec<LatLng>> for BoundaryRing {
	type Error = anyhow::Error;

	fn try_from(points: Vec<LatLng>) -> Result<Self> {
		BoundaryRing::new(points)
	}
}

impl From<BoundaryRing> for Vec<LatLng> {
	fn from(ring: BoundaryRing) -> Self {
		ring.points
	}
}
