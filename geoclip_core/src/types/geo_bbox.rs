use super::LatLng;
use anyhow::{Result, ensure};
use std::fmt::Debug;

static MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;
static MAX_MERCATOR_LNG: f64 = 180.0;
static RADIUS: f64 = 6_378_137.0; // meters

/// A geographical bounding box (`GeoBBox`) represents a rectangular area on a map
/// defined by its minimum and maximum longitude (x) and latitude (y) coordinates.
///
/// - `x_min` (west): Minimum longitude.
/// - `y_min` (south): Minimum latitude.
/// - `x_max` (east): Maximum longitude.
/// - `y_max` (north): Maximum latitude.
///
/// # Examples
/// ```
/// use geoclip_core::{GeoBBox, LatLng};
///
/// let bbox = GeoBBox::new(-10.0, -5.0, 10.0, 5.0).unwrap();
/// assert!(bbox.contains(&LatLng::new(0.0, 0.0)));
/// assert!(!bbox.contains(&LatLng::new(6.0, 0.0)));
/// ```
#[derive(Clone, Copy, PartialEq)]
pub struct GeoBBox {
	pub x_min: f64,
	pub y_min: f64,
	pub x_max: f64,
	pub y_max: f64,
}

impl GeoBBox {
	/// Creates a new `GeoBBox` from `west, south, east, north`.
	///
	/// Fails if a value is not finite or a minimum exceeds its maximum.
	pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<GeoBBox> {
		GeoBBox {
			x_min,
			y_min,
			x_max,
			y_max,
		}
		.checked()
	}

	/// Returns the bounding box as `[west, south, east, north]`.
	#[must_use]
	pub fn as_array(&self) -> [f64; 4] {
		[self.x_min, self.y_min, self.x_max, self.y_max]
	}

	#[must_use]
	pub fn width(&self) -> f64 {
		self.x_max - self.x_min
	}

	#[must_use]
	pub fn height(&self) -> f64 {
		self.y_max - self.y_min
	}

	/// Corners in the order north-west, north-east, south-west, south-east.
	#[must_use]
	pub fn corners(&self) -> [LatLng; 4] {
		[
			LatLng::new(self.y_max, self.x_min),
			LatLng::new(self.y_max, self.x_max),
			LatLng::new(self.y_min, self.x_min),
			LatLng::new(self.y_min, self.x_max),
		]
	}

	#[must_use]
	pub fn center(&self) -> LatLng {
		LatLng::new(f64::midpoint(self.y_min, self.y_max), f64::midpoint(self.x_min, self.x_max))
	}

	/// Whether `point` lies inside or on the edge of the box.
	#[must_use]
	pub fn contains(&self, point: &LatLng) -> bool {
		point.lng >= self.x_min && point.lng <= self.x_max && point.lat >= self.y_min && point.lat <= self.y_max
	}

	/// Whether the two boxes share at least one point (touching edges count).
	#[must_use]
	pub fn overlaps(&self, other: &GeoBBox) -> bool {
		self.x_min <= other.x_max && other.x_min <= self.x_max && self.y_min <= other.y_max && other.y_min <= self.y_max
	}

	fn checked(self) -> Result<Self> {
		ensure!(
			self.as_array().iter().all(|v| v.is_finite()),
			"bbox values must be finite, got {:?}",
			self.as_array()
		);
		ensure!(
			self.x_min <= self.x_max,
			"x_min ({}) must be <= x_max ({})",
			self.x_min,
			self.x_max
		);
		ensure!(
			self.y_min <= self.y_max,
			"y_min ({}) must be <= y_max ({})",
			self.y_min,
			self.y_max
		);
		Ok(self)
	}

	/// Convert this WGS84 (EPSG:4326) bounding box to Web‑Mercator meters (EPSG:3857).
	///
	/// Input is interpreted as `[west, south, east, north]` in **degrees** and is
	/// clamped to the valid Web‑Mercator domain.
	#[must_use]
	pub fn to_mercator(&self) -> [f64; 4] {
		[
			x_from_lng(self.x_min),
			y_from_lat(self.y_min),
			x_from_lng(self.x_max),
			y_from_lat(self.y_max),
		]
	}

	/// The box as a `geo` rectangle (x = longitude, y = latitude).
	#[must_use]
	pub fn to_geo_rect(&self) -> geo::Rect<f64> {
		geo::Rect::new(
			geo::coord! { x: self.x_min, y: self.y_min },
			geo::coord! { x: self.x_max, y: self.y_max },
		)
	}
}

/// Web-Mercator easting in meters for a longitude in degrees.
pub fn x_from_lng(lng: f64) -> f64 {
	RADIUS * lng.clamp(-MAX_MERCATOR_LNG, MAX_MERCATOR_LNG).to_radians()
}

/// Web-Mercator northing in meters for a latitude in degrees.
pub fn y_from_lat(lat: f64) -> f64 {
	let phi = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
	RADIUS * (std::f64::consts::FRAC_PI_4 + phi / 2.0).tan().ln()
}

impl Debug for GeoBBox {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"GeoBBox({}, {}, {}, {})",
			self.x_min, self.y_min, self.x_max, self.y_max
		)
	}
}
