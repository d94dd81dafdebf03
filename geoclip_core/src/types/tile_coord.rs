//! Three-dimensional tile coordinates in a Web Mercator pyramid
//!
//! [`TileCoord`] addresses one raster tile in the standard quad-tree ("slippy map")
//! scheme. It converts to geographic corners with the inverse Web-Mercator projection.
//!
//! # Examples
//!
//! ```
//! use geoclip_core::TileCoord;
//!
//! let coord = TileCoord::new(5, 6, 7).unwrap();
//! assert_eq!(coord.level, 5);
//! assert_eq!(coord.x, 6);
//! assert_eq!(coord.y, 7);
//!
//! let parsed: TileCoord = "5/6/7".parse().unwrap();
//! assert_eq!(parsed, coord);
//! ```

use crate::GeoBBox;
use anyhow::{Context, Result, ensure};
use std::{
	f64::consts::PI,
	fmt::{self, Debug, Display},
	str::FromStr,
};

/// A tile address: zoom level, column and row.
#[derive(Eq, PartialEq, Clone, Hash, Copy)]
pub struct TileCoord {
	/// The zoom level of the tile.
	pub level: u8,
	/// The column (x index) of the tile.
	pub x: u32,
	/// The row (y index) of the tile, counted from the north.
	pub y: u32,
}

impl TileCoord {
	/// Create a new `TileCoord` at the given zoom `level` and tile indices `x`, `y`.
	///
	/// # Errors
	/// Returns an error if `level` > 31 or an index is outside the level's grid.
	pub fn new(level: u8, x: u32, y: u32) -> Result<TileCoord> {
		ensure!(level <= 31, "level ({level}) must be <= 31");
		let max = 2u64.pow(u32::from(level));
		ensure!(u64::from(x) < max, "x ({x}) out of bounds for level {level}");
		ensure!(u64::from(y) < max, "y ({y}) out of bounds for level {level}");
		Ok(TileCoord { level, x, y })
	}

	/// Convert a tile grid corner to `[longitude, latitude]` in degrees.
	///
	/// `x` and `y` may equal `2^level` to address the far (east / south) edge.
	/// Latitude is `atan(sinh(π·(1 − 2·y / 2^level)))`.
	///
	/// ```
	/// use geoclip_core::TileCoord;
	///
	/// let [lng, lat] = TileCoord::coord_to_geo(10, 1, 1020);
	/// assert_eq!(format!("{lng:.5}"), "-179.64844");
	/// assert_eq!(format!("{lat:.5}"), "-84.92832");
	/// ```
	#[must_use]
	pub fn coord_to_geo(level: u8, x: u32, y: u32) -> [f64; 2] {
		let zoom: f64 = 2.0f64.powi(i32::from(level));
		[
			f64::from(x) / zoom * 360.0 - 180.0,
			(PI * (1.0 - 2.0 * f64::from(y) / zoom)).sinh().atan().to_degrees(),
		]
	}

	/// The tile at `level` that contains the point `lng, lat` (degrees).
	///
	/// Latitudes beyond the Web-Mercator limit are clamped to the outermost row.
	pub fn from_geo(lng: f64, lat: f64, level: u8) -> Result<TileCoord> {
		ensure!(level <= 31, "level ({level}) must be <= 31");
		ensure!(lng.is_finite() && lat.is_finite(), "coordinates must be finite");
		let zoom = 2.0f64.powi(i32::from(level));
		let lat = lat.clamp(-85.051_128_779_806_59, 85.051_128_779_806_59).to_radians();
		let x = ((lng + 180.0) / 360.0 * zoom).floor();
		let y = ((1.0 - lat.tan().asinh() / PI) / 2.0 * zoom).floor();

		#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
		let (x, y) = (x.clamp(0.0, zoom - 1.0) as u32, y.clamp(0.0, zoom - 1.0) as u32);
		TileCoord::new(level, x, y)
	}

	/// Geographic bounds of this tile (`west, south, east, north`).
	#[must_use]
	pub fn to_geo_bbox(&self) -> GeoBBox {
		let [x_min, y_max] = TileCoord::coord_to_geo(self.level, self.x, self.y);
		let [x_max, y_min] = TileCoord::coord_to_geo(self.level, self.x + 1, self.y + 1);
		GeoBBox {
			x_min,
			y_min,
			x_max,
			y_max,
		}
	}

	/// Bounds of this tile in Web-Mercator meters `[x_min, y_min, x_max, y_max]`.
	#[must_use]
	pub fn to_mercator_bbox(&self) -> [f64; 4] {
		const HALF: f64 = 20_037_508.342_789_244;
		let size = 2.0 * HALF / 2.0f64.powi(i32::from(self.level));
		let x_min = f64::from(self.x) * size - HALF;
		let y_max = HALF - f64::from(self.y) * size;
		[x_min, y_max - size, x_min + size, y_max]
	}
}

impl Debug for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TileCoord({}, [{}, {}])", self.level, self.x, self.y)
	}
}

impl Display for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}/{}", self.level, self.x, self.y)
	}
}

/// Parses `z/x/y`.
impl FromStr for TileCoord {
	type Err = anyhow::Error;

	fn from_str(s: &str) -> Result<Self> {
		let parts: Vec<&str> = s.trim().split('/').collect();
		ensure!(parts.len() == 3, "tile coordinate '{s}' must look like z/x/y");
		let level = parts[0].parse::<u8>().with_context(|| format!("invalid zoom level in '{s}'"))?;
		let x = parts[1].parse::<u32>().with_context(|| format!("invalid column in '{s}'"))?;
		let y = parts[2].parse::<u32>().with_context(|| format!("invalid row in '{s}'"))?;
		TileCoord::new(level, x, y)
	}
}
