//! Stateless geometry used to decide and draw the clip.
//!
//! Everything here is a pure function of its arguments: tile bounds, projection into
//! tile pixels, ray-casting containment and the tile/boundary intersection tests.

mod edge;

pub use edge::{Edge, EdgeIndex, RegionClass};

use crate::{BoundaryRing, GeoBBox, LatLng, PixelPoint, TileCoord};
use geo::Intersects;
use itertools::Itertools;

/// Geographic bounds of a tile.
///
/// Longitude is linear in the column, latitude follows the inverse Web-Mercator
/// projection. The result does not depend on the pixel size of the tile.
#[must_use]
pub fn tile_bounds(coord: &TileCoord) -> GeoBBox {
	coord.to_geo_bbox()
}

/// Maps a geographic point into the pixel space of one tile.
///
/// Both axes are interpolated linearly inside the tile's geographic bounds onto
/// `[0, tile_size]`; north maps to row 0. Points outside the tile produce
/// coordinates outside that range.
#[must_use]
pub fn project_to_tile_pixel(point: &LatLng, coord: &TileCoord, tile_size: u32) -> PixelPoint {
	project_into(point, &tile_bounds(coord), f64::from(tile_size))
}

/// Projects every vertex of `ring` into the pixel space of `coord`.
#[must_use]
pub fn ring_to_tile_pixels(ring: &BoundaryRing, coord: &TileCoord, tile_size: u32) -> Vec<PixelPoint> {
	let bounds = tile_bounds(coord);
	let size = f64::from(tile_size);
	ring.points().iter().map(|p| project_into(p, &bounds, size)).collect()
}

fn project_into(point: &LatLng, bounds: &GeoBBox, size: f64) -> PixelPoint {
	PixelPoint::new(
		(point.lng - bounds.x_min) / bounds.width() * size,
		(bounds.y_max - point.lat) / bounds.height() * size,
	)
}

/// Ray-casting parity test of `point` against `polygon`.
///
/// The polygon may be open or closed and wound either way. Points exactly on an edge
/// may be reported either way.
#[must_use]
pub fn point_in_polygon(point: PixelPoint, polygon: &[PixelPoint]) -> bool {
	let ring: Vec<[f64; 2]> = polygon.iter().map(|p| [p.x, p.y]).collect();
	contains_xy(&ring, point.x, point.y)
}

/// [`point_in_polygon`] for plain `[x, y]` rings.
#[must_use]
pub fn contains_xy(ring: &[[f64; 2]], x: f64, y: f64) -> bool {
	if ring.len() < 3 {
		return false;
	}
	ring
		.iter()
		.circular_tuple_windows()
		.filter(|(a, b)| Edge::new(**a, **b).ray_crosses(x, y))
		.count()
		% 2 == 1
}

/// Axis-aligned bounds of the ring.
#[must_use]
pub fn boundary_bounds(ring: &BoundaryRing) -> GeoBBox {
	ring.bounds()
}

/// Conservative test whether a tile touches the boundary.
///
/// True if a tile corner lies inside the ring, a ring vertex lies inside the tile,
/// or the two bounding boxes overlap. Concave boundaries can produce false
/// positives; use [`tile_intersects_boundary_exact`] when that matters.
#[must_use]
pub fn tile_intersects_boundary(coord: &TileCoord, ring: &BoundaryRing) -> bool {
	let tile = tile_bounds(coord);
	tile.corners().iter().any(|corner| ring.contains(corner))
		|| ring.points().iter().any(|vertex| tile.contains(vertex))
		|| tile.overlaps(&boundary_bounds(ring))
}

/// Exact polygon/rectangle intersection via `geo`.
#[must_use]
pub fn tile_intersects_boundary_exact(coord: &TileCoord, ring: &BoundaryRing) -> bool {
	ring.to_geo_polygon().intersects(&tile_bounds(coord).to_geo_rect())
}
