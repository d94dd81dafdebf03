//! The map view a layer is shown in.

use arc_swap::ArcSwap;
use geoclip_core::{GeoBBox, LatLng, PixelPoint};
use std::{
	f64::consts::PI,
	fmt::Debug,
	sync::atomic::{AtomicU64, Ordering},
};

/// Visible area of the map: geographic bounds and size in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub bounds: GeoBBox,
	pub width: u32,
	pub height: u32,
}

impl Viewport {
	/// Position of `point` in pixels of this viewport.
	///
	/// The bounds are interpolated onto `width × height` in Web-Mercator space, so the
	/// result stays tied to this viewport even after the view has moved on.
	#[must_use]
	pub fn project(&self, point: &LatLng) -> PixelPoint {
		let west = lng_to_unit(self.bounds.x_min);
		let east = lng_to_unit(self.bounds.x_max);
		let north = mercator_unit(self.bounds.y_max);
		let south = mercator_unit(self.bounds.y_min);
		PixelPoint::new(
			(lng_to_unit(point.lng) - west) / (east - west) * f64::from(self.width),
			(lat_to_unit(point.lat) - north) / (south - north) * f64::from(self.height),
		)
	}
}

/// Notifications after which an overlay refreshes its image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewEvent {
	MoveEnd,
	ZoomEnd,
	Resize,
}

/// What a clipped layer needs from the map it is part of.
pub trait MapView: Debug + Send + Sync {
	/// Current viewport, read fresh on every call.
	fn viewport(&self) -> Viewport;

	/// Position of `point` in container pixels of the current viewport.
	fn project(&self, point: &LatLng) -> PixelPoint;

	/// Asks the map to drop and re-request every tile of the layer.
	fn invalidate(&self);
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ViewState {
	center: LatLng,
	zoom: f64,
	width: u32,
	height: u32,
}

/// Largest height [`MercatorView::fit_bounds`] produces.
pub const MAX_FIT_HEIGHT: u32 = 4096;

/// A Web-Mercator map view given by center, zoom and pixel size.
///
/// At zoom `z` the world is `tile_size · 2^z` pixels wide.
#[derive(Debug)]
pub struct MercatorView {
	state: ArcSwap<ViewState>,
	tile_size: u32,
	invalidations: AtomicU64,
}

impl MercatorView {
	#[must_use]
	pub fn new(center: LatLng, zoom: f64, width: u32, height: u32) -> MercatorView {
		MercatorView {
			state: ArcSwap::from_pointee(ViewState {
				center,
				zoom,
				width,
				height,
			}),
			tile_size: 256,
			invalidations: AtomicU64::new(0),
		}
	}

	/// A view showing all of `bounds`, `width` pixels wide.
	///
	/// The height follows from the Mercator aspect ratio of `bounds` but never exceeds
	/// [`MAX_FIT_HEIGHT`]; taller areas are fitted vertically and gain room on the sides.
	#[must_use]
	pub fn fit_bounds(bounds: &GeoBBox, width: u32) -> MercatorView {
		let west = lng_to_unit(bounds.x_min);
		let east = lng_to_unit(bounds.x_max);
		let north = lat_to_unit(bounds.y_max);
		let south = lat_to_unit(bounds.y_min);
		let span_x = (east - west).max(f64::EPSILON);
		let span_y = (south - north).max(f64::EPSILON);

		let mut scale = f64::from(width) / span_x;
		let height = if span_y * scale > f64::from(MAX_FIT_HEIGHT) {
			scale = f64::from(MAX_FIT_HEIGHT) / span_y;
			MAX_FIT_HEIGHT
		} else {
			(span_y * scale).round().max(1.0) as u32
		};

		let zoom = (scale / 256.0).log2();
		let center = LatLng::new(unit_to_lat(f64::midpoint(north, south)), unit_to_lng(f64::midpoint(west, east)));
		MercatorView::new(center, zoom, width, height)
	}

	pub fn set_center(&self, center: LatLng) {
		self.state.rcu(|state| ViewState { center, ..**state });
	}

	pub fn set_zoom(&self, zoom: f64) {
		self.state.rcu(|state| ViewState { zoom, ..**state });
	}

	pub fn resize(&self, width: u32, height: u32) {
		self.state.rcu(|state| ViewState {
			width,
			height,
			..**state
		});
	}

	#[must_use]
	pub fn center(&self) -> LatLng {
		self.state.load().center
	}

	#[must_use]
	pub fn zoom(&self) -> f64 {
		self.state.load().zoom
	}

	/// How often [`MapView::invalidate`] was called.
	#[must_use]
	pub fn invalidation_count(&self) -> u64 {
		self.invalidations.load(Ordering::SeqCst)
	}

	fn world_size(&self, state: &ViewState) -> f64 {
		f64::from(self.tile_size) * state.zoom.exp2()
	}

	/// Container pixel of the north-west corner, in world pixels.
	fn origin(&self, state: &ViewState) -> [f64; 2] {
		let world = self.world_size(state);
		[
			lng_to_unit(state.center.lng) * world - f64::from(state.width) / 2.0,
			lat_to_unit(state.center.lat) * world - f64::from(state.height) / 2.0,
		]
	}
}

/// Longitude to the `0..1` world fraction (west to east).
fn lng_to_unit(lng: f64) -> f64 {
	(lng + 180.0) / 360.0
}

/// Latitude to the `0..1` world fraction (north to south).
fn lat_to_unit(lat: f64) -> f64 {
	mercator_unit(lat.clamp(-85.051_128_779_806_59, 85.051_128_779_806_59))
}

/// Inverse of `unit_to_lat`, also beyond the edges of the world.
fn mercator_unit(lat: f64) -> f64 {
	(1.0 - lat.to_radians().tan().asinh() / PI) / 2.0
}

fn unit_to_lng(x: f64) -> f64 {
	x * 360.0 - 180.0
}

fn unit_to_lat(y: f64) -> f64 {
	(PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees()
}

impl MapView for MercatorView {
	fn viewport(&self) -> Viewport {
		let state = self.state.load();
		let world = self.world_size(&state);
		let [x0, y0] = self.origin(&state);
		let x1 = x0 + f64::from(state.width);
		let y1 = y0 + f64::from(state.height);
		Viewport {
			bounds: GeoBBox {
				x_min: unit_to_lng(x0 / world),
				y_min: unit_to_lat(y1 / world),
				x_max: unit_to_lng(x1 / world),
				y_max: unit_to_lat(y0 / world),
			},
			width: state.width,
			height: state.height,
		}
	}

	fn project(&self, point: &LatLng) -> PixelPoint {
		let state = self.state.load();
		let world = self.world_size(&state);
		let [x0, y0] = self.origin(&state);
		PixelPoint::new(lng_to_unit(point.lng) * world - x0, lat_to_unit(point.lat) * world - y0)
	}

	fn invalidate(&self) {
		let count = self.invalidations.fetch_add(1, Ordering::SeqCst) + 1;
		log::debug!("map view invalidated ({count} so far)");
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_relative_eq;
	use geoclip_core::BoundaryRing;

	#[test]
	fn world_view_at_zoom_zero() {
		let view = MercatorView::new(LatLng::new(0.0, 0.0), 0.0, 256, 256);
		let viewport = view.viewport();
		assert_eq!((viewport.width, viewport.height), (256, 256));
		assert_relative_eq!(viewport.bounds.x_min, -180.0);
		assert_relative_eq!(viewport.bounds.x_max, 180.0);
		assert_relative_eq!(viewport.bounds.y_max, 85.051_128_779_806_59, epsilon = 1e-9);
		assert_relative_eq!(viewport.bounds.y_min, -85.051_128_779_806_59, epsilon = 1e-9);

		let center = view.project(&LatLng::new(0.0, 0.0));
		assert_relative_eq!(center.x, 128.0);
		assert_relative_eq!(center.y, 128.0, epsilon = 1e-9);
	}

	#[test]
	fn viewport_corners_project_to_container_corners() {
		let view = MercatorView::new(LatLng::new(52.5, 13.4), 9.3, 800, 600);
		let bounds = view.viewport().bounds;
		let nw = view.project(&LatLng::new(bounds.y_max, bounds.x_min));
		let se = view.project(&LatLng::new(bounds.y_min, bounds.x_max));
		assert_relative_eq!(nw.x, 0.0, epsilon = 1e-6);
		assert_relative_eq!(nw.y, 0.0, epsilon = 1e-6);
		assert_relative_eq!(se.x, 800.0, epsilon = 1e-6);
		assert_relative_eq!(se.y, 600.0, epsilon = 1e-6);
	}

	#[test]
	fn fit_bounds_round_trip() {
		let bounds = GeoBBox::new(10.0, 40.0, 20.0, 50.0).unwrap();
		let view = MercatorView::fit_bounds(&bounds, 512);
		let viewport = view.viewport();
		assert_eq!(viewport.width, 512);
		assert_relative_eq!(viewport.bounds.x_min, 10.0, epsilon = 1e-9);
		assert_relative_eq!(viewport.bounds.x_max, 20.0, epsilon = 1e-9);
		assert_relative_eq!(viewport.bounds.y_max, 50.0, epsilon = 0.05);
		assert_relative_eq!(viewport.bounds.y_min, 40.0, epsilon = 0.05);
	}

	#[test]
	fn viewport_projection_matches_view() {
		let view = MercatorView::new(LatLng::new(52.5, 13.4), 6.5, 640, 480);
		let viewport = view.viewport();
		for point in [LatLng::new(52.5, 13.4), LatLng::new(50.0, 10.0), LatLng::new(55.1, 17.9)] {
			let a = viewport.project(&point);
			let b = view.project(&point);
			assert_relative_eq!(a.x, b.x, epsilon = 1e-6);
			assert_relative_eq!(a.y, b.y, epsilon = 1e-6);
		}
	}

	#[test]
	fn viewport_projection_beyond_world_edge() {
		let view = MercatorView::new(LatLng::new(80.0, 0.0), 1.0, 512, 512);
		let viewport = view.viewport();
		let center = viewport.project(&LatLng::new(80.0, 0.0));
		assert_relative_eq!(center.x, 256.0, epsilon = 1e-6);
		assert_relative_eq!(center.y, 256.0, epsilon = 1e-6);
	}

	#[test]
	fn fit_bounds_of_collinear_ring_is_limited() {
		let ring = BoundaryRing::new(vec![LatLng::new(0.0, 5.0), LatLng::new(1.0, 5.0), LatLng::new(2.0, 5.0)]).unwrap();
		let view = MercatorView::fit_bounds(&ring.bounds(), 1024);
		let viewport = view.viewport();
		assert_eq!((viewport.width, viewport.height), (1024, MAX_FIT_HEIGHT));
		assert!(viewport.bounds.x_min < 5.0 && viewport.bounds.x_max > 5.0);
		assert_relative_eq!(viewport.bounds.y_min, 0.0, epsilon = 1e-6);
		assert_relative_eq!(viewport.bounds.y_max, 2.0, epsilon = 1e-6);
	}

	#[test]
	fn fit_bounds_of_narrow_area_is_limited() {
		let bounds = GeoBBox::new(10.0, 0.0, 10.01, 10.0).unwrap();
		let viewport = MercatorView::fit_bounds(&bounds, 1024).viewport();
		assert_eq!((viewport.width, viewport.height), (1024, MAX_FIT_HEIGHT));
		assert!(viewport.bounds.x_min < 10.0 && viewport.bounds.x_max > 10.01);
		assert_relative_eq!(viewport.bounds.y_min, 0.0, epsilon = 1e-6);
		assert_relative_eq!(viewport.bounds.y_max, 10.0, epsilon = 1e-6);
	}

	#[test]
	fn state_changes_and_invalidation() {
		let view = MercatorView::new(LatLng::new(0.0, 0.0), 2.0, 100, 100);
		view.set_center(LatLng::new(10.0, 20.0));
		view.set_zoom(5.0);
		view.resize(300, 200);
		assert_eq!(view.center(), LatLng::new(10.0, 20.0));
		assert_relative_eq!(view.zoom(), 5.0);
		assert_eq!(view.viewport().width, 300);
		view.invalidate();
		view.invalidate();
		assert_eq!(view.invalidation_count(), 2);
	}
}
