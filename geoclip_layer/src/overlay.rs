//! Clipping one image per viewport.
//!
//! Instead of many tiles the overlay requests a single image covering the visible
//! map and masks it once. Every update takes a new request number; a completion
//! that is older than the newest published frame is discarded.

use crate::{
	BoundaryState, ImageFetcher, LayerOptions, MapView, ViewEvent,
	fetch::as_fetch_failure,
	wms::{get_map_url, parse_source_url},
};
use anyhow::{Context, Result, ensure};
use arc_swap::ArcSwapOption;
use geoclip_core::{Boundary, BoundaryRing, ClipError, GeoBBox, PixelPoint};
use geoclip_image::DynamicImageTraitClip;
use image::DynamicImage;
use reqwest::Url;
use std::{
	fmt::{self, Debug},
	sync::{
		Arc,
		atomic::{AtomicU64, Ordering},
	},
};

/// A clipped image and the area it covers, always published together.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayFrame {
	pub image: DynamicImage,
	pub bounds: GeoBBox,
	pub generation: u64,
}

/// Result of one overlay update.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayOutcome {
	/// The new frame is now the visible one.
	Published(Arc<OverlayFrame>),
	/// A newer update was issued while this one was loading.
	Superseded,
}

/// A WMS image overlay clipped to a boundary, refreshed per viewport.
pub struct ClippedImageOverlay {
	source: Url,
	options: LayerOptions,
	boundary: BoundaryState,
	fetcher: Arc<dyn ImageFetcher>,
	view: Arc<dyn MapView>,
	latest_request: AtomicU64,
	frame: ArcSwapOption<OverlayFrame>,
}

impl ClippedImageOverlay {
	/// Validates the options and normalizes the boundary. No image is fetched until the
	/// first [`update`](Self::update) or [`handle_event`](Self::handle_event).
	pub fn new(
		source_url: &str,
		options: LayerOptions,
		boundary: impl Into<Boundary>,
		fetcher: Arc<dyn ImageFetcher>,
		view: Arc<dyn MapView>,
	) -> Result<ClippedImageOverlay> {
		options.validate()?;
		let source = parse_source_url(source_url)?;
		let boundary = BoundaryState::from_boundary(&boundary.into()).context("creating clipped image overlay")?;
		log::debug!("clipped image overlay for '{source}' (layers '{}')", options.layers);
		Ok(ClippedImageOverlay {
			source,
			options,
			boundary,
			fetcher,
			view,
			latest_request: AtomicU64::new(0),
			frame: ArcSwapOption::empty(),
		})
	}

	#[must_use]
	pub fn builder(source_url: &str, options: LayerOptions) -> ClippedImageOverlayBuilder {
		ClippedImageOverlayBuilder {
			source_url: source_url.to_owned(),
			options,
			boundary: None,
			fetcher: None,
			view: None,
		}
	}

	#[must_use]
	pub fn options(&self) -> &LayerOptions {
		&self.options
	}

	/// The currently visible frame, if any update has completed.
	#[must_use]
	pub fn frame(&self) -> Option<Arc<OverlayFrame>> {
		self.frame.load_full()
	}

	/// Reacts to a view notification by refreshing the image.
	pub async fn handle_event(&self, event: ViewEvent) -> Result<OverlayOutcome> {
		log::debug!("overlay update after {event:?}");
		self.update().await
	}

	/// Fetches an image for the current viewport, clips it and publishes it.
	///
	/// # Errors
	/// [`ClipError::TileFetchFailure`] if the image cannot be fetched; the previous
	/// frame stays visible.
	pub async fn update(&self) -> Result<OverlayOutcome> {
		let generation = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
		let viewport = self.view.viewport();
		ensure!(
			viewport.width > 0 && viewport.height > 0,
			"viewport has no area ({}x{})",
			viewport.width,
			viewport.height
		);

		let url = get_map_url(
			&self.source,
			&self.options,
			viewport.bounds.to_mercator(),
			viewport.width,
			viewport.height,
		);
		let image = self
			.fetcher
			.fetch(&url)
			.await
			.map_err(|err| as_fetch_failure(err, &url))?;

		if self.latest_request.load(Ordering::SeqCst) != generation {
			log::debug!("overlay request {generation} superseded before masking");
			return Ok(OverlayOutcome::Superseded);
		}

		let snapshot = self.boundary.load();
		let polygon: Vec<PixelPoint> = snapshot.ring.points().iter().map(|p| viewport.project(p)).collect();
		let image = image
			.into_size(viewport.width, viewport.height)
			.into_clipped(&polygon, self.options.invert_clip, self.options.opacity)
			.context("masking overlay image")?;

		let frame = Arc::new(OverlayFrame {
			image,
			bounds: viewport.bounds,
			generation,
		});
		let previous = self.frame.rcu(|current| match current {
			Some(current) if current.generation > generation => Some(Arc::clone(current)),
			_ => Some(Arc::clone(&frame)),
		});
		if previous.is_some_and(|previous| previous.generation > generation) {
			log::debug!("overlay request {generation} superseded by a newer frame");
			return Ok(OverlayOutcome::Superseded);
		}

		log::trace!("overlay frame {generation} published for {:?}", viewport.bounds);
		Ok(OverlayOutcome::Published(frame))
	}

	/// Replaces the boundary and refreshes the image.
	///
	/// An invalid boundary is an error and leaves everything unchanged. A failing
	/// refresh is only logged; the new boundary stays in place.
	pub async fn set_boundary(&self, boundary: impl Into<Boundary>) -> Result<&Self> {
		self.boundary.set(&boundary.into())?;
		if let Err(err) = self.update().await {
			log::warn!("overlay refresh after boundary change failed: {err:#}");
		}
		Ok(self)
	}

	/// A copy of the current ring.
	#[must_use]
	pub fn get_boundary(&self) -> BoundaryRing {
		self.boundary.ring()
	}
}

impl Debug for ClippedImageOverlay {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ClippedImageOverlay")
			.field("source", &self.source.as_str())
			.field("layers", &self.options.layers)
			.field("latest_request", &self.latest_request.load(Ordering::SeqCst))
			.finish_non_exhaustive()
	}
}

/// Step-by-step construction of a [`ClippedImageOverlay`].
pub struct ClippedImageOverlayBuilder {
	source_url: String,
	options: LayerOptions,
	boundary: Option<Boundary>,
	fetcher: Option<Arc<dyn ImageFetcher>>,
	view: Option<Arc<dyn MapView>>,
}

impl ClippedImageOverlayBuilder {
	#[must_use]
	pub fn boundary(mut self, boundary: impl Into<Boundary>) -> Self {
		self.boundary = Some(boundary.into());
		self
	}

	#[must_use]
	pub fn fetcher(mut self, fetcher: Arc<dyn ImageFetcher>) -> Self {
		self.fetcher = Some(fetcher);
		self
	}

	#[must_use]
	pub fn view(mut self, view: Arc<dyn MapView>) -> Self {
		self.view = Some(view);
		self
	}

	/// # Errors
	/// [`ClipError::DependencyMissing`] without a boundary, fetcher or map view.
	pub fn build(self) -> Result<ClippedImageOverlay> {
		let boundary = self.boundary.ok_or(ClipError::DependencyMissing("a boundary"))?;
		let fetcher = self.fetcher.ok_or(ClipError::DependencyMissing("an image fetcher"))?;
		let view = self.view.ok_or(ClipError::DependencyMissing("a map view"))?;
		ClippedImageOverlay::new(&self.source_url, self.options, boundary, fetcher, view)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{MercatorView, testing::MockFetcher};
	use geoclip_core::LatLng;
	use image::GenericImageView;

	const SOURCE: &str = "https://maps.example.org/wms";

	fn rectangle() -> Vec<[f64; 2]> {
		vec![[10.0, 10.0], [10.0, 20.0], [20.0, 20.0], [20.0, 10.0], [10.0, 10.0]]
	}

	struct Fixture {
		overlay: Arc<ClippedImageOverlay>,
		fetcher: Arc<MockFetcher>,
		view: Arc<MercatorView>,
	}

	fn fixture(options: LayerOptions) -> Fixture {
		let fetcher = Arc::new(MockFetcher::new());
		let view = Arc::new(MercatorView::new(LatLng::new(15.0, 15.0), 4.0, 400, 300));
		let overlay = ClippedImageOverlay::new(SOURCE, options, rectangle(), fetcher.clone(), view.clone()).unwrap();
		Fixture {
			overlay: Arc::new(overlay),
			fetcher,
			view,
		}
	}

	fn alpha_at(frame: &OverlayFrame, point: PixelPoint) -> u8 {
		frame.image.get_pixel(point.x as u32, point.y as u32)[3]
	}

	#[tokio::test]
	async fn update_publishes_masked_frame() {
		let Fixture { overlay, fetcher, view } = fixture(LayerOptions::new("roads"));
		let OverlayOutcome::Published(frame) = overlay.update().await.unwrap() else {
			panic!("expected a published frame");
		};
		assert_eq!(frame.image.dimensions(), (400, 300));
		assert_eq!(frame.bounds, view.viewport().bounds);
		assert_eq!(overlay.frame(), Some(frame.clone()));

		assert_eq!(alpha_at(&frame, view.project(&LatLng::new(15.0, 15.0))), 255);
		assert_eq!(alpha_at(&frame, view.project(&LatLng::new(22.0, 22.0))), 0);

		let params: Vec<(String, String)> = fetcher.calls()[0].query_pairs().map(|(k, v)| (k.into(), v.into())).collect();
		assert!(params.contains(&(String::from("WIDTH"), String::from("400"))));
		assert!(params.contains(&(String::from("HEIGHT"), String::from("300"))));
	}

	#[tokio::test]
	async fn inverted_overlay() {
		let Fixture { overlay, view, .. } = fixture(LayerOptions {
			invert_clip: true,
			..LayerOptions::new("roads")
		});
		let OverlayOutcome::Published(frame) = overlay.handle_event(ViewEvent::MoveEnd).await.unwrap() else {
			panic!("expected a published frame");
		};
		assert_eq!(alpha_at(&frame, view.project(&LatLng::new(15.0, 15.0))), 0);
		assert_eq!(alpha_at(&frame, view.project(&LatLng::new(22.0, 22.0))), 255);
	}

	#[tokio::test]
	async fn older_completion_is_discarded() {
		let Fixture { overlay, fetcher, view } = fixture(LayerOptions::new("roads"));

		fetcher.hold_next();
		let slow = {
			let overlay = Arc::clone(&overlay);
			tokio::spawn(async move { overlay.update().await })
		};
		fetcher.wait_for_calls(1).await;

		view.set_zoom(5.0);
		let OverlayOutcome::Published(fresh) = overlay.handle_event(ViewEvent::ZoomEnd).await.unwrap() else {
			panic!("expected a published frame");
		};
		fetcher.release();

		assert_eq!(slow.await.unwrap().unwrap(), OverlayOutcome::Superseded);
		let visible = overlay.frame().unwrap();
		assert_eq!(visible, fresh);
		assert_eq!(visible.generation, 2);
		assert_eq!(visible.bounds, view.viewport().bounds);
	}

	#[tokio::test]
	async fn mask_follows_the_requested_viewport() {
		let Fixture { overlay, fetcher, view } = fixture(LayerOptions::new("roads"));
		let requested = view.viewport();

		fetcher.hold_next();
		let pending = {
			let overlay = Arc::clone(&overlay);
			tokio::spawn(async move { overlay.update().await })
		};
		fetcher.wait_for_calls(1).await;
		view.set_center(LatLng::new(15.0, 40.0));
		fetcher.release();

		let OverlayOutcome::Published(frame) = pending.await.unwrap().unwrap() else {
			panic!("expected a published frame");
		};
		assert_eq!(frame.bounds, requested.bounds);
		assert_eq!(alpha_at(&frame, PixelPoint::new(200.0, 150.0)), 255);
		assert_eq!(alpha_at(&frame, requested.project(&LatLng::new(15.0, 15.0))), 255);
		assert_eq!(alpha_at(&frame, requested.project(&LatLng::new(22.0, 22.0))), 0);
	}

	#[tokio::test]
	async fn failed_update_keeps_previous_frame() {
		let Fixture { overlay, fetcher, .. } = fixture(LayerOptions::new("roads"));
		overlay.update().await.unwrap();
		let before = overlay.frame().unwrap();

		fetcher.set_failing(true);
		let err = overlay.handle_event(ViewEvent::Resize).await.unwrap_err();
		assert!(matches!(
			ClipError::find(&err),
			Some(ClipError::TileFetchFailure { .. })
		));
		assert_eq!(overlay.frame(), Some(before));

		fetcher.set_failing(false);
		assert!(matches!(overlay.update().await.unwrap(), OverlayOutcome::Published(_)));
	}

	#[tokio::test]
	async fn set_boundary_refreshes_and_swallows_fetch_errors() {
		let Fixture { overlay, fetcher, view } = fixture(LayerOptions::new("roads"));
		overlay
			.set_boundary(vec![[14.0, 14.0], [14.0, 16.0], [16.0, 16.0], [16.0, 14.0]])
			.await
			.unwrap();
		let frame = overlay.frame().unwrap();
		assert_eq!(alpha_at(&frame, view.project(&LatLng::new(15.0, 15.0))), 255);
		assert_eq!(alpha_at(&frame, view.project(&LatLng::new(18.0, 18.0))), 0);

		fetcher.set_failing(true);
		overlay.set_boundary(rectangle()).await.unwrap();
		assert_eq!(overlay.get_boundary().to_pairs(), rectangle());
		assert_eq!(overlay.frame(), Some(frame));
	}

	#[tokio::test]
	async fn invalid_boundary_is_rejected_without_fetching() {
		let Fixture { overlay, fetcher, .. } = fixture(LayerOptions::new("roads"));
		let err = overlay
			.set_boundary(Boundary::Polygon { rings: vec![] })
			.await
			.unwrap_err();
		assert!(matches!(
			ClipError::find(&err),
			Some(ClipError::UnsupportedBoundaryFormat { .. })
		));
		assert_eq!(fetcher.call_count(), 0);
		assert_eq!(overlay.get_boundary().to_pairs(), rectangle());
	}

	#[test]
	fn builder_requires_view() {
		let err = ClippedImageOverlay::builder(SOURCE, LayerOptions::new("roads"))
			.boundary(rectangle())
			.fetcher(Arc::new(MockFetcher::new()))
			.build()
			.unwrap_err();
		assert_eq!(ClipError::find(&err), Some(&ClipError::DependencyMissing("a map view")));
	}
}
