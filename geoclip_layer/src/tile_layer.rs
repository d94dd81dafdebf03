//! Clipping tile by tile.
//!
//! Each tile request snapshots the boundary generation, fetches the unclipped tile and
//! masks it with the ring that is current when the image arrives. A request whose
//! generation was overtaken by [`ClippedTileLayer::set_boundary`] while it was in
//! flight is dropped as [`TileOutcome::Superseded`].

use crate::{
	BoundaryState, ImageFetcher, LayerOptions, MapView,
	fetch::as_fetch_failure,
	wms::{get_map_url, parse_source_url},
};
use anyhow::{Context, Result};
use futures::future::join_all;
use geoclip_core::{
	Boundary, BoundaryRing, ClipError, TileCoord,
	geometry::{ring_to_tile_pixels, tile_intersects_boundary, tile_intersects_boundary_exact},
};
use geoclip_image::{DynamicImageTraitClip, blank_tile};
use image::DynamicImage;
use reqwest::Url;
use std::{
	fmt::{self, Debug, Display},
	sync::Arc,
};
use tokio::task::JoinHandle;

/// Progress of one tile request, reported in trace logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileState {
	Requested,
	Loaded,
	Masked,
	Failed,
}

impl Display for TileState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			TileState::Requested => "requested",
			TileState::Loaded => "loaded",
			TileState::Masked => "masked",
			TileState::Failed => "failed",
		})
	}
}

/// Result of a successful tile request.
#[derive(Clone, Debug, PartialEq)]
pub enum TileOutcome {
	/// The fetched image drawn through the boundary mask.
	Masked(DynamicImage),
	/// The tile does not touch the boundary; a transparent tile, nothing was fetched.
	Empty(DynamicImage),
	/// The boundary changed while the tile was loading; the result was dropped.
	Superseded,
}

impl TileOutcome {
	#[must_use]
	pub fn image(&self) -> Option<&DynamicImage> {
		match self {
			TileOutcome::Masked(image) | TileOutcome::Empty(image) => Some(image),
			TileOutcome::Superseded => None,
		}
	}

	#[must_use]
	pub fn into_image(self) -> Option<DynamicImage> {
		match self {
			TileOutcome::Masked(image) | TileOutcome::Empty(image) => Some(image),
			TileOutcome::Superseded => None,
		}
	}
}

/// A WMS tile layer clipped to a boundary.
pub struct ClippedTileLayer {
	source: Url,
	options: LayerOptions,
	boundary: BoundaryState,
	fetcher: Arc<dyn ImageFetcher>,
	view: Option<Arc<dyn MapView>>,
}

impl ClippedTileLayer {
	/// Validates the options and normalizes the boundary; nothing is built if either fails.
	pub fn new(
		source_url: &str,
		options: LayerOptions,
		boundary: impl Into<Boundary>,
		fetcher: Arc<dyn ImageFetcher>,
	) -> Result<ClippedTileLayer> {
		options.validate()?;
		let source = parse_source_url(source_url)?;
		let boundary = BoundaryState::from_boundary(&boundary.into()).context("creating clipped tile layer")?;
		log::debug!(
			"clipped tile layer for '{source}' (layers '{}'), invert: {}",
			options.layers,
			options.invert_clip
		);
		Ok(ClippedTileLayer {
			source,
			options,
			boundary,
			fetcher,
			view: None,
		})
	}

	#[must_use]
	pub fn builder(source_url: &str, options: LayerOptions) -> ClippedTileLayerBuilder {
		ClippedTileLayerBuilder {
			source_url: source_url.to_owned(),
			options,
			boundary: None,
			fetcher: None,
			view: None,
		}
	}

	/// Attaches the map view that is invalidated on boundary changes.
	#[must_use]
	pub fn with_view(mut self, view: Arc<dyn MapView>) -> Self {
		self.view = Some(view);
		self
	}

	#[must_use]
	pub fn options(&self) -> &LayerOptions {
		&self.options
	}

	#[must_use]
	pub fn source_url(&self) -> &Url {
		&self.source
	}

	/// Generation of the current boundary; increases with every `set_boundary`.
	#[must_use]
	pub fn generation(&self) -> u64 {
		self.boundary.generation()
	}

	/// The GetMap URL an unclipped layer would use for `coord`.
	#[must_use]
	pub fn tile_url(&self, coord: &TileCoord) -> Url {
		let size = self.options.tile_size;
		get_map_url(&self.source, &self.options, coord.to_mercator_bbox(), size, size)
	}

	/// Whether `coord` has to be fetched under `ring`.
	fn intersects(&self, coord: &TileCoord, ring: &BoundaryRing) -> bool {
		if self.options.exact_intersection {
			tile_intersects_boundary_exact(coord, ring)
		} else {
			tile_intersects_boundary(coord, ring)
		}
	}

	/// Renders one tile.
	///
	/// # Errors
	/// Fails with [`ClipError::TileFetchFailure`] when the image cannot be fetched.
	/// The layer stays usable afterwards.
	pub async fn get_tile(&self, coord: &TileCoord) -> Result<TileOutcome> {
		let size = self.options.tile_size;
		let snapshot = self.boundary.load();
		log::trace!("tile {coord}: {}", TileState::Requested);

		if !self.options.invert_clip && !self.intersects(coord, &snapshot.ring) {
			log::trace!("tile {coord}: outside boundary, {}", TileState::Masked);
			return Ok(TileOutcome::Empty(blank_tile(size)));
		}

		let url = self.tile_url(coord);
		let image = match self.fetcher.fetch(&url).await {
			Ok(image) => image,
			Err(err) => {
				log::trace!("tile {coord}: {}", TileState::Failed);
				return Err(as_fetch_failure(err, &url));
			}
		};
		log::trace!("tile {coord}: {}", TileState::Loaded);

		let current = self.boundary.load();
		if current.generation != snapshot.generation {
			log::debug!(
				"tile {coord}: dropped, boundary generation moved from {} to {}",
				snapshot.generation,
				current.generation
			);
			return Ok(TileOutcome::Superseded);
		}

		let polygon = ring_to_tile_pixels(&current.ring, coord, size);
		let image = image
			.into_size(size, size)
			.into_clipped(&polygon, self.options.invert_clip, self.options.opacity)
			.with_context(|| format!("masking tile {coord}"))?;
		log::trace!("tile {coord}: {}", TileState::Masked);
		Ok(TileOutcome::Masked(image))
	}

	/// Runs [`get_tile`](Self::get_tile) as its own task.
	pub fn spawn_tile(self: &Arc<Self>, coord: TileCoord) -> JoinHandle<Result<TileOutcome>> {
		let layer = Arc::clone(self);
		tokio::spawn(async move { layer.get_tile(&coord).await })
	}

	/// Renders several tiles concurrently; one failing tile does not affect the others.
	pub async fn get_tiles(&self, coords: &[TileCoord]) -> Vec<(TileCoord, Result<TileOutcome>)> {
		let results = join_all(coords.iter().map(|coord| self.get_tile(coord))).await;
		coords.iter().copied().zip(results).collect()
	}

	/// Replaces the boundary and asks the view to re-request all tiles.
	///
	/// Tiles still in flight resolve as [`TileOutcome::Superseded`]. If `boundary`
	/// cannot be normalized the previous boundary stays active.
	pub fn set_boundary(&self, boundary: impl Into<Boundary>) -> Result<&Self> {
		self.boundary.set(&boundary.into())?;
		if let Some(view) = &self.view {
			view.invalidate();
		}
		Ok(self)
	}

	/// A copy of the current ring.
	#[must_use]
	pub fn get_boundary(&self) -> BoundaryRing {
		self.boundary.ring()
	}
}

impl Debug for ClippedTileLayer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ClippedTileLayer")
			.field("source", &self.source.as_str())
			.field("layers", &self.options.layers)
			.field("generation", &self.boundary.generation())
			.finish_non_exhaustive()
	}
}

/// Step-by-step construction of a [`ClippedTileLayer`].
pub struct ClippedTileLayerBuilder {
	source_url: String,
	options: LayerOptions,
	boundary: Option<Boundary>,
	fetcher: Option<Arc<dyn ImageFetcher>>,
	view: Option<Arc<dyn MapView>>,
}

impl ClippedTileLayerBuilder {
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
	/// [`ClipError::DependencyMissing`] without a boundary or fetcher, otherwise
	/// whatever [`ClippedTileLayer::new`] reports.
	pub fn build(self) -> Result<ClippedTileLayer> {
		let boundary = self.boundary.ok_or(ClipError::DependencyMissing("a boundary"))?;
		let fetcher = self.fetcher.ok_or(ClipError::DependencyMissing("an image fetcher"))?;
		let layer = ClippedTileLayer::new(&self.source_url, self.options, boundary, fetcher)?;
		Ok(match self.view {
			Some(view) => layer.with_view(view),
			None => layer,
		})
	}
}
