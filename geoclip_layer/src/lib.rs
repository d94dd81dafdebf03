//! Map layers that show a WMS service only inside (or outside) a boundary.
//!
//! Two strategies are available:
//!
//! - [`ClippedTileLayer`] fetches and masks one tile at a time.
//! - [`ClippedImageOverlay`] fetches one image per viewport and masks it once.
//!
//! Both take their images from an [`ImageFetcher`] and learn about the map through a
//! [`MapView`]; [`HttpFetcher`] and [`MercatorView`] are ready-made implementations.
//!
//! ```no_run
//! use geoclip_layer::{ClippedTileLayer, HttpFetcher, LayerOptions};
//! use geoclip_core::TileCoord;
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let layer = ClippedTileLayer::new(
//! 	"https://maps.example.org/wms",
//! 	LayerOptions::new("roads"),
//! 	vec![[10.0, 10.0], [10.0, 20.0], [20.0, 20.0], [20.0, 10.0]],
//! 	Arc::new(HttpFetcher::new()?),
//! )?;
//! let tile = layer.get_tile(&TileCoord::new(5, 16, 14)?).await?;
//! # Ok(())
//! # }
//! ```

mod fetch;
mod options;
mod overlay;
mod state;
#[cfg(test)]
mod testing;
mod tile_layer;
mod view;
pub mod wms;

pub use fetch::{HttpFetcher, ImageFetcher};
pub use options::{ClipMode, LayerOptions};
pub use overlay::{ClippedImageOverlay, ClippedImageOverlayBuilder, OverlayFrame, OverlayOutcome};
pub use state::{BoundarySnapshot, BoundaryState};
pub use tile_layer::{ClippedTileLayer, ClippedTileLayerBuilder, TileOutcome, TileState};
pub use view::{MAX_FIT_HEIGHT, MapView, MercatorView, ViewEvent, Viewport};
