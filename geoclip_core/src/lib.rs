//! Boundary normalization and the geometry kernel used to clip raster map layers.
//!
//! Contains the coordinate types ([`LatLng`], [`GeoBBox`], [`TileCoord`], [`PixelPoint`]),
//! the [`Boundary`] input union with its canonical [`BoundaryRing`], and the stateless
//! projection / point-in-polygon / intersection functions in [`geometry`].

pub mod boundary;
pub mod error;
pub mod geometry;
pub mod types;

pub use boundary::*;
pub use error::ClipError;
pub use types::*;
