//! Alpha masks rasterized from pixel-space polygons.

use geoclip_core::{
	PixelPoint,
	geometry::{EdgeIndex, RegionClass},
};
use std::fmt::{self, Debug};

/// Number of blocks per axis that are classified before falling back to per-pixel tests.
const GRID_SIZE: u32 = 8;

/// One alpha value per pixel, row-major: 255 inside the polygon, 0 outside.
///
/// A pixel is inside when its center `(x + 0.5, y + 0.5)` is inside the polygon.
#[derive(Clone, PartialEq, Eq)]
pub struct ClipMask {
	width: u32,
	height: u32,
	alpha: Vec<u8>,
}

impl ClipMask {
	/// A mask with every pixel set to `value`.
	#[must_use]
	pub fn filled(width: u32, height: u32, value: u8) -> ClipMask {
		ClipMask {
			width,
			height,
			alpha: vec![value; width as usize * height as usize],
		}
	}

	/// Rasterizes `polygon` (open or closed, any winding) into a `width × height` mask.
	///
	/// The image is split into an 8×8 grid of blocks. Blocks that no polygon edge
	/// touches are filled in one go; only the remaining blocks are tested pixel by pixel.
	#[must_use]
	pub fn from_polygon(polygon: &[PixelPoint], width: u32, height: u32) -> ClipMask {
		let mut mask = ClipMask::filled(width, height, 0);
		let ring: Vec<[f64; 2]> = polygon.iter().map(|p| [p.x, p.y]).collect();
		let Some(index) = EdgeIndex::from_ring(&ring) else {
			return mask;
		};
		if width == 0 || height == 0 {
			return mask;
		}

		let grid_x = GRID_SIZE.min(width);
		let grid_y = GRID_SIZE.min(height);
		let block_width = width / grid_x;
		let block_height = height / grid_y;

		for gy in 0..grid_y {
			let y0 = gy * block_height;
			let y1 = if gy == grid_y - 1 { height } else { y0 + block_height };
			for gx in 0..grid_x {
				let x0 = gx * block_width;
				let x1 = if gx == grid_x - 1 { width } else { x0 + block_width };

				let block = [f64::from(x0), f64::from(y0), f64::from(x1), f64::from(y1)];
				match index.classify(block) {
					RegionClass::Outside => {}
					RegionClass::Inside => mask.fill_block(x0, y0, x1, y1),
					RegionClass::Partial => {
						for y in y0..y1 {
							for x in x0..x1 {
								if index.contains(f64::from(x) + 0.5, f64::from(y) + 0.5) {
									mask.alpha[(y * width + x) as usize] = 255;
								}
							}
						}
					}
				}
			}
		}

		mask
	}

	fn fill_block(&mut self, x0: u32, y0: u32, x1: u32, y1: u32) {
		for y in y0..y1 {
			let row = (y * self.width) as usize;
			self.alpha[row + x0 as usize..row + x1 as usize].fill(255);
		}
	}

	#[must_use]
	pub fn width(&self) -> u32 {
		self.width
	}

	#[must_use]
	pub fn height(&self) -> u32 {
		self.height
	}

	#[must_use]
	pub fn get(&self, x: u32, y: u32) -> u8 {
		self.alpha[(y * self.width + x) as usize]
	}

	#[must_use]
	pub fn as_slice(&self) -> &[u8] {
		&self.alpha
	}

	/// Swaps inside and outside.
	#[must_use]
	pub fn inverted(&self) -> ClipMask {
		ClipMask {
			width: self.width,
			height: self.height,
			alpha: self.alpha.iter().map(|a| 255 - a).collect(),
		}
	}

	/// True if no pixel is inside.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.alpha.iter().all(|a| *a == 0)
	}

	/// True if every pixel is inside.
	#[must_use]
	pub fn is_full(&self) -> bool {
		self.alpha.iter().all(|a| *a == 255)
	}

	/// Fraction of pixels inside, between 0 and 1.
	#[must_use]
	pub fn coverage(&self) -> f64 {
		if self.alpha.is_empty() {
			return 0.0;
		}
		let inside = self.alpha.iter().filter(|a| **a > 0).count();
		inside as f64 / self.alpha.len() as f64
	}
}

impl Debug for ClipMask {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ClipMask")
			.field("width", &self.width)
			.field("height", &self.height)
			.field("coverage", &self.coverage())
			.finish()
	}
}
