//! Clip operations on `DynamicImage`.
//!
//! [`DynamicImageTraitClip`] adds the steps a clipped layer performs on every fetched
//! image: bring it to the expected size, convert it to RGBA and multiply its alpha
//! channel with a [`ClipMask`] and the layer opacity.

use crate::ClipMask;
use anyhow::{Context, Result, ensure};
use geoclip_core::PixelPoint;
use image::{DynamicImage, RgbaImage, imageops::FilterType};

pub trait DynamicImageTraitClip {
	/// Multiplies the alpha channel with `mask` (or `255 − mask` when `invert`) and `opacity`.
	///
	/// Images without an alpha channel are converted to RGBA first. Fails if the mask
	/// size differs from the image size or `opacity` is outside `0..=1`.
	fn apply_mask(&mut self, mask: &ClipMask, invert: bool, opacity: f64) -> Result<()>;

	/// Rasterizes `polygon` at the image size and applies it.
	fn into_clipped(self, polygon: &[PixelPoint], invert: bool, opacity: f64) -> Result<DynamicImage>;

	/// Returns the image resized to exactly `width × height`, or unchanged if it already is.
	fn into_size(self, width: u32, height: u32) -> DynamicImage;
}

impl DynamicImageTraitClip for DynamicImage {
	fn apply_mask(&mut self, mask: &ClipMask, invert: bool, opacity: f64) -> Result<()> {
		ensure!(
			mask.width() == self.width() && mask.height() == self.height(),
			"mask size {}x{} does not match image size {}x{}",
			mask.width(),
			mask.height(),
			self.width(),
			self.height()
		);
		ensure!((0.0..=1.0).contains(&opacity), "opacity ({opacity}) must be between 0 and 1");

		let scale = (opacity * 255.0).round() as u32;
		if let DynamicImage::ImageRgba8(buffer) = self {
			multiply_alpha(buffer, mask, invert, scale);
		} else {
			let mut buffer = self.to_rgba8();
			multiply_alpha(&mut buffer, mask, invert, scale);
			*self = DynamicImage::ImageRgba8(buffer);
		}
		Ok(())
	}

	fn into_clipped(mut self, polygon: &[PixelPoint], invert: bool, opacity: f64) -> Result<DynamicImage> {
		let mask = ClipMask::from_polygon(polygon, self.width(), self.height());
		self
			.apply_mask(&mask, invert, opacity)
			.with_context(|| format!("clipping {}x{} image", self.width(), self.height()))?;
		Ok(self)
	}

	fn into_size(self, width: u32, height: u32) -> DynamicImage {
		if self.width() == width && self.height() == height {
			return self;
		}
		log::debug!(
			"resizing fetched image from {}x{} to {width}x{height}",
			self.width(),
			self.height()
		);
		self.resize_exact(width, height, FilterType::Triangle)
	}
}

fn multiply_alpha(buffer: &mut RgbaImage, mask: &ClipMask, invert: bool, scale: u32) {
	for (pixel, value) in buffer.pixels_mut().zip(mask.as_slice()) {
		let m = u32::from(if invert { 255 - value } else { *value });
		if m == 0 {
			pixel.0 = [0, 0, 0, 0];
			continue;
		}
		pixel[3] = ((u32::from(pixel[3]) * m * scale) / (255 * 255)) as u8;
	}
}

/// A fully transparent square RGBA image.
#[must_use]
pub fn blank_tile(size: u32) -> DynamicImage {
	DynamicImage::new_rgba8(size, size)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::DynamicImageTraitTest;
	use image::GenericImageView;
	use rstest::rstest;

	fn left_half_polygon(size: f64) -> Vec<PixelPoint> {
		vec![
			PixelPoint::new(0.0, 0.0),
			PixelPoint::new(size / 2.0, 0.0),
			PixelPoint::new(size / 2.0, size),
			PixelPoint::new(0.0, size),
		]
	}

	#[rstest]
	#[case::normal(false, 255, 0)]
	#[case::inverted(true, 0, 255)]
	fn clip_left_half(#[case] invert: bool, #[case] left_alpha: u8, #[case] right_alpha: u8) {
		let image = DynamicImage::new_test_rgb()
			.into_clipped(&left_half_polygon(256.0), invert, 1.0)
			.unwrap();
		assert_eq!(image.get_pixel(10, 100)[3], left_alpha);
		assert_eq!(image.get_pixel(240, 100)[3], right_alpha);
	}

	#[test]
	fn kept_pixels_keep_their_color() {
		let source = DynamicImage::new_test_rgb();
		let clipped = source.clone().into_clipped(&left_half_polygon(256.0), false, 1.0).unwrap();
		let before = source.get_pixel(20, 30);
		let after = clipped.get_pixel(20, 30);
		assert_eq!(&after.0[..3], &before.0[..3]);
	}

	#[test]
	fn existing_alpha_is_multiplied() {
		let mut image = DynamicImage::new_test_rgba();
		let mask = ClipMask::filled(256, 256, 255);
		let before = image.get_pixel(0, 100)[3];
		image.apply_mask(&mask, false, 1.0).unwrap();
		assert_eq!(image.get_pixel(0, 100)[3], before);
	}

	#[rstest]
	#[case(1.0, 255)]
	#[case(0.5, 128)]
	#[case(0.0, 0)]
	fn opacity_scales_alpha(#[case] opacity: f64, #[case] expected: u8) {
		let mut image = DynamicImage::new_test_rgb();
		image.apply_mask(&ClipMask::filled(256, 256, 255), false, opacity).unwrap();
		assert_eq!(image.get_pixel(5, 5)[3], expected);
	}

	#[test]
	fn mismatched_mask_is_rejected() {
		let mut image = DynamicImage::new_test_rgb();
		assert!(image.apply_mask(&ClipMask::filled(10, 10, 255), false, 1.0).is_err());
		assert!(image.apply_mask(&ClipMask::filled(256, 256, 255), false, 1.5).is_err());
	}

	#[test]
	fn resize_only_when_needed() {
		let image = DynamicImage::new_test_rgb();
		assert_eq!(image.clone().into_size(256, 256), image);
		assert_eq!(image.into_size(64, 32).dimensions(), (64, 32));
	}

	#[test]
	fn blank_tile_is_transparent() {
		let tile = blank_tile(128);
		assert_eq!(tile.dimensions(), (128, 128));
		assert!(tile.to_rgba8().pixels().all(|p| p[3] == 0));
	}
}
