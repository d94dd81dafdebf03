use image::DynamicImage;

/// Gradient images for tests.
pub trait DynamicImageTraitTest {
	fn new_test_rgba() -> DynamicImage;
	fn new_test_rgb() -> DynamicImage;
	/// Single opaque color, handy for checking masks by alpha alone.
	fn new_test_solid(width: u32, height: u32, color: [u8; 3]) -> DynamicImage;
}

impl DynamicImageTraitTest for DynamicImage {
	/// 256×256 RGBA gradient; alpha falls from 255 at the top to 0 at the bottom.
	fn new_test_rgba() -> DynamicImage {
		DynamicImage::from(image::RgbaImage::from_fn(256, 256, |x, y| {
			image::Rgba([x as u8, (255 - x) as u8, y as u8, (255 - y) as u8])
		}))
	}

	fn new_test_rgb() -> DynamicImage {
		DynamicImage::from(image::RgbImage::from_fn(256, 256, |x, y| {
			image::Rgb([x as u8, (255 - x) as u8, y as u8])
		}))
	}

	fn new_test_solid(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
		DynamicImage::from(image::RgbImage::from_pixel(width, height, image::Rgb(color)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use image::GenericImageView;

	#[test]
	fn gradients() {
		let rgba = DynamicImage::new_test_rgba();
		assert_eq!(rgba.dimensions(), (256, 256));
		assert_eq!(rgba.get_pixel(255, 0).0, [255, 0, 0, 255]);
		assert_eq!(rgba.get_pixel(0, 255).0, [0, 255, 255, 0]);

		let rgb = DynamicImage::new_test_rgb();
		assert_eq!(rgb.get_pixel(10, 20).0, [10, 245, 20, 255]);
	}

	#[test]
	fn solid() {
		let image = DynamicImage::new_test_solid(3, 2, [1, 2, 3]);
		assert_eq!(image.dimensions(), (3, 2));
		assert_eq!(image.get_pixel(2, 1).0, [1, 2, 3, 255]);
	}
}
