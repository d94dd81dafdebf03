//! Encoding and decoding of fetched and rendered images.

use anyhow::{Context, Result, anyhow};
use image::{DynamicImage, ImageFormat, load_from_memory, load_from_memory_with_format};
use std::io::Cursor;

/// Maps a MIME type such as `image/png` to an image format.
#[must_use]
pub fn format_from_mime(mime: &str) -> Option<ImageFormat> {
	let essence = mime.split(';').next().unwrap_or(mime).trim();
	ImageFormat::from_mime_type(essence)
}

/// Decodes `bytes`, trusting `mime` when it names a known format and guessing otherwise.
pub fn decode(bytes: &[u8], mime: Option<&str>) -> Result<DynamicImage> {
	match mime.and_then(format_from_mime) {
		Some(format) => load_from_memory_with_format(bytes, format)
			.map_err(|e| anyhow!("failed to decode {format:?} image: {e}")),
		None => load_from_memory(bytes).map_err(|e| anyhow!("failed to decode image: {e}")),
	}
}

/// Encodes `image` in `format`.
///
/// Transparency survives only in PNG and WebP; JPEG output drops the alpha channel.
pub fn encode(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
	let mut buffer = Cursor::new(Vec::new());
	let image = match format {
		ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
		_ => image.clone(),
	};
	image
		.write_to(&mut buffer, format)
		.with_context(|| format!("encoding {}x{} image as {format:?}", image.width(), image.height()))?;
	Ok(buffer.into_inner())
}
