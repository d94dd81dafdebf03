pub mod normalize;
pub mod tile;
pub mod viewport;

use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat};
use std::{fs, path::Path};

/// Writes `image` to `path` in the format its extension names.
pub fn save_image(image: &DynamicImage, path: &Path) -> Result<()> {
	let format = ImageFormat::from_path(path).with_context(|| format!("unknown image format for {path:?}"))?;
	let bytes = geoclip_image::encode(image, format)?;
	fs::write(path, bytes).with_context(|| format!("writing {path:?}"))?;
	log::info!("wrote {}x{} image to {path:?}", image.width(), image.height());
	Ok(())
}
