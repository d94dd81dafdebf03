//! Options shared by both clipped layer kinds.

use anyhow::Result;
use geoclip_core::ClipError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// How the clip is drawn. Only one strategy exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipMode {
	/// Rasterize the boundary into an alpha mask and draw the image through it.
	#[default]
	Canvas,
}

/// Request and rendering options of a clipped WMS layer.
///
/// `layers` is required; everything else has a default. Keys are accepted in
/// snake_case and in the camelCase used by web map clients.
///
/// ```
/// use geoclip_layer::LayerOptions;
///
/// let options = LayerOptions { invert_clip: true, ..LayerOptions::new("roads,rivers") };
/// assert_eq!(options.format, "image/png");
/// assert_eq!(options.tile_size, 256);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LayerOptions {
	/// Comma-joined layer names; a list is joined on input.
	#[serde(deserialize_with = "deserialize_layers")]
	pub layers: String,
	#[serde(default = "default_format")]
	pub format: String,
	#[serde(default = "default_true")]
	pub transparent: bool,
	#[serde(default = "default_opacity")]
	pub opacity: f64,
	#[serde(default)]
	pub attribution: Option<String>,
	#[serde(default = "default_tile_size", alias = "tileSize")]
	pub tile_size: u32,
	#[serde(default, alias = "clipMode")]
	pub clip_mode: ClipMode,
	/// Show the area outside the boundary instead of inside.
	#[serde(default, alias = "invertClip")]
	pub invert_clip: bool,
	#[serde(default)]
	pub styles: String,
	#[serde(default = "default_version")]
	pub version: String,
	/// Further query parameters sent with every request.
	#[serde(default, alias = "extraParams")]
	pub extra_params: BTreeMap<String, String>,
	/// Use an exact polygon/tile intersection instead of the bounding-box heuristic.
	#[serde(default, alias = "exactIntersection")]
	pub exact_intersection: bool,
}

fn default_format() -> String {
	String::from("image/png")
}

fn default_true() -> bool {
	true
}

fn default_opacity() -> f64 {
	1.0
}

fn default_tile_size() -> u32 {
	256
}

fn default_version() -> String {
	String::from("1.1.1")
}

fn deserialize_layers<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Layers {
		Joined(String),
		List(Vec<String>),
	}
	Ok(match Layers::deserialize(deserializer)? {
		Layers::Joined(layers) => layers,
		Layers::List(list) => list.join(","),
	})
}

impl LayerOptions {
	/// Options for `layers` with every other value at its default.
	#[must_use]
	pub fn new(layers: impl Into<String>) -> Self {
		LayerOptions {
			layers: layers.into(),
			format: default_format(),
			transparent: true,
			opacity: default_opacity(),
			attribution: None,
			tile_size: default_tile_size(),
			clip_mode: ClipMode::Canvas,
			invert_clip: false,
			styles: String::new(),
			version: default_version(),
			extra_params: BTreeMap::new(),
			exact_intersection: false,
		}
	}

	/// Checks value ranges; fails with [`ClipError::InvalidOptions`].
	pub fn validate(&self) -> Result<()> {
		let invalid = |message: String| -> Result<()> { Err(ClipError::InvalidOptions(message).into()) };

		if self.layers.split(',').all(|layer| layer.trim().is_empty()) {
			return invalid(String::from("'layers' must name at least one layer"));
		}
		if !(0.0..=1.0).contains(&self.opacity) {
			return invalid(format!("'opacity' must be between 0 and 1, got {}", self.opacity));
		}
		if self.tile_size == 0 || self.tile_size > 4096 {
			return invalid(format!("'tile_size' must be between 1 and 4096, got {}", self.tile_size));
		}
		if self.format.trim().is_empty() {
			return invalid(String::from("'format' must not be empty"));
		}
		Ok(())
	}
}
