//! YAML configuration of the `tile` and `viewport` commands.
//!
//! ```yaml
//! source: https://maps.example.org/wms
//! layer:
//!   layers: [roads, rivers]
//!   invertClip: false
//! boundary:
//!   southWest: [10, 10]
//!   northEast: [20, 20]
//! ```
//!
//! Instead of an inline `boundary`, `boundary_file` may point to a JSON file. Relative
//! paths are resolved against the directory of the configuration file.

use anyhow::{Context, Result, bail};
use geoclip_core::Boundary;
use geoclip_layer::LayerOptions;
use serde::Deserialize;
use serde_json::Value;
use std::{
	fs::{self, File},
	io::{BufReader, Read},
	path::{Path, PathBuf},
};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
	/// Base URL of the WMS service
	pub source: String,

	/// Layer options
	pub layer: LayerOptions,

	/// Inline boundary in any accepted shape
	#[serde(default)]
	pub boundary: Option<Value>,

	/// JSON file with the boundary
	#[serde(default)]
	pub boundary_file: Option<PathBuf>,
}

impl Config {
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		Ok(serde_yaml_ng::from_reader(reader)?)
	}

	pub fn from_string(text: &str) -> Result<Self> {
		Ok(serde_yaml_ng::from_str(text)?)
	}

	/// Parses the file at `path` and resolves `boundary_file` relative to it.
	pub fn from_path(path: &Path) -> Result<Self> {
		let file = File::open(path).with_context(|| format!("opening config file {path:?}"))?;
		let mut config =
			Config::from_reader(BufReader::new(file)).with_context(|| format!("parsing config file {path:?}"))?;
		config.resolve_paths(path.parent().unwrap_or(Path::new("")));
		Ok(config)
	}

	pub fn resolve_paths(&mut self, base: &Path) {
		if let Some(file) = &self.boundary_file
			&& file.is_relative()
		{
			self.boundary_file = Some(base.join(file));
		}
	}

	/// The configured boundary; exactly one of `boundary` and `boundary_file` must be set.
	pub fn boundary(&self) -> Result<Boundary> {
		match (&self.boundary, &self.boundary_file) {
			(Some(value), None) => Boundary::sniff(value).context("reading inline boundary"),
			(None, Some(path)) => read_boundary(path),
			(Some(_), Some(_)) => bail!("config sets both 'boundary' and 'boundary_file', use only one"),
			(None, None) => bail!("config needs either 'boundary' or 'boundary_file'"),
		}
	}
}

/// Reads a JSON boundary file.
pub fn read_boundary(path: &Path) -> Result<Boundary> {
	let text = fs::read_to_string(path).with_context(|| format!("reading boundary file {path:?}"))?;
	text.parse::<Boundary>()
		.with_context(|| format!("reading boundary file {path:?}"))
}

#[cfg(test)]
mod tests {
	use super::*;
	use geoclip_core::{ClipError, LatLng};
	use pretty_assertions::assert_eq;

	#[test]
	fn parse_example_config() {
		let config = Config::from_path(Path::new("../testdata/config.yml")).unwrap();

		assert_eq!(config.source, "https://maps.example.org/wms?map=base");
		assert_eq!(config.layer.layers, "roads,rivers");
		assert_eq!(config.layer.opacity, 0.8);
		assert_eq!(config.boundary, None);
		assert_eq!(config.boundary_file, Some(PathBuf::from("../testdata/square.json")));
		assert_eq!(
			config.boundary().unwrap(),
			Boundary::Rect {
				south_west: LatLng::new(10.0, 10.0),
				north_east: LatLng::new(20.0, 20.0)
			}
		);
	}

	#[test]
	fn inline_boundary() {
		let config = Config::from_string(
			"source: https://wms.example.org\nlayer:\n  layers: base\nboundary: [[0, 0], [0, 1], [1, 1]]\n",
		)
		.unwrap();
		assert_eq!(config.layer, LayerOptions::new("base"));
		assert_eq!(config.boundary().unwrap().kind(), "ring");
	}

	#[test]
	fn inline_boundary_must_be_supported() {
		let config =
			Config::from_string("source: https://wms.example.org\nlayer:\n  layers: base\nboundary: {foo: 1}\n").unwrap();
		let err = config.boundary().unwrap_err();
		assert!(matches!(
			ClipError::find(&err),
			Some(ClipError::UnsupportedBoundaryFormat { .. })
		));
	}

	#[test]
	fn exactly_one_boundary_source() {
		let neither = Config::from_string("source: https://wms.example.org\nlayer:\n  layers: base\n").unwrap();
		assert!(neither.boundary().is_err());

		let both = Config::from_string(
			"source: https://wms.example.org\nlayer:\n  layers: base\nboundary: [[0, 0], [0, 1], [1, 1]]\nboundary_file: b.json\n",
		)
		.unwrap();
		assert!(both.boundary().is_err());
	}

	#[test]
	fn unknown_fields_are_rejected() {
		assert!(Config::from_string("source: x\nlayer:\n  layers: base\ncolour: red\n").is_err());
		assert!(Config::from_string("source: x\nlayer:\n  layers: base\n  colour: red\n").is_err());
	}

	#[test]
	fn absolute_boundary_file_is_kept() {
		let mut config = Config::from_string("source: x\nlayer:\n  layers: base\nboundary_file: /tmp/b.json\n").unwrap();
		config.resolve_paths(Path::new("/etc/geoclip"));
		assert_eq!(config.boundary_file, Some(PathBuf::from("/tmp/b.json")));
	}
}
