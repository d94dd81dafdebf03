//! WMS GetMap URLs, built the way an unclipped WMS layer would request its images.

use crate::LayerOptions;
use anyhow::{Context, Result, bail};
use reqwest::Url;

/// Parses the service base URL; only `http` and `https` are accepted.
pub fn parse_source_url(source_url: &str) -> Result<Url> {
	let url = Url::parse(source_url).with_context(|| format!("parsing source URL '{source_url}'"))?;
	match url.scheme() {
		"http" | "https" => Ok(url),
		other => bail!("unsupported URL scheme '{other}' in '{source_url}', expected 'http' or 'https'"),
	}
}

/// WMS 1.3.0 and later name the reference system `CRS`, earlier versions `SRS`.
fn crs_key(version: &str) -> &'static str {
	let mut parts = version.split('.').map(|part| part.trim().parse::<u32>().unwrap_or(0));
	let major = parts.next().unwrap_or(0);
	let minor = parts.next().unwrap_or(0);
	if (major, minor) >= (1, 3) { "CRS" } else { "SRS" }
}

/// GetMap URL for `bbox` (Web-Mercator meters, `[x_min, y_min, x_max, y_max]`) at
/// `width × height` pixels. Query parameters already present on `base` are kept.
#[must_use]
pub fn get_map_url(base: &Url, options: &LayerOptions, bbox: [f64; 4], width: u32, height: u32) -> Url {
	let mut url = base.clone();
	{
		let mut query = url.query_pairs_mut();
		query
			.append_pair("SERVICE", "WMS")
			.append_pair("REQUEST", "GetMap")
			.append_pair("VERSION", &options.version)
			.append_pair("LAYERS", &options.layers)
			.append_pair("STYLES", &options.styles)
			.append_pair("FORMAT", &options.format)
			.append_pair("TRANSPARENT", if options.transparent { "TRUE" } else { "FALSE" })
			.append_pair("WIDTH", &width.to_string())
			.append_pair("HEIGHT", &height.to_string())
			.append_pair(crs_key(&options.version), "EPSG:3857")
			.append_pair("BBOX", &format!("{},{},{},{}", bbox[0], bbox[1], bbox[2], bbox[3]));
		for (key, value) in &options.extra_params {
			query.append_pair(key, value);
		}
	}
	url
}
