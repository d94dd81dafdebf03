use super::save_image;
use crate::config::Config;
use anyhow::{Context, Result, bail};
use clap::Args;
use geoclip_core::LatLng;
use geoclip_layer::{ClippedImageOverlay, HttpFetcher, MercatorView, OverlayOutcome};
use std::{path::PathBuf, sync::Arc};

#[derive(Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// YAML file with source URL, layer options and boundary
	#[arg(long, short, required = true)]
	config: PathBuf,

	/// output image; the format follows the file extension
	#[arg(required = true)]
	output: PathBuf,

	/// map center as "lat,lng"
	/// without a center the view is fitted to the boundary
	#[arg(long, value_parser = parse_center, allow_hyphen_values = true, verbatim_doc_comment)]
	center: Option<LatLng>,

	/// zoom level, used together with --center
	#[arg(long, short, default_value_t = 10.0)]
	zoom: f64,

	/// image size as WIDTHxHEIGHT
	/// when fitting to the boundary only the width is used
	#[arg(long, short, value_parser = parse_size, default_value = "1024x768", verbatim_doc_comment)]
	size: (u32, u32),
}

fn parse_center(text: &str) -> Result<LatLng, String> {
	let (lat, lng) = text
		.split_once(',')
		.ok_or_else(|| format!("center '{text}' must look like lat,lng"))?;
	let lat = lat.trim().parse::<f64>().map_err(|e| format!("invalid latitude '{lat}': {e}"))?;
	let lng = lng.trim().parse::<f64>().map_err(|e| format!("invalid longitude '{lng}': {e}"))?;
	Ok(LatLng::new(lat, lng))
}

fn parse_size(text: &str) -> Result<(u32, u32), String> {
	let (width, height) = text
		.split_once(['x', 'X'])
		.ok_or_else(|| format!("size '{text}' must look like WIDTHxHEIGHT"))?;
	let width = width.parse::<u32>().map_err(|e| format!("invalid width '{width}': {e}"))?;
	let height = height.parse::<u32>().map_err(|e| format!("invalid height '{height}': {e}"))?;
	if width == 0 || height == 0 {
		return Err(format!("size '{text}' must not be zero"));
	}
	Ok((width, height))
}

#[tokio::main]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	let config = Config::from_path(&arguments.config)?;
	let boundary = config.boundary()?;
	let (width, height) = arguments.size;

	let view = Arc::new(match arguments.center {
		Some(center) => MercatorView::new(center, arguments.zoom, width, height),
		None => MercatorView::fit_bounds(&boundary.normalize()?.bounds(), width),
	});

	let overlay = ClippedImageOverlay::new(
		&config.source,
		config.layer.clone(),
		boundary,
		Arc::new(HttpFetcher::new()?),
		view,
	)?;

	match overlay.update().await.context("rendering viewport")? {
		OverlayOutcome::Published(frame) => {
			log::info!("viewport covers {:?}", frame.bounds);
			save_image(&frame.image, &arguments.output)
		}
		OverlayOutcome::Superseded => bail!("viewport image was superseded by a newer update"),
	}
}
