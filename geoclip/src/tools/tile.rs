use super::save_image;
use crate::config::Config;
use anyhow::{Context, Result, bail};
use clap::Args;
use geoclip_core::TileCoord;
use geoclip_layer::{ClippedTileLayer, HttpFetcher, TileOutcome};
use std::{path::PathBuf, sync::Arc};

#[derive(Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// YAML file with source URL, layer options and boundary
	#[arg(long, short, required = true)]
	config: PathBuf,

	/// tile to render, as z/x/y
	#[arg(required = true)]
	tile: String,

	/// output image; the format follows the file extension
	#[arg(required = true)]
	output: PathBuf,

	/// print the GetMap URL instead of rendering
	#[arg(long)]
	url: bool,
}

#[tokio::main]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	let config = Config::from_path(&arguments.config)?;
	let coord: TileCoord = arguments.tile.parse()?;

	let layer = ClippedTileLayer::new(
		&config.source,
		config.layer.clone(),
		config.boundary()?,
		Arc::new(HttpFetcher::new()?),
	)?;

	if arguments.url {
		println!("{}", layer.tile_url(&coord));
		return Ok(());
	}

	let image = match layer
		.get_tile(&coord)
		.await
		.with_context(|| format!("rendering tile {coord}"))?
	{
		TileOutcome::Masked(image) => image,
		TileOutcome::Empty(image) => {
			log::info!("tile {coord} lies outside the boundary");
			image
		}
		TileOutcome::Superseded => bail!("tile {coord} was superseded by a boundary change"),
	};

	save_image(&image, &arguments.output)
}
