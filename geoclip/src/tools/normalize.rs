use crate::config::read_boundary;
use anyhow::{Context, Result};
use clap::Args;
use geoclip_core::{BoundaryRing, merge_boundaries};
use std::path::PathBuf;

#[derive(Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// JSON files with a boundary in any supported shape
	/// (ring, bounds, polygon or GeoJSON).
	/// Several files are merged into one ring.
	#[arg(required = true, num_args = 1.., verbatim_doc_comment)]
	filenames: Vec<PathBuf>,

	/// pretty-print the output
	#[arg(long, short)]
	pretty: bool,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	println!("{}", normalize(arguments)?);
	Ok(())
}

fn normalize(arguments: &Subcommand) -> Result<String> {
	let rings = arguments
		.filenames
		.iter()
		.map(|path| {
			read_boundary(path)?
				.normalize()
				.with_context(|| format!("normalizing boundary from {path:?}"))
		})
		.collect::<Result<Vec<BoundaryRing>>>()?;

	let ring = match rings.as_slice() {
		[ring] => ring.clone(),
		_ => merge_boundaries(&rings)?,
	};
	log::debug!("normalized ring has {} points", ring.len());

	Ok(if arguments.pretty {
		serde_json::to_string_pretty(&ring)?
	} else {
		serde_json::to_string(&ring)?
	})
}
