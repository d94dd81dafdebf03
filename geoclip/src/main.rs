mod config;
mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{ErrorLevel, Verbosity};

#[derive(Parser, Debug)]
#[command(
	author,
	version,
	about,
	long_about = None,
	propagate_version = true,
	disable_help_subcommand = true,
)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[command(flatten)]
	verbose: Verbosity<ErrorLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Print a boundary as a closed ring of [lat, lng] pairs
	Normalize(tools::normalize::Subcommand),

	/// Render one clipped map tile
	Tile(tools::tile::Subcommand),

	#[clap(alias = "overlay")]
	/// Render one clipped image for a map viewport
	Viewport(tools::viewport::Subcommand),
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(cli.verbose.log_level_filter())
		.format_timestamp(None)
		.init();

	run(cli)
}

fn run(cli: Cli) -> Result<()> {
	match &cli.command {
		Commands::Normalize(arguments) => tools::normalize::run(arguments),
		Commands::Tile(arguments) => tools::tile::run(arguments),
		Commands::Viewport(arguments) => tools::viewport::run(arguments),
	}
}
