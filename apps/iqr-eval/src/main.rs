// crates.io
use clap::Parser;
// self
use iqr_eval::Args;

fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = Args::parse();
	iqr_eval::run(args)
}
