#![allow(missing_docs)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "lwodoc", about = "LightWave .lwo inspection tools")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	Info {
		path: PathBuf,
	},
	Decode {
		path: PathBuf,
		#[arg(long)]
		strict: bool,
		#[arg(long = "load-hidden")]
		load_hidden: bool,
	},
	Images {
		path: PathBuf,
		#[arg(long = "search-path")]
		search_paths: Vec<PathBuf>,
		#[arg(long = "no-recursive")]
		no_recursive: bool,
		#[arg(long = "cancel-search")]
		cancel_search: bool,
		#[arg(long)]
		relative: bool,
	},
}

fn main() {
	env_logger::init();

	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> lwodoc::lwo::Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Info { path } => cmd::info::run(path),
		Commands::Decode { path, strict, load_hidden } => cmd::decode::run(path, strict, load_hidden),
		Commands::Images {
			path,
			search_paths,
			no_recursive,
			cancel_search,
			relative,
		} => cmd::images::run(path, search_paths, !no_recursive, cancel_search, !relative),
	}
}
