use std::path::PathBuf;

use lwodoc::lwo::{LoadOptions, LwoFile, Result};

/// Decode the whole object and print it as pretty JSON.
pub fn run(path: PathBuf, strict: bool, load_hidden: bool) -> Result<()> {
	let options = LoadOptions {
		strict,
		load_hidden_layers: load_hidden,
		..LoadOptions::default()
	};

	let file = LwoFile::open(&path)?;
	let object = file.decode(&options)?;

	match serde_json::to_string_pretty(&object) {
		Ok(json) => println!("{json}"),
		Err(err) => eprintln!("error: serializing decoded object: {err}"),
	}

	Ok(())
}
