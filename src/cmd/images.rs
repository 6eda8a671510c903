use std::path::PathBuf;

use lwodoc::lwo::{LoadOptions, LwoFile, Result};

/// Decode, resolve clips, and report each clip's image binding.
pub fn run(
	path: PathBuf,
	search_paths: Vec<PathBuf>,
	recursive: bool,
	cancel_search: bool,
	absolute: bool,
) -> Result<()> {
	let options = LoadOptions {
		search_paths,
		recursive_search: recursive,
		cancel_search_on_missing_image: cancel_search,
		absolute_paths: absolute,
		..LoadOptions::default()
	};

	let file = LwoFile::open(&path)?;
	let mut object = file.decode(&options)?;
	object.resolve_clips(&options)?;

	println!("path: {}", path.display());
	println!("clips: {}", object.clips.len());
	for (clip_id, raw_path) in &object.clips {
		let resolved = object
			.images
			.get(clip_id)
			.cloned()
			.flatten()
			.map(|image| image.display().to_string())
			.unwrap_or_else(|| "(unresolved)".to_owned());
		println!("  {clip_id}: {raw_path} -> {resolved}");
	}

	Ok(())
}
