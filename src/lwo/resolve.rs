use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::lwo::model::LwoObject;
use crate::lwo::{LoadOptions, LwoError, Result};

impl LwoObject {
	/// Resolve every clip's raw path against the configured search
	/// directories and bind the results to the textures referencing them.
	///
	/// Runs strictly after decode as its own pass. Resolution is idempotent:
	/// re-running only fills clips that stayed unresolved, so a caller may
	/// add search directories and retry after a [`LwoError::MissingImage`].
	pub fn resolve_clips(&mut self, options: &LoadOptions) -> Result<()> {
		let files = enumerate_files(&self.search_roots(options), options.recursive_search);

		for (clip_id, raw_path) in &self.clips {
			if matches!(self.images.get(clip_id), Some(Some(_))) {
				continue;
			}

			// Embedded paths come from Windows tooling; normalize the
			// separators before taking the basename.
			let normalized = raw_path.replace('\\', "/");
			let basename = normalized.rsplit('/').next().unwrap_or_default();

			let found = if basename.is_empty() {
				None
			} else {
				files
					.iter()
					.find(|file| {
						file.file_name()
							.map(|name| name.to_string_lossy().eq_ignore_ascii_case(basename))
							.unwrap_or(false)
					})
					.map(|file| record_path(file, options.absolute_paths))
			};

			if found.is_none() {
				debug!("clip {clip_id}: no match for {raw_path:?}");
			}
			self.images.insert(*clip_id, found);
		}

		self.bind_textures();

		if !options.cancel_search_on_missing_image {
			for (clip_id, image) in &self.images {
				if image.is_none()
					&& let Some(raw_path) = self.clips.get(clip_id)
				{
					return Err(LwoError::MissingImage {
						path: raw_path.clone(),
					});
				}
			}
		}

		Ok(())
	}

	/// Search roots: the source directory first, then configured paths with
	/// relative entries resolved against it.
	fn search_roots(&self, options: &LoadOptions) -> Vec<PathBuf> {
		let source_dir = self.source_dir();
		let mut roots = vec![source_dir.clone()];
		for path in &options.search_paths {
			if path.is_relative() {
				roots.push(source_dir.join(path));
			} else {
				roots.push(path.clone());
			}
		}
		roots
	}

	/// Copy each clip's resolution onto the textures referencing it.
	fn bind_textures(&mut self) {
		let images = &mut self.images;
		for surf in self.surfaces.values_mut() {
			for textures in surf.textures.values_mut() {
				for texture in textures {
					texture.image = match images.get(&texture.clip_id) {
						Some(image) => image.clone(),
						None => {
							warn!("surface {}: clip {} not in the clip table", surf.name, texture.clip_id);
							images.insert(texture.clip_id, None);
							None
						}
					};
				}
			}
			for texture in &mut surf.legacy_textures {
				texture.image = images.get(&texture.clip_id).cloned().flatten();
			}
		}
	}
}

/// Collect every file under `roots`, recursing when asked.
///
/// Unreadable directories are skipped; resolution tolerates stale search
/// paths.
fn enumerate_files(roots: &[PathBuf], recursive: bool) -> Vec<PathBuf> {
	let mut files = Vec::new();
	for root in roots {
		collect_files(root, recursive, &mut files);
	}
	files
}

fn collect_files(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) {
	let Ok(entries) = fs::read_dir(dir) else {
		debug!("search path {} not readable; skipping", dir.display());
		return;
	};

	for entry in entries.flatten() {
		let path = entry.path();
		if path.is_dir() {
			if recursive {
				collect_files(&path, recursive, files);
			}
		} else {
			files.push(path);
		}
	}
}

fn record_path(path: &Path, absolute: bool) -> PathBuf {
	if absolute {
		fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
	} else {
		path.to_path_buf()
	}
}

#[cfg(test)]
mod tests {
	use std::fs;

	use crate::lwo::model::{LwoObject, Texture};
	use crate::lwo::{FormatKind, LoadOptions, LwoError};

	fn object_with_clip(dir: &std::path::Path, raw_path: &str) -> LwoObject {
		let mut object = LwoObject::new(dir.join("scene.lwo"), FormatKind::Lwo2);
		object.clips.insert(1, raw_path.to_owned());
		object
	}

	#[test]
	fn finds_image_in_nested_search_directory() {
		let dir = tempfile::tempdir().expect("tempdir creates");
		let textures = dir.path().join("textures");
		fs::create_dir(&textures).expect("dir creates");
		fs::write(textures.join("wall.png"), b"png").expect("file writes");

		let mut object = object_with_clip(dir.path(), "D:\\Images\\WALL.PNG");
		object.resolve_clips(&LoadOptions::default()).expect("resolution succeeds");

		let image = object.images.get(&1).cloned().flatten().expect("clip resolved");
		assert!(image.ends_with("textures/wall.png"));
	}

	#[test]
	fn missing_image_fails_unless_search_is_cancelled() {
		let dir = tempfile::tempdir().expect("tempdir creates");
		let mut object = object_with_clip(dir.path(), "gone.png");

		let err = object.resolve_clips(&LoadOptions::default()).expect_err("missing image should fail");
		assert!(matches!(err, LwoError::MissingImage { path } if path == "gone.png"));

		let options = LoadOptions {
			cancel_search_on_missing_image: true,
			..LoadOptions::default()
		};
		let mut object = object_with_clip(dir.path(), "gone.png");
		object.resolve_clips(&options).expect("cancelled search succeeds");
		assert_eq!(object.images.get(&1), Some(&None));
	}

	#[test]
	fn retry_fills_previously_unresolved_clips() {
		let dir = tempfile::tempdir().expect("tempdir creates");
		let options = LoadOptions {
			cancel_search_on_missing_image: true,
			..LoadOptions::default()
		};

		let mut object = object_with_clip(dir.path(), "late.png");
		object.resolve_clips(&options).expect("first pass succeeds");
		assert_eq!(object.images.get(&1), Some(&None));

		fs::write(dir.path().join("late.png"), b"png").expect("file writes");
		object.resolve_clips(&options).expect("second pass succeeds");
		assert!(object.images.get(&1).cloned().flatten().is_some());
	}

	#[test]
	fn resolution_binds_texture_images() {
		let dir = tempfile::tempdir().expect("tempdir creates");
		fs::write(dir.path().join("grain.png"), b"png").expect("file writes");

		let mut object = object_with_clip(dir.path(), "grain.png");
		let surf = crate::lwo::model::Surface::default();
		object.surfaces.insert(surf.name.clone(), surf);
		let texture = Texture {
			clip_id: 1,
			..Texture::default()
		};
		object
			.surfaces
			.get_mut("Default")
			.expect("surface stored")
			.textures
			.entry("COLR".to_owned())
			.or_default()
			.push(texture);

		object.resolve_clips(&LoadOptions::default()).expect("resolution succeeds");

		let surf = object.surfaces.get("Default").expect("surface stored");
		let texture = &surf.textures.get("COLR").expect("channel present")[0];
		assert!(texture.image.as_ref().expect("image bound").ends_with("grain.png"));
	}
}
