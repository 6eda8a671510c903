use std::path::PathBuf;

/// Recognized decode and clip-resolution options.
///
/// Flags not consumed by the decoder itself (`add_subdivision_modifier`,
/// `use_existing_materials`) are carried for the scene-construction consumer.
#[derive(Debug, Clone)]
pub struct LoadOptions {
	/// Ask the consumer to add a subdivision modifier to subpatched layers.
	pub add_subdivision_modifier: bool,
	/// Decode layers whose hidden flag is set.
	pub load_hidden_layers: bool,
	/// Decode skelegon name/roll tags for armature conversion.
	pub convert_skelegons_to_armature: bool,
	/// Ask the consumer to reuse materials it already owns.
	pub use_existing_materials: bool,
	/// Extra image search directories; relative entries are resolved against
	/// the source file's directory.
	pub search_paths: Vec<PathBuf>,
	/// Recurse into subdirectories while searching for images.
	pub recursive_search: bool,
	/// Leave unresolved clips empty instead of failing resolution.
	pub cancel_search_on_missing_image: bool,
	/// Record resolved image paths as absolute paths.
	pub absolute_paths: bool,
	/// Fail fast on unrecognized sub-chunks instead of logging them.
	pub strict: bool,
}

impl Default for LoadOptions {
	fn default() -> Self {
		Self {
			add_subdivision_modifier: true,
			load_hidden_layers: false,
			convert_skelegons_to_armature: true,
			use_existing_materials: false,
			search_paths: Vec::new(),
			recursive_search: true,
			cancel_search_on_missing_image: false,
			absolute_paths: true,
			strict: false,
		}
	}
}
