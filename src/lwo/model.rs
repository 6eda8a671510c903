use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::lwo::FormatKind;
use crate::lwo::chunk::Tag;

/// Axis-swapped three-component vector.
pub type Vec3 = [f32; 3];

/// Two-component UV coordinate.
pub type Uv = [f32; 2];

/// Decoded root aggregate of one `.lwo` file.
///
/// Built incrementally while chunks stream past; nothing is consistent until
/// end-of-stream. Each decode owns its aggregate exclusively; no state is
/// shared between parses.
#[derive(Debug, Clone, Serialize)]
pub struct LwoObject {
	/// Absolute path the object was decoded from.
	pub source_path: PathBuf,
	/// Format generation the file carried.
	pub format: FormatKind,
	/// Ordered tag-string table (`TAGS`/`SRFS`).
	pub tags: Vec<String>,
	/// Ordered mesh layers.
	pub layers: Vec<Layer>,
	/// Surfaces keyed by name.
	pub surfaces: BTreeMap<String, Surface>,
	/// Clip id to raw embedded image path.
	pub clips: BTreeMap<u32, String>,
	/// Clip id to resolved on-disk path; populated by clip resolution.
	pub images: BTreeMap<u32, Option<PathBuf>>,
}

impl LwoObject {
	/// Create an empty aggregate for `source_path`.
	pub fn new(source_path: PathBuf, format: FormatKind) -> Self {
		Self {
			source_path,
			format,
			tags: Vec::new(),
			layers: Vec::new(),
			surfaces: BTreeMap::new(),
			clips: BTreeMap::new(),
			images: BTreeMap::new(),
		}
	}

	/// Directory containing the source file.
	pub fn source_dir(&self) -> PathBuf {
		self.source_path.parent().map(PathBuf::from).unwrap_or_default()
	}
}

/// One mesh layer.
///
/// Append-only during decode: points and polygons only grow until the layer's
/// chunk sequence ends. Polygon point indices index this layer's points.
#[derive(Debug, Clone, Serialize)]
pub struct Layer {
	/// Layer name; synthesized as `Layer N` when the file carries none.
	pub name: String,
	/// Layer index from the `LAYR` chunk.
	pub index: u16,
	/// Parent layer index, `-1` for none.
	pub parent_index: i16,
	/// Pivot point, axis-swapped from file order.
	pub pivot: Vec3,
	/// Pivot-relative, axis-swapped point positions.
	pub points: Vec<Vec3>,
	/// Polygons as point-index lists, winding reversed from file order.
	///
	/// Two entries describe a bare edge; five or more an n-gon left for
	/// downstream triangulation.
	pub polygons: Vec<Vec<u32>>,
	/// Surface/tag index to the polygon ids it covers.
	pub surf_tags: BTreeMap<u16, Vec<u32>>,
	/// Weight maps by name.
	pub weight_maps: BTreeMap<String, Vec<(u32, f32)>>,
	/// Endomorph displacement maps by name.
	pub morph_maps: BTreeMap<String, MorphMap>,
	/// Vertex color maps by name.
	pub color_maps: BTreeMap<String, ColorMap>,
	/// UV maps by name.
	pub uv_maps: BTreeMap<String, UvMap>,
	/// Per-point vertex normals.
	pub vertex_normals: BTreeMap<u32, Vec3>,
	/// Split (per-polygon) vertex normals keyed by polygon id.
	pub split_normals: BTreeMap<u32, Vec<(u32, Vec3)>>,
	/// Catmull-Clark edge weights keyed by the directed `"next point"` edge.
	pub edge_weights: BTreeMap<String, f32>,
	/// Skelegon bone chains as ordered point-id lists.
	pub bones: Vec<Vec<u32>>,
	/// Bone names keyed by starting point id.
	pub bone_names: BTreeMap<u32, String>,
	/// Bone roll tags keyed by starting point id.
	pub bone_rolls: BTreeMap<u32, String>,
	/// Layer contains subpatch or Catmull-Clark geometry.
	pub has_subds: bool,
}

impl Layer {
	/// Create an empty layer with `index`.
	pub fn new(index: u16) -> Self {
		Self {
			name: String::new(),
			index,
			parent_index: -1,
			pivot: [0.0; 3],
			points: Vec::new(),
			polygons: Vec::new(),
			surf_tags: BTreeMap::new(),
			weight_maps: BTreeMap::new(),
			morph_maps: BTreeMap::new(),
			color_maps: BTreeMap::new(),
			uv_maps: BTreeMap::new(),
			vertex_normals: BTreeMap::new(),
			split_normals: BTreeMap::new(),
			edge_weights: BTreeMap::new(),
			bones: Vec::new(),
			bone_names: BTreeMap::new(),
			bone_rolls: BTreeMap::new(),
			has_subds: false,
		}
	}
}

/// Whether a morph map stores relative deltas or absolute positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MorphKind {
	/// `MORF`: deltas applied to the decoded base point.
	Relative,
	/// `SPOT`: absolute target positions.
	Absolute,
}

/// One endomorph displacement map.
///
/// Entries hold the final axis-swapped position per point: relative maps are
/// applied to the already-decoded base point on read.
#[derive(Debug, Clone, Serialize)]
pub struct MorphMap {
	/// Relative or absolute source chunk kind.
	pub kind: MorphKind,
	/// `(point id, position)` entries in file order.
	pub entries: Vec<(u32, Vec3)>,
}

/// A vertex color map with explicit point and face scopes.
///
/// Face entries override point entries for vertices of that polygon only.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ColorMap {
	/// Point-scoped colors (`VMAP`).
	pub point: BTreeMap<u32, Vec3>,
	/// Polygon-scoped colors (`VMAD`), keyed polygon id then point id.
	pub face: BTreeMap<u32, BTreeMap<u32, Vec3>>,
}

/// A UV map with explicit point and face scopes.
///
/// Face entries override point entries for vertices of that polygon only.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UvMap {
	/// Point-scoped coordinates (`VMAP`).
	pub point: BTreeMap<u32, Uv>,
	/// Polygon-scoped coordinates (`VMAD`), keyed polygon id then point id.
	pub face: BTreeMap<u32, BTreeMap<u32, Uv>>,
}

/// Named material descriptor.
#[derive(Debug, Clone, Serialize)]
pub struct Surface {
	/// Surface name; `Default` when the chunk carries none.
	pub name: String,
	/// Unused secondary source name carried by modern files.
	pub source_name: String,
	/// Base color.
	pub color: Vec3,
	/// Diffuse level.
	pub diffuse: f32,
	/// Luminosity level.
	pub luminosity: f32,
	/// Specular level.
	pub specular: f32,
	/// Reflectivity level.
	pub reflection: f32,
	/// Reflection blurring.
	pub reflection_blur: f32,
	/// Transparency level.
	pub transparency: f32,
	/// Refraction index.
	pub refraction_index: f32,
	/// Refraction blurring.
	pub refraction_blur: f32,
	/// Translucency level.
	pub translucency: f32,
	/// Glossiness; legacy files store the raw 16-bit value.
	pub glossiness: f32,
	/// Diffuse sharpness.
	pub sharpness: f32,
	/// Bump strength.
	pub bump: f32,
	/// Smoothing enabled (derived from a positive smoothing angle).
	pub smooth: bool,
	/// Texture layers keyed by channel code (`COLR`, `SPEC`, ...).
	pub textures: BTreeMap<String, Vec<Texture>>,
	/// Flat legacy (`LWOB`) image references.
	pub legacy_textures: Vec<LegacyTexture>,
}

impl Default for Surface {
	fn default() -> Self {
		Self {
			name: "Default".to_owned(),
			source_name: String::new(),
			color: [1.0, 1.0, 1.0],
			diffuse: 1.0,
			luminosity: 0.0,
			specular: 0.0,
			reflection: 0.0,
			reflection_blur: 0.0,
			transparency: 0.0,
			refraction_index: 1.0,
			refraction_blur: 0.0,
			translucency: 0.0,
			glossiness: 0.4,
			sharpness: 0.0,
			bump: 1.0,
			smooth: false,
			textures: BTreeMap::new(),
			legacy_textures: Vec::new(),
		}
	}
}

/// Texture block kind carried by a `BLOK` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlockType {
	/// `IMAP` image map.
	ImageMap,
	/// `PROC` procedural.
	Procedural,
	/// `GRAD` gradient.
	Gradient,
	/// `SHDR` shader plugin.
	Shader,
}

impl BlockType {
	/// Classify a raw block-type tag.
	pub fn from_tag(tag: Tag) -> Option<Self> {
		match &tag {
			b"IMAP" => Some(Self::ImageMap),
			b"PROC" => Some(Self::Procedural),
			b"GRAD" => Some(Self::Gradient),
			b"SHDR" => Some(Self::Shader),
			_ => None,
		}
	}

	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::ImageMap => "image_map",
			Self::Procedural => "procedural",
			Self::Gradient => "gradient",
			Self::Shader => "shader",
		}
	}
}

/// Texture projection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Projection {
	/// Planar projection.
	Planar,
	/// Cylindrical projection.
	Cylindrical,
	/// Spherical projection.
	Spherical,
	/// Cubic projection.
	Cubic,
	/// Front projection.
	Front,
	/// UV projection through a named UV map.
	Uv,
	/// Unrecognized mode, value preserved.
	Other(u16),
}

impl Projection {
	/// Classify the raw `PROJ` value.
	pub fn from_raw(raw: u16) -> Self {
		match raw {
			0 => Self::Planar,
			1 => Self::Cylindrical,
			2 => Self::Spherical,
			3 => Self::Cubic,
			4 => Self::Front,
			5 => Self::Uv,
			other => Self::Other(other),
		}
	}
}

/// Positional transform of an image-map texture (`TMAP`).
#[derive(Debug, Clone, Serialize)]
pub struct TexturePosition {
	/// Transform center.
	pub center: Vec3,
	/// Transform size.
	pub size: Vec3,
	/// Transform rotation.
	pub rotation: Vec3,
	/// Falloff type code.
	pub falloff_kind: i16,
	/// Falloff vector.
	pub falloff: Vec3,
	/// Reference object name.
	pub reference_object: String,
	/// Coordinate system code (object or world).
	pub coord_system: i16,
}

impl Default for TexturePosition {
	fn default() -> Self {
		Self {
			center: [0.0; 3],
			size: [0.0; 3],
			rotation: [0.0; 3],
			falloff_kind: 0,
			falloff: [0.0; 3],
			reference_object: String::new(),
			coord_system: 0,
		}
	}
}

/// One texture layer of a modern surface channel.
#[derive(Debug, Clone, Serialize)]
pub struct Texture {
	/// Target channel code (`COLR`, `SPEC`, ...).
	pub channel: String,
	/// Block kind the layer was decoded from.
	pub kind: BlockType,
	/// Referenced clip id.
	pub clip_id: u32,
	/// Projection mode; UV projection reads `uv_name`.
	pub projection: Projection,
	/// Projection axis.
	pub axis: u16,
	/// Layer opacity.
	pub opacity: f32,
	/// Opacity blend-mode code.
	pub opacity_type: u16,
	/// Layer enabled flag.
	pub enabled: bool,
	/// Invert-output flag (`NEGA`).
	pub negative: bool,
	/// UV map name used by UV projection.
	pub uv_name: String,
	/// Procedural function name (`FUNC`).
	pub function: Option<String>,
	/// Positional transform.
	pub position: TexturePosition,
	/// Resolved image path; `None` until clip resolution, or when the clip
	/// stayed unresolved.
	pub image: Option<PathBuf>,
}

impl Default for Texture {
	fn default() -> Self {
		Self {
			channel: "COLR".to_owned(),
			kind: BlockType::ImageMap,
			clip_id: 1,
			projection: Projection::Uv,
			axis: 0,
			opacity: 1.0,
			opacity_type: 0,
			enabled: true,
			negative: false,
			uv_name: "UVMap".to_owned(),
			function: None,
			position: TexturePosition::default(),
			image: None,
		}
	}
}

/// Flat legacy (`LWOB`) image reference.
#[derive(Debug, Clone, Serialize)]
pub struct LegacyTexture {
	/// Synthetic clip id allocated during decode.
	pub clip_id: u32,
	/// Originating map-type code (`CTEX`, `DTEX`, ...).
	pub map_type: String,
	/// Projection along X.
	pub x: bool,
	/// Projection along Y.
	pub y: bool,
	/// Projection along Z.
	pub z: bool,
	/// Resolved image path; `None` until clip resolution.
	pub image: Option<PathBuf>,
}

impl LegacyTexture {
	/// Create a reference for `clip_id` originating from `map_type`.
	pub fn new(clip_id: u32, map_type: String) -> Self {
		Self {
			clip_id,
			map_type,
			x: false,
			y: false,
			z: false,
			image: None,
		}
	}
}
