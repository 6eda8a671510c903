mod bytes;
mod chunk;
mod error;
mod file;
mod header;
mod lwo1;
mod lwo2;
mod model;
mod options;
mod resolve;
mod surface;

/// Bounded big-endian byte cursor.
pub use bytes::Cursor;
/// Chunk container and iterator types.
pub use chunk::{Chunk, ChunkIter, ChunkTag, SubChunk, SubChunkIter, Tag, tag_label};
/// Error and result aliases.
pub use error::{LwoError, Result};
/// File abstraction and chunk statistics.
pub use file::{ChunkStats, LwoFile};
/// File header representation and format selection.
pub use header::{FORM_MAGIC, FormatKind, LwoHeader};
/// Decoded object model.
pub use model::{
	BlockType, ColorMap, Layer, LegacyTexture, LwoObject, MorphKind, MorphMap, Projection, Surface,
	Texture, TexturePosition, Uv, UvMap, Vec3,
};
/// Decode and clip-resolution options.
pub use options::LoadOptions;
