use std::path::PathBuf;

use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, LwoError>;

/// Errors produced while reading, decoding, and resolving `.lwo` data.
#[derive(Debug, Error)]
pub enum LwoError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Header magic or format tag not recognized.
	#[error("unsupported format in {}: tag={tag:?}", path.display())]
	UnsupportedFormat {
		/// Source file path.
		path: PathBuf,
		/// Offending 4-byte magic or format tag.
		tag: [u8; 4],
	},
	/// Not enough bytes remained for a requested read.
	#[error("truncated stream at offset {at}, need {need} bytes, remaining {rem}")]
	TruncatedStream {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Chunk payload would exceed remaining file data.
	#[error("chunk length {len} at offset {at} exceeds remaining {rem}")]
	ChunkLenOutOfRange {
		/// Chunk header file offset.
		at: usize,
		/// Declared payload length.
		len: u32,
		/// Remaining bytes in stream.
		rem: usize,
	},
	/// A clip path could not be resolved against the search directories.
	#[error("no image found for clip path {path:?}")]
	MissingImage {
		/// Raw path string embedded in the clip chunk.
		path: String,
	},
	/// Running polygon group offset went negative; the file is malformed.
	#[error("polygon group offset underflow: layer holds {pols} polygons, group of {group}")]
	PolygonOffsetUnderflow {
		/// Polygons accumulated in the current layer.
		pols: usize,
		/// Polygon count of the most recent group.
		group: usize,
	},
	/// Unknown sub-chunk tag encountered in strict mode.
	#[error("unrecognized {context} sub-chunk {tag:?}")]
	UnrecognizedSubchunk {
		/// Parent chunk kind being decoded.
		context: &'static str,
		/// Offending 4-byte sub-chunk tag.
		tag: [u8; 4],
	},
}
