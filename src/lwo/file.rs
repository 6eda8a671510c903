use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::lwo::chunk::{ChunkIter, Tag};
use crate::lwo::lwo1::Lwo1Decoder;
use crate::lwo::lwo2::Lwo2Decoder;
use crate::lwo::model::LwoObject;
use crate::lwo::{FormatKind, LoadOptions, LwoHeader, Result};

/// One opened `.lwo` file: header plus the fully materialized byte stream.
#[derive(Debug)]
pub struct LwoFile {
	/// Parsed 12-byte header.
	pub header: LwoHeader,
	/// Path the file was read from.
	pub path: PathBuf,
	bytes: Vec<u8>,
}

impl LwoFile {
	/// Read `path` and validate its header.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let bytes = fs::read(path)?;
		let header = LwoHeader::parse(&bytes, path)?;

		Ok(Self {
			header,
			path: path.to_path_buf(),
			bytes,
		})
	}

	/// Raw file bytes.
	pub fn bytes(&self) -> &[u8] {
		&self.bytes
	}

	/// Iterate the root chunks following the header.
	pub fn chunks(&self) -> ChunkIter<'_> {
		ChunkIter::new(&self.bytes, LwoHeader::SIZE)
	}

	/// Count chunks per tag for inspection output.
	pub fn scan_chunk_stats(&self) -> Result<ChunkStats> {
		let mut stats = ChunkStats {
			chunk_count: 0,
			last_tag: [0_u8; 4],
			tags: BTreeMap::new(),
		};

		for chunk in self.chunks() {
			let chunk = chunk?;
			stats.chunk_count += 1;
			stats.last_tag = chunk.tag;
			*stats.tags.entry(chunk.tag).or_insert(0) += 1;
		}

		Ok(stats)
	}

	/// Decode the whole stream into an [`LwoObject`].
	pub fn decode(&self, options: &LoadOptions) -> Result<LwoObject> {
		let mut object = LwoObject::new(self.path.clone(), self.header.kind);

		match self.header.kind {
			FormatKind::Lwo2 => Lwo2Decoder::new(&mut object, options).run(self.chunks())?,
			FormatKind::Lwob | FormatKind::Lwlo => Lwo1Decoder::new(&mut object, options).run(self.chunks())?,
		}

		Ok(object)
	}
}

/// Chunk statistics for one file.
pub struct ChunkStats {
	/// Total root chunks.
	pub chunk_count: u32,
	/// Tag of the last chunk in the stream.
	pub last_tag: Tag,
	/// Chunk count per tag.
	pub tags: BTreeMap<Tag, u32>,
}
