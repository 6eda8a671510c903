use crate::lwo::bytes::Cursor;
use crate::lwo::{LwoError, Result};

/// Four-byte chunk and sub-chunk identifier.
pub type Tag = [u8; 4];

/// Root chunk kinds the decoders understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkTag {
	/// `TAGS` tag-string table (modern).
	Tags,
	/// `SRFS` surface-name table (legacy).
	Srfs,
	/// `LAYR` layer start.
	Layr,
	/// `PNTS` point list.
	Pnts,
	/// `VMAP` point-scoped vertex map.
	Vmap,
	/// `VMAD` polygon-scoped (discontinuous) vertex map.
	Vmad,
	/// `POLS` polygon list.
	Pols,
	/// `PCHS` legacy patch list.
	Pchs,
	/// `PTAG` polygon tag association.
	Ptag,
	/// `SURF` surface descriptor.
	Surf,
	/// `CLIP` image clip reference.
	Clip,
	/// Recognized chunk kind with no decoded counterpart.
	Ignored(Tag),
	/// Unknown chunk kind, skipped with its declared length.
	Unknown(Tag),
}

impl ChunkTag {
	/// Classify a raw 4-byte chunk code.
	pub fn from_tag(tag: Tag) -> Self {
		match &tag {
			b"TAGS" => Self::Tags,
			b"SRFS" => Self::Srfs,
			b"LAYR" => Self::Layr,
			b"PNTS" => Self::Pnts,
			b"VMAP" => Self::Vmap,
			b"VMAD" => Self::Vmad,
			b"POLS" => Self::Pols,
			b"PCHS" => Self::Pchs,
			b"PTAG" => Self::Ptag,
			b"SURF" => Self::Surf,
			b"CLIP" => Self::Clip,
			b"BBOX" | b"VMPA" | b"ENVL" => Self::Ignored(tag),
			_ => Self::Unknown(tag),
		}
	}
}

/// Render a chunk tag for logs and reports.
///
/// Non-printable bytes become dots; trailing spaces are kept (`RGB `).
pub fn tag_label(tag: Tag) -> String {
	tag.iter()
		.map(|byte| {
			if byte.is_ascii_graphic() || *byte == b' ' {
				char::from(*byte)
			} else {
				'.'
			}
		})
		.collect()
}

/// One root chunk: tag, payload, and header file offset.
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
	/// Four-byte chunk code.
	pub tag: Tag,
	/// Payload bytes, excluding the pad byte of odd-length chunks.
	pub payload: &'a [u8],
	/// File offset of the chunk header.
	pub file_offset: usize,
}

/// Sequential iterator over the root tagged-length-value stream.
///
/// Root chunks carry a big-endian `u32` length; payloads are padded to an
/// even boundary. Exhaustion is clean iterator termination, not an error.
pub struct ChunkIter<'a> {
	cursor: Cursor<'a>,
	offset_base: usize,
	done: bool,
}

impl<'a> ChunkIter<'a> {
	/// Iterate chunks starting at `offset` within `bytes`.
	pub fn new(bytes: &'a [u8], offset: usize) -> Self {
		let slice = bytes.get(offset..).unwrap_or(&[]);
		Self {
			cursor: Cursor::new(slice),
			offset_base: offset,
			done: false,
		}
	}
}

impl<'a> Iterator for ChunkIter<'a> {
	type Item = Result<Chunk<'a>>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done {
			return None;
		}

		if self.cursor.is_empty() {
			self.done = true;
			return None;
		}

		let file_offset = self.offset_base + self.cursor.pos();
		let tag = match self.cursor.read_code4() {
			Ok(value) => value,
			Err(err) => {
				self.done = true;
				return Some(Err(err));
			}
		};

		let len = match self.cursor.read_u32() {
			Ok(value) => value,
			Err(err) => {
				self.done = true;
				return Some(Err(err));
			}
		};

		let payload_len = len as usize;
		let rem = self.cursor.remaining();
		if payload_len > rem {
			self.done = true;
			return Some(Err(LwoError::ChunkLenOutOfRange {
				at: file_offset,
				len,
				rem,
			}));
		}

		let payload = match self.cursor.read_exact(payload_len) {
			Ok(value) => value,
			Err(err) => {
				self.done = true;
				return Some(Err(err));
			}
		};

		// Chunks are 2-byte aligned; a trailing pad byte follows odd payloads.
		if payload_len % 2 == 1 && !self.cursor.is_empty() {
			let _ = self.cursor.skip(1);
		}

		Some(Ok(Chunk { tag, payload, file_offset }))
	}
}

/// One sub-chunk: tag and payload.
#[derive(Debug, Clone, Copy)]
pub struct SubChunk<'a> {
	/// Four-byte sub-chunk code.
	pub tag: Tag,
	/// Payload bytes of declared length.
	pub payload: &'a [u8],
}

/// Iterator over `u16`-length sub-chunks inside `SURF`/`BLOK`/`TMAP` payloads.
///
/// The declared length always advances the stream, even for unrecognized
/// tags, so a reader never desynchronizes on unknown sub-chunks.
pub struct SubChunkIter<'a> {
	cursor: Cursor<'a>,
	done: bool,
}

impl<'a> SubChunkIter<'a> {
	/// Iterate sub-chunks over the whole of `bytes`.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self {
			cursor: Cursor::new(bytes),
			done: false,
		}
	}
}

impl<'a> Iterator for SubChunkIter<'a> {
	type Item = Result<SubChunk<'a>>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done {
			return None;
		}

		if self.cursor.is_empty() {
			self.done = true;
			return None;
		}

		let tag = match self.cursor.read_code4() {
			Ok(value) => value,
			Err(err) => {
				self.done = true;
				return Some(Err(err));
			}
		};

		let len = match self.cursor.read_u16() {
			Ok(value) => value,
			Err(err) => {
				self.done = true;
				return Some(Err(err));
			}
		};

		let payload = match self.cursor.read_exact(usize::from(len)) {
			Ok(value) => value,
			Err(err) => {
				self.done = true;
				return Some(Err(err));
			}
		};

		Some(Ok(SubChunk { tag, payload }))
	}
}

#[cfg(test)]
mod tests {
	use crate::lwo::LwoError;

	use super::{Chunk, ChunkIter, ChunkTag, SubChunkIter};

	fn collect(bytes: &[u8]) -> Vec<Chunk<'_>> {
		ChunkIter::new(bytes, 0).map(|chunk| chunk.expect("chunk parses")).collect()
	}

	#[test]
	fn iterates_chunks_and_skips_odd_padding() {
		let mut bytes = Vec::new();
		bytes.extend_from_slice(b"AAAA");
		bytes.extend_from_slice(&3_u32.to_be_bytes());
		bytes.extend_from_slice(&[1, 2, 3, 0]); // odd payload plus pad
		bytes.extend_from_slice(b"BBBB");
		bytes.extend_from_slice(&2_u32.to_be_bytes());
		bytes.extend_from_slice(&[4, 5]);

		let chunks = collect(&bytes);
		assert_eq!(chunks.len(), 2);
		assert_eq!(&chunks[0].tag, b"AAAA");
		assert_eq!(chunks[0].payload, &[1, 2, 3]);
		assert_eq!(&chunks[1].tag, b"BBBB");
		assert_eq!(chunks[1].payload, &[4, 5]);
		assert_eq!(chunks[1].file_offset, 12);
	}

	#[test]
	fn exhaustion_is_clean_termination() {
		let mut iter = ChunkIter::new(&[], 0);
		assert!(iter.next().is_none());
	}

	#[test]
	fn oversized_length_is_an_error() {
		let mut bytes = Vec::new();
		bytes.extend_from_slice(b"AAAA");
		bytes.extend_from_slice(&64_u32.to_be_bytes());
		bytes.extend_from_slice(&[0; 4]);

		let err = ChunkIter::new(&bytes, 0)
			.next()
			.expect("one item")
			.expect_err("length exceeds stream");
		assert!(matches!(err, LwoError::ChunkLenOutOfRange { len: 64, .. }));
	}

	#[test]
	fn sub_chunks_use_short_lengths() {
		let mut bytes = Vec::new();
		bytes.extend_from_slice(b"DIFF");
		bytes.extend_from_slice(&4_u16.to_be_bytes());
		bytes.extend_from_slice(&1.0_f32.to_be_bytes());

		let subs: Vec<_> = SubChunkIter::new(&bytes).map(|sub| sub.expect("sub-chunk parses")).collect();
		assert_eq!(subs.len(), 1);
		assert_eq!(&subs[0].tag, b"DIFF");
		assert_eq!(subs[0].payload.len(), 4);
	}

	#[test]
	fn classifies_known_and_unknown_tags() {
		assert_eq!(ChunkTag::from_tag(*b"PNTS"), ChunkTag::Pnts);
		assert_eq!(ChunkTag::from_tag(*b"BBOX"), ChunkTag::Ignored(*b"BBOX"));
		assert_eq!(ChunkTag::from_tag(*b"ZZZZ"), ChunkTag::Unknown(*b"ZZZZ"));
	}
}
