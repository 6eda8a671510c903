use log::{debug, warn};

use crate::lwo::bytes::Cursor;
use crate::lwo::chunk::{Chunk, ChunkIter, ChunkTag, SubChunkIter, Tag, tag_label};
use crate::lwo::model::{Layer, LegacyTexture, LwoObject, Surface};
use crate::lwo::options::LoadOptions;
use crate::lwo::{LwoError, Result};

/// Legacy surface sub-chunks the decoder knows about but does not materialize.
const SURF_UNIMPLEMENTED: &[Tag] = &[
	*b"FLAG", *b"VLUM", *b"VDIF", *b"VSPC", *b"VRFL", *b"VTRN", *b"RFLT", *b"ALPH", *b"TOPC",
	*b"TWRP", *b"TSIZ", *b"TCTR", *b"TAAS", *b"TVAL", *b"TFP0", *b"TFP1", *b"TFP2", *b"TFP3",
	*b"TAMP", *b"RIMG", *b"TCLR", *b"TFAL", *b"TVEL", *b"TREF", *b"TALP", *b"EDGE", *b"GLOW",
	*b"TIP0", *b"SPBF", *b"SHDR", *b"SDAT", *b"IMSQ",
];

/// Streaming decoder for legacy `LWOB`/`LWLO` files.
///
/// Legacy files carry surface ids inline with each polygon, no vertex maps,
/// and image references as flat per-map-type paths instead of clip chunks;
/// clip ids are synthesized during decode.
pub(crate) struct Lwo1Decoder<'a> {
	object: &'a mut LwoObject,
	options: &'a LoadOptions,
	last_pols_count: usize,
	next_clip_id: u32,
}

impl<'a> Lwo1Decoder<'a> {
	pub fn new(object: &'a mut LwoObject, options: &'a LoadOptions) -> Self {
		Self {
			object,
			options,
			last_pols_count: 0,
			next_clip_id: 1,
		}
	}

	/// Drive the dispatch loop over every root chunk.
	pub fn run(&mut self, chunks: ChunkIter<'_>) -> Result<()> {
		for chunk in chunks {
			self.handle_chunk(chunk?)?;
		}
		Ok(())
	}

	fn handle_chunk(&mut self, chunk: Chunk<'_>) -> Result<()> {
		match ChunkTag::from_tag(chunk.tag) {
			ChunkTag::Srfs => self.read_tags(chunk.payload),
			ChunkTag::Layr => self.read_layr(chunk.payload),
			ChunkTag::Pnts => self.read_pnts(chunk.payload),
			ChunkTag::Pols => self.read_pols(chunk.payload, false),
			ChunkTag::Pchs => self.read_pols(chunk.payload, true),
			ChunkTag::Ptag => self.read_ptag(chunk.payload),
			ChunkTag::Surf => self.read_surf(chunk.payload),
			ChunkTag::Ignored(tag) => {
				debug!("skipping chunk {}", tag_label(tag));
				Ok(())
			}
			_ => {
				warn!("skipping chunk {}", tag_label(chunk.tag));
				Ok(())
			}
		}
	}

	fn read_tags(&mut self, payload: &[u8]) -> Result<()> {
		let mut cur = Cursor::new(payload);
		while !cur.is_empty() {
			let tag = cur.read_lwo_string();
			self.object.tags.push(tag);
		}
		Ok(())
	}

	fn read_layr(&mut self, payload: &[u8]) -> Result<()> {
		let mut cur = Cursor::new(payload);
		let index = cur.read_u16()?;
		let _flags = cur.read_u16()?;

		let mut layer = Layer::new(index);
		let name = cur.read_lwo_string();
		layer.name = if name.is_empty() || name == "noname" {
			format!("Layer {index}")
		} else {
			name
		};

		self.object.layers.push(layer);
		Ok(())
	}

	fn read_pnts(&mut self, payload: &[u8]) -> Result<()> {
		if self.object.layers.is_empty() {
			// LWOB files carry no LAYR chunk to set this up.
			let mut layer = Layer::new(0);
			layer.name = "Layer 1".to_owned();
			self.object.layers.push(layer);
		}
		let Some(layer) = self.object.layers.last_mut() else {
			return Ok(());
		};

		let mut cur = Cursor::new(payload);
		while !cur.is_empty() {
			let raw = cur.read_vec3()?;
			// File order is (x, z, y); legacy pivots stay at the origin.
			layer.points.push([
				raw[0] - layer.pivot[0],
				raw[2] - layer.pivot[1],
				raw[1] - layer.pivot[2],
			]);
		}
		Ok(())
	}

	/// Read polygons with their inline surface ids.
	fn read_pols(&mut self, payload: &[u8], subpatch: bool) -> Result<()> {
		let Some(layer) = self.object.layers.last_mut() else {
			warn!("POLS chunk before any layer; skipping");
			return Ok(());
		};

		let old_count = layer.polygons.len();
		let mut cur = Cursor::new(payload);
		while !cur.is_empty() {
			let count = cur.read_u16()?;
			let mut points = Vec::with_capacity(usize::from(count));
			for _ in 0..count {
				points.push(u32::from(cur.read_u16()?));
			}
			// File winding is opposite the outward-normal convention.
			points.reverse();

			let poly_id = layer.polygons.len() as u32;
			layer.polygons.push(points);

			// Negative ids mark detail polygons; 1-based either way.
			let sid = i32::from(cur.read_i16()?).abs() - 1;
			if sid < 0 {
				debug!("polygon {poly_id}: surface id 0; skipping assignment");
				continue;
			}
			layer.surf_tags.entry(sid as u16).or_default().push(poly_id);
		}

		self.last_pols_count = layer.polygons.len() - old_count;
		if subpatch {
			layer.has_subds = true;
		}
		Ok(())
	}

	fn read_ptag(&mut self, payload: &[u8]) -> Result<()> {
		let mut cur = Cursor::new(payload);
		let sub = cur.read_code4()?;

		match &sub {
			b"SURF" => self.read_surf_tags(&mut cur),
			tag => {
				debug!("skipping PTAG subtype {}", tag_label(*tag));
				Ok(())
			}
		}
	}

	fn read_surf_tags(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
		let group = self.last_pols_count;
		let Some(layer) = self.object.layers.last_mut() else {
			warn!("PTAG chunk before any layer; skipping");
			return Ok(());
		};
		if layer.polygons.is_empty() {
			return Ok(());
		}

		let pols = layer.polygons.len();
		if group > pols {
			return Err(LwoError::PolygonOffsetUnderflow { pols, group });
		}
		let offset = (pols - group) as u32;

		while !cur.is_empty() {
			let pid = cur.read_vx()?;
			let sid = cur.read_u16()?;
			layer.surf_tags.entry(sid).or_default().push(pid + offset);
		}
		Ok(())
	}

	fn read_surf(&mut self, payload: &[u8]) -> Result<()> {
		let strict = self.options.strict;
		let mut cur = Cursor::new(payload);
		let mut surf = Surface::default();

		let name = cur.read_lwo_string();
		if !name.is_empty() {
			surf.name = name;
		}

		// Map-type sub-chunk awaiting its TIMG path.
		let mut pending_map: Option<Tag> = None;

		for sub in SubChunkIter::new(&payload[cur.pos()..]) {
			let sub = sub?;
			let mut c = Cursor::new(sub.payload);
			match &sub.tag {
				b"COLR" => {
					let raw = c.read_exact(4)?;
					surf.color = [
						f32::from(raw[0]) / 255.0,
						f32::from(raw[1]) / 255.0,
						f32::from(raw[2]) / 255.0,
					];
				}
				// Fixed-point percentages scale by 256, not 255.
				b"DIFF" => surf.diffuse = f32::from(c.read_i16()?) / 256.0,
				b"LUMI" => surf.luminosity = f32::from(c.read_i16()?) / 256.0,
				b"SPEC" => surf.specular = f32::from(c.read_i16()?) / 256.0,
				b"REFL" => surf.reflection = f32::from(c.read_i16()?) / 256.0,
				b"TRAN" => surf.transparency = f32::from(c.read_i16()?) / 256.0,
				b"RIND" => surf.refraction_index = c.read_f32()?,
				b"GLOS" => surf.glossiness = f32::from(c.read_i16()?),
				b"SMAN" => {
					if c.read_f32()? > 0.0 {
						surf.smooth = true;
					}
				}
				b"CTEX" | b"DTEX" | b"STEX" | b"RTEX" | b"TTEX" | b"BTEX" | b"LTEX" => {
					pending_map = Some(sub.tag);
				}
				b"TIMG" => {
					let path = c.read_lwo_string();
					if path == "(none)" {
						pending_map = None;
						continue;
					}
					let map_type = pending_map.take().map(tag_label).unwrap_or_default();
					let clip_id = self.next_clip_id;
					self.next_clip_id += 1;
					self.object.clips.insert(clip_id, path);
					surf.legacy_textures.push(LegacyTexture::new(clip_id, map_type));
				}
				b"TFLG" => {
					if let Some(texture) = surf.legacy_textures.last_mut() {
						let mapping = c.read_i16()?;
						if mapping & 1 != 0 {
							texture.x = true;
						} else if mapping & 2 != 0 {
							texture.y = true;
						} else if mapping & 4 != 0 {
							texture.z = true;
						}
					}
				}
				tag if SURF_UNIMPLEMENTED.contains(tag) => {
					debug!("surface {}: unimplemented sub-chunk {}", surf.name, tag_label(*tag));
				}
				tag => {
					if strict {
						return Err(LwoError::UnrecognizedSubchunk {
							context: "SURF",
							tag: *tag,
						});
					}
					warn!("surface {}: unrecognized sub-chunk {}", surf.name, tag_label(*tag));
				}
			}
		}

		self.object.surfaces.insert(surf.name.clone(), surf);
		Ok(())
	}
}
