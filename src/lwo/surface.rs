use log::{debug, warn};

use crate::lwo::bytes::Cursor;
use crate::lwo::chunk::{SubChunkIter, Tag, tag_label};
use crate::lwo::model::{BlockType, Projection, Surface, Texture, TexturePosition};
use crate::lwo::{LwoError, Result};

/// Surface sub-chunks the decoder knows about but does not materialize.
const SURF_UNIMPLEMENTED: &[Tag] = &[
	*b"VERS", *b"NODS", *b"GVAL", *b"NVSK", *b"CLRF", *b"CLRH", *b"ADTR", *b"SIDE", *b"RFOP",
	*b"RIMG", *b"TIMG", *b"TROP", *b"ALPH", *b"BUF1", *b"BUF2", *b"BUF3", *b"BUF4", *b"LINE",
	*b"NORM", *b"RFRS", *b"VCOL", *b"RFLS", *b"CMNT", *b"FLAG", *b"RSAN", *b"LCOL", *b"LSIZ",
	*b"TSAN",
];

/// Texture-block sub-chunks the decoder knows about but does not materialize.
const BLOCK_UNIMPLEMENTED: &[Tag] = &[
	*b"WRAP", *b"WRPW", *b"WRPH", *b"AAST", *b"PIXB", *b"VALU", *b"TAMP", *b"STCK", *b"PNAM",
	*b"INAM", *b"GRST", *b"GREN", *b"GRPT", *b"IKEY", *b"FKEY", *b"GVER",
];

/// Decode a modern `SURF` chunk payload.
pub(crate) fn read_surf(payload: &[u8], strict: bool) -> Result<Surface> {
	let mut cursor = Cursor::new(payload);
	let mut surf = Surface::default();

	let name = cursor.read_lwo_string();
	if !name.is_empty() {
		surf.name = name;
	}
	surf.source_name = cursor.read_lwo_string();

	for sub in SubChunkIter::new(&payload[cursor.pos()..]) {
		let sub = sub?;
		let mut cur = Cursor::new(sub.payload);
		// Scalar payloads may carry a trailing envelope index; the declared
		// sub-chunk length advances past it.
		match &sub.tag {
			b"COLR" => surf.color = cur.read_vec3()?,
			b"DIFF" => surf.diffuse = cur.read_f32()?,
			b"LUMI" => surf.luminosity = cur.read_f32()?,
			b"SPEC" => surf.specular = cur.read_f32()?,
			b"REFL" => surf.reflection = cur.read_f32()?,
			b"RBLR" => surf.reflection_blur = cur.read_f32()?,
			b"TRAN" => surf.transparency = cur.read_f32()?,
			b"RIND" => surf.refraction_index = cur.read_f32()?,
			b"TBLR" => surf.refraction_blur = cur.read_f32()?,
			b"TRNL" => surf.translucency = cur.read_f32()?,
			b"GLOS" => surf.glossiness = cur.read_f32()?,
			b"SHRP" => surf.sharpness = cur.read_f32()?,
			b"BUMP" => surf.bump = cur.read_f32()?,
			b"SMAN" => {
				if cur.read_f32()? > 0.0 {
					surf.smooth = true;
				}
			}
			b"BLOK" => {
				if let Some(texture) = read_block(sub.payload, strict)? {
					surf.textures.entry(texture.channel.clone()).or_default().push(texture);
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

	Ok(surf)
}

/// Decode one `BLOK` texture layer, or `None` for unusable block types.
fn read_block(payload: &[u8], strict: bool) -> Result<Option<Texture>> {
	let mut cursor = Cursor::new(payload);

	let type_tag = cursor.read_code4()?;
	let Some(kind) = BlockType::from_tag(type_tag) else {
		if strict {
			return Err(LwoError::UnrecognizedSubchunk {
				context: "BLOK",
				tag: type_tag,
			});
		}
		warn!("unimplemented texture block type {}", tag_label(type_tag));
		return Ok(None);
	};

	let _header_len = cursor.read_u16()?;
	let _ordinal = cursor.read_lwo_string();

	// Header sub-chunks (CHAN/OPAC/...) and block siblings (TMAP/IMAG/...)
	// are contiguous from here; one pass reads both.
	let mut texture = Texture {
		kind,
		..Texture::default()
	};

	for sub in SubChunkIter::new(&payload[cursor.pos()..]) {
		let sub = sub?;
		let mut cur = Cursor::new(sub.payload);
		match &sub.tag {
			b"TMAP" => texture.position = read_position(sub.payload)?,
			b"CHAN" => {
				let code = cur.read_code4()?;
				texture.channel = tag_label(code);
			}
			b"OPAC" => {
				texture.opacity_type = cur.read_u16()?;
				texture.opacity = cur.read_f32()?;
			}
			b"ENAB" => texture.enabled = cur.read_u16()? != 0,
			b"NEGA" => texture.negative = cur.read_u16()? != 0,
			b"AXIS" => texture.axis = cur.read_u16()?,
			b"IMAG" => texture.clip_id = cur.read_vx()?,
			b"PROJ" => texture.projection = Projection::from_raw(cur.read_u16()?),
			b"VMAP" => texture.uv_name = cur.read_lwo_string(),
			b"FUNC" => texture.function = Some(cur.read_lwo_string()),
			tag if BLOCK_UNIMPLEMENTED.contains(tag) => {
				debug!("texture block: unimplemented sub-chunk {}", tag_label(*tag));
			}
			tag => {
				if strict {
					return Err(LwoError::UnrecognizedSubchunk {
						context: "BLOK",
						tag: *tag,
					});
				}
				warn!("texture block: unrecognized sub-chunk {}", tag_label(*tag));
			}
		}
	}

	Ok(Some(texture))
}

/// Decode a `TMAP` positional transform payload.
fn read_position(payload: &[u8]) -> Result<TexturePosition> {
	let mut position = TexturePosition::default();

	for sub in SubChunkIter::new(payload) {
		let sub = sub?;
		let mut cur = Cursor::new(sub.payload);
		// CNTR/SIZE/ROTA carry a trailing envelope index, and sometimes a
		// 20-byte long form; the declared length advances past both.
		match &sub.tag {
			b"CNTR" => position.center = cur.read_vec3()?,
			b"SIZE" => position.size = cur.read_vec3()?,
			b"ROTA" => position.rotation = cur.read_vec3()?,
			b"FALL" => {
				position.falloff_kind = cur.read_i16()?;
				position.falloff = cur.read_vec3()?;
			}
			b"OREF" => position.reference_object = cur.read_lwo_string(),
			b"CSYS" => position.coord_system = cur.read_i16()?,
			tag => debug!("texture transform: skipping sub-chunk {}", tag_label(*tag)),
		}
	}

	Ok(position)
}
