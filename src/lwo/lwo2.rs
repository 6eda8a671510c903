use log::{debug, warn};

use crate::lwo::bytes::Cursor;
use crate::lwo::chunk::{Chunk, ChunkIter, ChunkTag, tag_label};
use crate::lwo::model::{Layer, LwoObject, MorphKind, MorphMap};
use crate::lwo::options::LoadOptions;
use crate::lwo::surface;
use crate::lwo::{LwoError, Result};

/// Reserved `VMAD` weight-map name carrying Catmull-Clark edge weights.
const EDGE_WEIGHT_MAP: &str = "Edge Weight";

/// Streaming decoder for `LWO2` files.
///
/// Owns the dispatch-loop state: the polygon group offset for relative
/// `VMAD`/`PTAG` ids, the bone/surface-tag interlock, and the accepted flag
/// gating chunks of a hidden layer.
pub(crate) struct Lwo2Decoder<'a> {
	object: &'a mut LwoObject,
	options: &'a LoadOptions,
	last_pols_count: usize,
	just_read_bones: bool,
	layer_accepted: bool,
}

impl<'a> Lwo2Decoder<'a> {
	pub fn new(object: &'a mut LwoObject, options: &'a LoadOptions) -> Self {
		Self {
			object,
			options,
			last_pols_count: 0,
			just_read_bones: false,
			layer_accepted: true,
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
		let tag = ChunkTag::from_tag(chunk.tag);
		if !self.layer_accepted && is_layer_scoped(tag) {
			debug!("hidden layer: skipping chunk {}", tag_label(chunk.tag));
			return Ok(());
		}

		match tag {
			ChunkTag::Tags => self.read_tags(chunk.payload),
			ChunkTag::Layr => self.read_layr(chunk.payload),
			ChunkTag::Pnts => self.read_pnts(chunk.payload),
			ChunkTag::Vmap => self.read_vmap(chunk.payload),
			ChunkTag::Vmad => self.read_vmad(chunk.payload),
			ChunkTag::Pols => self.read_pols(chunk.payload),
			ChunkTag::Ptag => self.read_ptag(chunk.payload),
			ChunkTag::Surf => self.read_surf(chunk.payload),
			ChunkTag::Clip => self.read_clip(chunk.payload),
			ChunkTag::Ignored(tag) => {
				debug!("skipping chunk {}", tag_label(tag));
				Ok(())
			}
			ChunkTag::Srfs | ChunkTag::Pchs | ChunkTag::Unknown(_) => {
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
		let flags = cur.read_u16()?;

		if flags > 0 && !self.options.load_hidden_layers {
			debug!("skipping hidden layer {index}");
			self.layer_accepted = false;
			return Ok(());
		}
		self.layer_accepted = true;

		let mut layer = Layer::new(index);
		let pivot = cur.read_vec3()?;
		layer.pivot = [pivot[0], pivot[2], pivot[1]];

		let name = cur.read_lwo_string();
		layer.name = if name.is_empty() {
			format!("Layer {}", index + 1)
		} else {
			name
		};

		if cur.remaining() == 2 {
			layer.parent_index = cur.read_i16()?;
		}

		self.object.layers.push(layer);
		Ok(())
	}

	fn read_pnts(&mut self, payload: &[u8]) -> Result<()> {
		let Some(layer) = self.object.layers.last_mut() else {
			warn!("PNTS chunk before any layer; skipping");
			return Ok(());
		};

		let mut cur = Cursor::new(payload);
		while !cur.is_empty() {
			let raw = cur.read_vec3()?;
			// File order is (x, z, y); the pivot was swapped on read.
			layer.points.push([
				raw[0] - layer.pivot[0],
				raw[2] - layer.pivot[1],
				raw[1] - layer.pivot[2],
			]);
		}
		Ok(())
	}

	fn read_pols(&mut self, payload: &[u8]) -> Result<()> {
		let mut cur = Cursor::new(payload);
		let face_type = cur.read_code4()?;
		self.just_read_bones = false;

		match &face_type {
			// PTCH is subpatch geometry, SUBD Catmull-Clark.
			b"FACE" | b"PTCH" | b"SUBD" => {
				self.last_pols_count = self.read_faces(&mut cur)?;
				if &face_type != b"FACE"
					&& let Some(layer) = self.object.layers.last_mut()
				{
					layer.has_subds = true;
				}
				Ok(())
			}
			b"BONE" => {
				self.read_bones(&mut cur)?;
				self.just_read_bones = true;
				Ok(())
			}
			tag => {
				debug!("skipping POLS face type {}", tag_label(*tag));
				Ok(())
			}
		}
	}

	fn read_faces(&mut self, cur: &mut Cursor<'_>) -> Result<usize> {
		let Some(layer) = self.object.layers.last_mut() else {
			warn!("POLS chunk before any layer; skipping");
			return Ok(0);
		};

		let old_count = layer.polygons.len();
		while !cur.is_empty() {
			let count = cur.read_u16()?;
			let mut points = Vec::with_capacity(usize::from(count));
			for _ in 0..count {
				points.push(cur.read_vx()?);
			}
			// File winding is opposite the outward-normal convention.
			points.reverse();
			layer.polygons.push(points);
		}
		Ok(layer.polygons.len() - old_count)
	}

	fn read_bones(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
		let Some(layer) = self.object.layers.last_mut() else {
			warn!("BONE chunk before any layer; skipping");
			return Ok(());
		};

		while !cur.is_empty() {
			let count = cur.read_u16()?;
			let mut points = Vec::with_capacity(usize::from(count));
			for _ in 0..count {
				points.push(cur.read_vx()?);
			}
			layer.bones.push(points);
		}
		Ok(())
	}

	fn read_ptag(&mut self, payload: &[u8]) -> Result<()> {
		let mut cur = Cursor::new(payload);
		let sub = cur.read_code4()?;

		match &sub {
			b"SURF" => {
				if self.just_read_bones {
					// Surface assignments of a bone chunk are meaningless.
					debug!("ignoring surface tags following a bone chunk");
					return Ok(());
				}
				self.read_surf_tags(&mut cur)
			}
			b"BONE" if self.options.convert_skelegons_to_armature => self.read_bone_tags(&mut cur, false),
			b"BNUP" if self.options.convert_skelegons_to_armature => self.read_bone_tags(&mut cur, true),
			b"PART" | b"COLR" => Ok(()),
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

		let offset = group_offset(group, layer)? as u32;
		while !cur.is_empty() {
			let pid = cur.read_vx()?;
			let sid = cur.read_u16()?;
			layer.surf_tags.entry(sid).or_default().push(pid + offset);
		}
		Ok(())
	}

	fn read_bone_tags(&mut self, cur: &mut Cursor<'_>, roll: bool) -> Result<()> {
		let object = &mut *self.object;
		let Some(layer) = object.layers.last_mut() else {
			warn!("bone tag chunk before any layer; skipping");
			return Ok(());
		};

		while !cur.is_empty() {
			let pid = cur.read_vx()?;
			let tid = cur.read_u16()?;
			let Some(tag) = object.tags.get(usize::from(tid)) else {
				warn!("bone tag index {tid} outside the tag table; skipping");
				continue;
			};
			let names = if roll { &mut layer.bone_rolls } else { &mut layer.bone_names };
			names.insert(pid, tag.clone());
		}
		Ok(())
	}

	fn read_vmap(&mut self, payload: &[u8]) -> Result<()> {
		let mut cur = Cursor::new(payload);
		let sub = cur.read_code4()?;

		match &sub {
			b"WGHT" => self.read_weight_map(&mut cur),
			b"MORF" => self.read_morph_map(&mut cur, MorphKind::Relative),
			b"SPOT" => self.read_morph_map(&mut cur, MorphKind::Absolute),
			b"TXUV" => self.read_uv_map(&mut cur),
			b"RGB " | b"RGBA" => self.read_color_map(&mut cur),
			b"NORM" => self.read_normal_map(&mut cur),
			tag => {
				debug!("skipping VMAP subtype {}", tag_label(*tag));
				Ok(())
			}
		}
	}

	fn read_vmad(&mut self, payload: &[u8]) -> Result<()> {
		let mut cur = Cursor::new(payload);
		let sub = cur.read_code4()?;

		match &sub {
			b"TXUV" => self.read_uv_vmad(&mut cur),
			b"RGB " | b"RGBA" => self.read_color_vmad(&mut cur),
			b"WGHT" => self.read_edge_weights(&mut cur),
			b"NORM" => self.read_normal_vmad(&mut cur),
			tag => {
				debug!("skipping VMAD subtype {}", tag_label(*tag));
				Ok(())
			}
		}
	}

	fn read_weight_map(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
		let Some(layer) = self.object.layers.last_mut() else {
			warn!("weight map before any layer; skipping");
			return Ok(());
		};

		let _dimension = cur.read_u16()?;
		let name = cur.read_lwo_string();
		let entries = layer.weight_maps.entry(name).or_default();
		while !cur.is_empty() {
			let pnt = cur.read_vx()?;
			let value = cur.read_f32()?;
			entries.push((pnt, value));
		}
		Ok(())
	}

	fn read_morph_map(&mut self, cur: &mut Cursor<'_>, kind: MorphKind) -> Result<()> {
		let Some(layer) = self.object.layers.last_mut() else {
			warn!("morph map before any layer; skipping");
			return Ok(());
		};
		let Layer { points, morph_maps, .. } = layer;

		let _dimension = cur.read_u16()?;
		let name = cur.read_lwo_string();
		let map = morph_maps.entry(name).or_insert_with(|| MorphMap {
			kind,
			entries: Vec::new(),
		});

		while !cur.is_empty() {
			let pnt = cur.read_vx()?;
			let pos = cur.read_vec3()?;
			match kind {
				MorphKind::Absolute => map.entries.push((pnt, [pos[0], pos[2], pos[1]])),
				MorphKind::Relative => {
					let Some(base) = points.get(pnt as usize).copied() else {
						warn!("morph entry references missing point {pnt}; skipping");
						continue;
					};
					// Deltas arrive in file axis order and apply to the
					// already-swapped base point.
					map.entries.push((pnt, [base[0] + pos[0], base[1] + pos[2], base[2] + pos[1]]));
				}
			}
		}
		Ok(())
	}

	fn read_uv_map(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
		let Some(layer) = self.object.layers.last_mut() else {
			warn!("uv map before any layer; skipping");
			return Ok(());
		};

		let _dimension = cur.read_u16()?;
		let name = cur.read_lwo_string();
		let map = layer.uv_maps.entry(name).or_default();
		while !cur.is_empty() {
			let pnt = cur.read_vx()?;
			let u = cur.read_f32()?;
			let v = cur.read_f32()?;
			map.point.insert(pnt, [u, v]);
		}
		Ok(())
	}

	fn read_color_map(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
		let Some(layer) = self.object.layers.last_mut() else {
			warn!("color map before any layer; skipping");
			return Ok(());
		};

		let dimension = cur.read_u16()?;
		let name = cur.read_lwo_string();
		if dimension != 3 && dimension != 4 {
			debug!("skipping {dimension}-component color map {name}");
			return Ok(());
		}

		let map = layer.color_maps.entry(name).or_default();
		while !cur.is_empty() {
			let pnt = cur.read_vx()?;
			let color = cur.read_vec3()?;
			if dimension == 4 {
				let _alpha = cur.read_f32()?;
			}
			map.point.insert(pnt, color);
		}
		Ok(())
	}

	fn read_normal_map(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
		let Some(layer) = self.object.layers.last_mut() else {
			warn!("normal map before any layer; skipping");
			return Ok(());
		};

		let _dimension = cur.read_u16()?;
		let _name = cur.read_lwo_string();
		while !cur.is_empty() {
			let pnt = cur.read_vx()?;
			let norm = cur.read_vec3()?;
			layer.vertex_normals.insert(pnt, [norm[0], norm[2], norm[1]]);
		}
		Ok(())
	}

	fn read_uv_vmad(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
		let group = self.last_pols_count;
		let Some(layer) = self.object.layers.last_mut() else {
			warn!("uv face map before any layer; skipping");
			return Ok(());
		};

		let _dimension = cur.read_u16()?;
		let name = cur.read_lwo_string();
		let offset = group_offset(group, layer)? as u32;
		let map = layer.uv_maps.entry(name).or_default();
		while !cur.is_empty() {
			let pnt = cur.read_vx()?;
			let pol = cur.read_vx()? + offset;
			let u = cur.read_f32()?;
			let v = cur.read_f32()?;
			map.face.entry(pol).or_default().insert(pnt, [u, v]);
		}
		Ok(())
	}

	fn read_color_vmad(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
		let group = self.last_pols_count;
		let Some(layer) = self.object.layers.last_mut() else {
			warn!("color face map before any layer; skipping");
			return Ok(());
		};

		let dimension = cur.read_u16()?;
		let name = cur.read_lwo_string();
		if dimension != 3 && dimension != 4 {
			debug!("skipping {dimension}-component color face map {name}");
			return Ok(());
		}

		let offset = group_offset(group, layer)? as u32;
		let map = layer.color_maps.entry(name).or_default();
		while !cur.is_empty() {
			let pnt = cur.read_vx()?;
			let pol = cur.read_vx()? + offset;
			let color = cur.read_vec3()?;
			if dimension == 4 {
				let _alpha = cur.read_f32()?;
			}
			map.face.entry(pol).or_default().insert(pnt, color);
		}
		Ok(())
	}

	fn read_edge_weights(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
		let Some(layer) = self.object.layers.last_mut() else {
			warn!("edge weight map before any layer; skipping");
			return Ok(());
		};
		let Layer { polygons, edge_weights, .. } = layer;

		let _dimension = cur.read_u16()?;
		let name = cur.read_lwo_string();
		if name != EDGE_WEIGHT_MAP {
			debug!("ignoring VMAD weight map {name}");
			return Ok(());
		}

		// Polygons store their points clockwise, which gives edges a
		// direction; the weight belongs to the edge running from the next
		// point in winding order back to the record's point.
		while !cur.is_empty() {
			let pnt = cur.read_vx()?;
			let pol = cur.read_vx()?;
			let weight = cur.read_f32()?;

			let Some(points) = polygons.get(pol as usize) else {
				debug!("edge weight references missing polygon {pol}; skipping record");
				continue;
			};
			let Some(first_idx) = points.iter().position(|point| *point == pnt) else {
				debug!("edge weight point {pnt} not in polygon {pol}; skipping record");
				continue;
			};
			let next = points[(first_idx + 1) % points.len()];
			edge_weights.insert(format!("{next} {pnt}"), weight);
		}
		Ok(())
	}

	fn read_normal_vmad(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
		let Some(layer) = self.object.layers.last_mut() else {
			warn!("split normal map before any layer; skipping");
			return Ok(());
		};

		let _dimension = cur.read_u16()?;
		let _name = cur.read_lwo_string();
		while !cur.is_empty() {
			let pnt = cur.read_vx()?;
			let pol = cur.read_vx()?;
			let norm = cur.read_vec3()?;
			layer.split_normals.entry(pol).or_default().push((pnt, [norm[0], norm[2], norm[1]]));
		}
		Ok(())
	}

	fn read_surf(&mut self, payload: &[u8]) -> Result<()> {
		let surf = surface::read_surf(payload, self.options.strict)?;
		self.object.surfaces.insert(surf.name.clone(), surf);
		Ok(())
	}

	fn read_clip(&mut self, payload: &[u8]) -> Result<()> {
		let mut cur = Cursor::new(payload);
		let clip_id = cur.read_u32()?;
		let source = cur.read_code4()?;
		if &source != b"STIL" {
			debug!("clip {clip_id}: unhandled source {}", tag_label(source));
		}
		let _len = cur.read_u16()?;
		let path = cur.read_lwo_string();
		self.object.clips.insert(clip_id, path);
		Ok(())
	}
}

/// Return `true` for chunk kinds scoped to the current layer.
fn is_layer_scoped(tag: ChunkTag) -> bool {
	matches!(
		tag,
		ChunkTag::Pnts | ChunkTag::Vmap | ChunkTag::Vmad | ChunkTag::Pols | ChunkTag::Ptag
	)
}

/// Polygon count accumulated before the current `POLS`/`PTAG` group.
///
/// A group larger than the layer's polygon list marks a malformed file.
fn group_offset(last_pols_count: usize, layer: &Layer) -> Result<usize> {
	let pols = layer.polygons.len();
	if last_pols_count > pols {
		return Err(LwoError::PolygonOffsetUnderflow {
			pols,
			group: last_pols_count,
		});
	}
	Ok(pols - last_pols_count)
}
