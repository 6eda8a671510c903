#![allow(missing_docs)]

mod common;

use common::{chunk, f32s, lwo_file, lwo_string, sub_chunk, vx, write_file};
use lwodoc::lwo::{FormatKind, LoadOptions, LwoError, LwoFile, MorphKind, Projection};

fn layr(index: u16, flags: u16, pivot: [f32; 3], name: &str) -> Vec<u8> {
	let mut payload = Vec::new();
	payload.extend_from_slice(&index.to_be_bytes());
	payload.extend_from_slice(&flags.to_be_bytes());
	payload.extend_from_slice(&f32s(&pivot));
	payload.extend_from_slice(&lwo_string(name));
	chunk(b"LAYR", &payload)
}

fn pnts(points: &[[f32; 3]]) -> Vec<u8> {
	let mut payload = Vec::new();
	for point in points {
		payload.extend_from_slice(&f32s(point));
	}
	chunk(b"PNTS", &payload)
}

fn pols(face_type: &[u8; 4], polygons: &[&[u32]]) -> Vec<u8> {
	let mut payload = Vec::new();
	payload.extend_from_slice(face_type);
	for polygon in polygons {
		payload.extend_from_slice(&(polygon.len() as u16).to_be_bytes());
		for point in *polygon {
			payload.extend_from_slice(&vx(*point));
		}
	}
	chunk(b"POLS", &payload)
}

fn uv_map(kind: &[u8; 4], name: &str, records: &[u8]) -> Vec<u8> {
	let mut payload = Vec::new();
	payload.extend_from_slice(b"TXUV");
	payload.extend_from_slice(&2_u16.to_be_bytes());
	payload.extend_from_slice(&lwo_string(name));
	payload.extend_from_slice(records);
	chunk(kind, &payload)
}

#[test]
fn decodes_geometry_vertex_maps_surfaces_and_clips() {
	let points = [
		[0.0_f32, 0.0, 0.0],
		[1.0, 0.0, 0.0],
		[1.0, 0.0, 1.0],
		[0.0, 0.0, 1.0],
		[2.0, 0.0, 0.0],
		[2.0, 0.0, 1.0],
	];

	let mut ptag = Vec::new();
	ptag.extend_from_slice(b"SURF");
	ptag.extend_from_slice(&vx(0));
	ptag.extend_from_slice(&1_u16.to_be_bytes());
	ptag.extend_from_slice(&vx(1));
	ptag.extend_from_slice(&0_u16.to_be_bytes());

	let mut uv_points = Vec::new();
	uv_points.extend_from_slice(&vx(0));
	uv_points.extend_from_slice(&f32s(&[0.0, 0.1]));
	uv_points.extend_from_slice(&vx(1));
	uv_points.extend_from_slice(&f32s(&[0.5, 0.5]));

	// The record's polygon id is relative to the second POLS group.
	let mut uv_faces = Vec::new();
	uv_faces.extend_from_slice(&vx(1));
	uv_faces.extend_from_slice(&vx(0));
	uv_faces.extend_from_slice(&f32s(&[0.9, 0.9]));

	let mut blok = Vec::new();
	blok.extend_from_slice(b"IMAP");
	blok.extend_from_slice(&2_u16.to_be_bytes());
	blok.extend_from_slice(&[0x80, 0]);
	blok.extend_from_slice(&sub_chunk(b"CHAN", b"COLR"));
	blok.extend_from_slice(&sub_chunk(b"IMAG", &1_u16.to_be_bytes()));
	blok.extend_from_slice(&sub_chunk(b"PROJ", &0_u16.to_be_bytes()));

	let mut surf = lwo_string("Walls");
	surf.extend_from_slice(&lwo_string(""));
	surf.extend_from_slice(&sub_chunk(b"DIFF", &f32s(&[0.5])));
	surf.extend_from_slice(&sub_chunk(b"BLOK", &blok));

	let mut clip = Vec::new();
	clip.extend_from_slice(&1_u32.to_be_bytes());
	clip.extend_from_slice(b"STIL");
	let clip_path = lwo_string("bricks.png");
	clip.extend_from_slice(&(clip_path.len() as u16).to_be_bytes());
	clip.extend_from_slice(&clip_path);

	let mut tags = lwo_string("Default");
	tags.extend_from_slice(&lwo_string("Walls"));

	let bytes = lwo_file(
		b"LWO2",
		&[
			chunk(b"TAGS", &tags),
			layr(0, 0, [0.0, 0.0, 0.0], "Base"),
			pnts(&points),
			pols(b"FACE", &[&[0, 1, 2, 3], &[0, 1], &[0, 1, 2, 3, 4]]),
			chunk(b"PTAG", &ptag),
			uv_map(b"VMAP", "UVMap", &uv_points),
			chunk(b"XXXX", &[1, 2, 3]),
			pols(b"FACE", &[&[1, 2, 3]]),
			uv_map(b"VMAD", "UVMap", &uv_faces),
			chunk(b"SURF", &surf),
			chunk(b"CLIP", &clip),
		],
	);

	let dir = tempfile::tempdir().expect("tempdir creates");
	let path = write_file(dir.path(), "scene.lwo", &bytes);
	let file = LwoFile::open(&path).expect("file opens");
	assert_eq!(file.header.kind, FormatKind::Lwo2);

	let object = file.decode(&LoadOptions::default()).expect("file decodes");

	assert_eq!(object.tags, vec!["Default".to_owned(), "Walls".to_owned()]);
	assert_eq!(object.layers.len(), 1);

	let layer = &object.layers[0];
	assert_eq!(layer.name, "Base");
	assert_eq!(layer.points.len(), 6);
	// File order (x, z, y) becomes (x, y, z).
	assert_eq!(layer.points[2], [1.0, 1.0, 0.0]);

	// Winding is reversed; 2-point polygons stay bare edges and 5-point
	// polygons stay n-gons.
	assert_eq!(layer.polygons.len(), 4);
	assert_eq!(layer.polygons[0], vec![3, 2, 1, 0]);
	assert_eq!(layer.polygons[1], vec![1, 0]);
	assert_eq!(layer.polygons[2], vec![4, 3, 2, 1, 0]);
	assert_eq!(layer.polygons[3], vec![3, 2, 1]);

	assert_eq!(layer.surf_tags.get(&1), Some(&vec![0]));
	assert_eq!(layer.surf_tags.get(&0), Some(&vec![1]));

	let uv = layer.uv_maps.get("UVMap").expect("uv map present");
	assert_eq!(uv.point.get(&0), Some(&[0.0, 0.1]));
	assert_eq!(uv.point.get(&1), Some(&[0.5, 0.5]));
	// Relative polygon id 0 lands after the three polygons of the first group.
	assert_eq!(uv.face.get(&3).and_then(|face| face.get(&1)), Some(&[0.9, 0.9]));

	let surf = object.surfaces.get("Walls").expect("surface present");
	assert_eq!(surf.diffuse, 0.5);
	let texture = &surf.textures.get("COLR").expect("texture channel present")[0];
	assert_eq!(texture.clip_id, 1);
	assert_eq!(texture.projection, Projection::Planar);

	assert_eq!(object.clips.get(&1).map(String::as_str), Some("bricks.png"));
}

#[test]
fn swaps_pivot_axes_and_subtracts_from_points() {
	let mut payload = Vec::new();
	payload.extend_from_slice(&1_u16.to_be_bytes());
	payload.extend_from_slice(&0_u16.to_be_bytes());
	payload.extend_from_slice(&f32s(&[1.0, 2.0, 3.0]));
	payload.extend_from_slice(&lwo_string(""));
	payload.extend_from_slice(&0_i16.to_be_bytes());

	let bytes = lwo_file(
		b"LWO2",
		&[chunk(b"LAYR", &payload), pnts(&[[10.0, 20.0, 30.0]])],
	);

	let dir = tempfile::tempdir().expect("tempdir creates");
	let path = write_file(dir.path(), "pivot.lwo", &bytes);
	let object = LwoFile::open(&path)
		.expect("file opens")
		.decode(&LoadOptions::default())
		.expect("file decodes");

	let layer = &object.layers[0];
	assert_eq!(layer.name, "Layer 2");
	assert_eq!(layer.parent_index, 0);
	assert_eq!(layer.pivot, [1.0, 3.0, 2.0]);
	assert_eq!(layer.points[0], [9.0, 27.0, 18.0]);
}

#[test]
fn hidden_layers_are_skipped_with_their_chunks() {
	let bytes = lwo_file(
		b"LWO2",
		&[
			layr(0, 1, [0.0, 0.0, 0.0], "Hidden"),
			pnts(&[[1.0, 1.0, 1.0]]),
			pols(b"FACE", &[&[0]]),
			layr(1, 0, [0.0, 0.0, 0.0], "Shown"),
			pnts(&[[2.0, 2.0, 2.0]]),
		],
	);

	let dir = tempfile::tempdir().expect("tempdir creates");
	let path = write_file(dir.path(), "hidden.lwo", &bytes);
	let file = LwoFile::open(&path).expect("file opens");

	let object = file.decode(&LoadOptions::default()).expect("file decodes");
	assert_eq!(object.layers.len(), 1);
	assert_eq!(object.layers[0].name, "Shown");
	assert_eq!(object.layers[0].points.len(), 1);

	let options = LoadOptions {
		load_hidden_layers: true,
		..LoadOptions::default()
	};
	let object = file.decode(&options).expect("file decodes");
	assert_eq!(object.layers.len(), 2);
	assert_eq!(object.layers[0].name, "Hidden");
}

#[test]
fn same_name_uv_maps_merge_preferring_later_values() {
	let mut first = Vec::new();
	first.extend_from_slice(&vx(0));
	first.extend_from_slice(&f32s(&[0.0, 0.0]));
	first.extend_from_slice(&vx(1));
	first.extend_from_slice(&f32s(&[0.25, 0.25]));

	let mut second = Vec::new();
	second.extend_from_slice(&vx(1));
	second.extend_from_slice(&f32s(&[0.75, 0.75]));
	second.extend_from_slice(&vx(2));
	second.extend_from_slice(&f32s(&[1.0, 1.0]));

	let bytes = lwo_file(
		b"LWO2",
		&[
			layr(0, 0, [0.0, 0.0, 0.0], "Base"),
			pnts(&[[0.0; 3], [0.0; 3], [0.0; 3]]),
			uv_map(b"VMAP", "UVMap", &first),
			uv_map(b"VMAP", "UVMap", &second),
		],
	);

	let dir = tempfile::tempdir().expect("tempdir creates");
	let path = write_file(dir.path(), "merge.lwo", &bytes);
	let object = LwoFile::open(&path)
		.expect("file opens")
		.decode(&LoadOptions::default())
		.expect("file decodes");

	let uv = object.layers[0].uv_maps.get("UVMap").expect("uv map present");
	assert_eq!(uv.point.len(), 3);
	assert_eq!(uv.point.get(&0), Some(&[0.0, 0.0]));
	assert_eq!(uv.point.get(&1), Some(&[0.75, 0.75]));
	assert_eq!(uv.point.get(&2), Some(&[1.0, 1.0]));
}

#[test]
fn decodes_relative_and_absolute_morphs() {
	let mut morf = Vec::new();
	morf.extend_from_slice(b"MORF");
	morf.extend_from_slice(&3_u16.to_be_bytes());
	morf.extend_from_slice(&lwo_string("Bulge"));
	morf.extend_from_slice(&vx(0));
	morf.extend_from_slice(&f32s(&[0.1, 0.2, 0.3]));

	let mut spot = Vec::new();
	spot.extend_from_slice(b"SPOT");
	spot.extend_from_slice(&3_u16.to_be_bytes());
	spot.extend_from_slice(&lwo_string("Target"));
	spot.extend_from_slice(&vx(0));
	spot.extend_from_slice(&f32s(&[5.0, 6.0, 7.0]));

	let bytes = lwo_file(
		b"LWO2",
		&[
			layr(0, 0, [0.0, 0.0, 0.0], "Base"),
			pnts(&[[1.0, 2.0, 3.0]]),
			chunk(b"VMAP", &morf),
			chunk(b"VMAP", &spot),
		],
	);

	let dir = tempfile::tempdir().expect("tempdir creates");
	let path = write_file(dir.path(), "morph.lwo", &bytes);
	let object = LwoFile::open(&path)
		.expect("file opens")
		.decode(&LoadOptions::default())
		.expect("file decodes");

	let layer = &object.layers[0];
	// Base point (1, 2, 3) decodes to (1, 3, 2).
	let bulge = layer.morph_maps.get("Bulge").expect("relative morph present");
	assert_eq!(bulge.kind, MorphKind::Relative);
	assert_eq!(bulge.entries, vec![(0, [1.1, 3.3, 2.2])]);

	let target = layer.morph_maps.get("Target").expect("absolute morph present");
	assert_eq!(target.kind, MorphKind::Absolute);
	assert_eq!(target.entries, vec![(0, [5.0, 7.0, 6.0])]);
}

#[test]
fn decodes_color_maps_in_both_scopes_dropping_alpha() {
	let mut rgba = Vec::new();
	rgba.extend_from_slice(b"RGBA");
	rgba.extend_from_slice(&4_u16.to_be_bytes());
	rgba.extend_from_slice(&lwo_string("Tint"));
	rgba.extend_from_slice(&vx(0));
	rgba.extend_from_slice(&f32s(&[0.1, 0.2, 0.3, 0.4]));

	let mut rgb_faces = Vec::new();
	rgb_faces.extend_from_slice(b"RGB ");
	rgb_faces.extend_from_slice(&3_u16.to_be_bytes());
	rgb_faces.extend_from_slice(&lwo_string("Tint"));
	rgb_faces.extend_from_slice(&vx(1));
	rgb_faces.extend_from_slice(&vx(0));
	rgb_faces.extend_from_slice(&f32s(&[0.5, 0.6, 0.7]));

	let bytes = lwo_file(
		b"LWO2",
		&[
			layr(0, 0, [0.0, 0.0, 0.0], "Base"),
			pnts(&[[0.0; 3], [0.0; 3], [0.0; 3]]),
			chunk(b"VMAP", &rgba),
			pols(b"FACE", &[&[0, 1, 2]]),
			chunk(b"VMAD", &rgb_faces),
		],
	);

	let dir = tempfile::tempdir().expect("tempdir creates");
	let path = write_file(dir.path(), "colors.lwo", &bytes);
	let object = LwoFile::open(&path)
		.expect("file opens")
		.decode(&LoadOptions::default())
		.expect("file decodes");

	let colors = object.layers[0].color_maps.get("Tint").expect("color map present");
	assert_eq!(colors.point.get(&0), Some(&[0.1, 0.2, 0.3]));
	assert_eq!(colors.face.get(&0).and_then(|face| face.get(&1)), Some(&[0.5, 0.6, 0.7]));
}

#[test]
fn decodes_skelegons_and_their_tags() {
	let mut tags = lwo_string("RootBone");
	tags.extend_from_slice(&lwo_string("UpTag"));

	let mut bone_ptag = Vec::new();
	bone_ptag.extend_from_slice(b"BONE");
	bone_ptag.extend_from_slice(&vx(0));
	bone_ptag.extend_from_slice(&0_u16.to_be_bytes());

	let mut bnup_ptag = Vec::new();
	bnup_ptag.extend_from_slice(b"BNUP");
	bnup_ptag.extend_from_slice(&vx(0));
	bnup_ptag.extend_from_slice(&1_u16.to_be_bytes());

	let mut surf_ptag = Vec::new();
	surf_ptag.extend_from_slice(b"SURF");
	surf_ptag.extend_from_slice(&vx(0));
	surf_ptag.extend_from_slice(&0_u16.to_be_bytes());

	let bytes = lwo_file(
		b"LWO2",
		&[
			chunk(b"TAGS", &tags),
			layr(0, 0, [0.0, 0.0, 0.0], "Rig"),
			pnts(&[[0.0; 3], [0.0, 0.0, 1.0], [0.0, 0.0, 2.0]]),
			pols(b"BONE", &[&[0, 1], &[1, 2]]),
			// Surface tags following a bone chunk are ignored.
			chunk(b"PTAG", &surf_ptag),
			chunk(b"PTAG", &bone_ptag),
			chunk(b"PTAG", &bnup_ptag),
		],
	);

	let dir = tempfile::tempdir().expect("tempdir creates");
	let path = write_file(dir.path(), "rig.lwo", &bytes);
	let file = LwoFile::open(&path).expect("file opens");

	let object = file.decode(&LoadOptions::default()).expect("file decodes");
	let layer = &object.layers[0];
	// Bone chains keep their file order.
	assert_eq!(layer.bones, vec![vec![0, 1], vec![1, 2]]);
	assert_eq!(layer.bone_names.get(&0).map(String::as_str), Some("RootBone"));
	assert_eq!(layer.bone_rolls.get(&0).map(String::as_str), Some("UpTag"));
	assert!(layer.surf_tags.is_empty());

	let options = LoadOptions {
		convert_skelegons_to_armature: false,
		..LoadOptions::default()
	};
	let object = file.decode(&options).expect("file decodes");
	assert!(object.layers[0].bone_names.is_empty());
	assert!(object.layers[0].bone_rolls.is_empty());
}

#[test]
fn subpatch_faces_set_the_subdivision_flag() {
	let bytes = lwo_file(
		b"LWO2",
		&[
			layr(0, 0, [0.0, 0.0, 0.0], "Patch"),
			pnts(&[[0.0; 3], [0.0; 3], [0.0; 3], [0.0; 3]]),
			pols(b"SUBD", &[&[0, 1, 2, 3]]),
		],
	);

	let dir = tempfile::tempdir().expect("tempdir creates");
	let path = write_file(dir.path(), "subd.lwo", &bytes);
	let object = LwoFile::open(&path)
		.expect("file opens")
		.decode(&LoadOptions::default())
		.expect("file decodes");

	assert!(object.layers[0].has_subds);
}

#[test]
fn strict_mode_fails_on_unrecognized_surface_sub_chunk() {
	let mut surf = lwo_string("Odd");
	surf.extend_from_slice(&lwo_string(""));
	surf.extend_from_slice(&sub_chunk(b"ZZZZ", &[0, 0]));

	let bytes = lwo_file(b"LWO2", &[chunk(b"SURF", &surf)]);

	let dir = tempfile::tempdir().expect("tempdir creates");
	let path = write_file(dir.path(), "strict.lwo", &bytes);
	let file = LwoFile::open(&path).expect("file opens");

	assert!(file.decode(&LoadOptions::default()).is_ok());

	let options = LoadOptions {
		strict: true,
		..LoadOptions::default()
	};
	let err = file.decode(&options).expect_err("strict decode should fail");
	assert!(matches!(err, LwoError::UnrecognizedSubchunk { context: "SURF", tag } if &tag == b"ZZZZ"));
}

#[test]
fn rejects_unknown_format_tag_with_the_file_path() {
	let bytes = lwo_file(b"LWO9", &[]);

	let dir = tempfile::tempdir().expect("tempdir creates");
	let path = write_file(dir.path(), "future.lwo", &bytes);
	let err = LwoFile::open(&path).expect_err("unknown tag should fail");
	assert!(matches!(err, LwoError::UnsupportedFormat { tag, path: p } if &tag == b"LWO9" && p == path));
}
