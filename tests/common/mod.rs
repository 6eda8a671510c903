//! Byte-stream builders shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Encode a zero-terminated, even-padded LWO string.
pub fn lwo_string(text: &str) -> Vec<u8> {
	let mut out = text.as_bytes().to_vec();
	out.push(0);
	if out.len() % 2 == 1 {
		out.push(0);
	}
	out
}

/// Encode a root chunk: tag, big-endian `u32` length, payload, pad byte.
pub fn chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
	let mut out = Vec::new();
	out.extend_from_slice(tag);
	out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
	out.extend_from_slice(payload);
	if payload.len() % 2 == 1 {
		out.push(0);
	}
	out
}

/// Encode a sub-chunk: tag, big-endian `u16` length, payload.
pub fn sub_chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
	let mut out = Vec::new();
	out.extend_from_slice(tag);
	out.extend_from_slice(&(payload.len() as u16).to_be_bytes());
	out.extend_from_slice(payload);
	out
}

/// Encode consecutive big-endian floats.
pub fn f32s(values: &[f32]) -> Vec<u8> {
	let mut out = Vec::new();
	for value in values {
		out.extend_from_slice(&value.to_be_bytes());
	}
	out
}

/// Encode a variable-length index in its narrowest form.
pub fn vx(index: u32) -> Vec<u8> {
	if index < 0xFF00 {
		(index as u16).to_be_bytes().to_vec()
	} else {
		let mut out = vec![0xFF];
		out.extend_from_slice(&index.to_be_bytes()[1..]);
		out
	}
}

/// Assemble a whole file: 12-byte header plus root chunks.
pub fn lwo_file(format_tag: &[u8; 4], chunks: &[Vec<u8>]) -> Vec<u8> {
	let body_len: usize = chunks.iter().map(Vec::len).sum();
	let mut out = Vec::new();
	out.extend_from_slice(b"FORM");
	out.extend_from_slice(&((body_len + 4) as u32).to_be_bytes());
	out.extend_from_slice(format_tag);
	for chunk in chunks {
		out.extend_from_slice(chunk);
	}
	out
}

/// Write `bytes` under `dir` and return the file path.
pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
	let path = dir.join(name);
	fs::write(&path, bytes).expect("test file writes");
	path
}
