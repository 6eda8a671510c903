use std::path::Path;

use serde::Serialize;

use crate::lwo::{LwoError, Result};

/// IFF container magic occupying the first four header bytes.
pub const FORM_MAGIC: [u8; 4] = *b"FORM";

/// Decoder generation selected by the header's format tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FormatKind {
	/// `LWO2`, LightWave 6 and later.
	Lwo2,
	/// `LWOB`, LightWave 5 single-layer object.
	Lwob,
	/// `LWLO`, LightWave 5 layered object.
	Lwlo,
}

impl FormatKind {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Lwo2 => "lwo2",
			Self::Lwob => "lwob",
			Self::Lwlo => "lwlo",
		}
	}

	/// Return `true` for the pre-6.0 format generation.
	pub fn is_legacy(self) -> bool {
		!matches!(self, Self::Lwo2)
	}
}

/// Parsed 12-byte LWO file header.
#[derive(Debug, Clone, Copy)]
pub struct LwoHeader {
	/// Declared byte length of the FORM payload (format tag included).
	pub form_len: u32,
	/// Format generation selected by the header tag.
	pub kind: FormatKind,
}

impl LwoHeader {
	/// Exact header size: magic, length, and format tag.
	pub const SIZE: usize = 12;

	/// Parse the header from the beginning of `bytes`.
	///
	/// `path` is carried into the error for unrecognized magic or tags.
	pub fn parse(bytes: &[u8], path: &Path) -> Result<Self> {
		let header = bytes.get(0..Self::SIZE).ok_or(LwoError::TruncatedStream {
			at: 0,
			need: Self::SIZE,
			rem: bytes.len(),
		})?;

		let mut magic = [0_u8; 4];
		magic.copy_from_slice(&header[0..4]);
		if magic != FORM_MAGIC {
			return Err(LwoError::UnsupportedFormat {
				path: path.to_path_buf(),
				tag: magic,
			});
		}

		let mut len_buf = [0_u8; 4];
		len_buf.copy_from_slice(&header[4..8]);
		let form_len = u32::from_be_bytes(len_buf);

		let mut tag = [0_u8; 4];
		tag.copy_from_slice(&header[8..12]);
		let kind = match &tag {
			b"LWO2" => FormatKind::Lwo2,
			b"LWOB" => FormatKind::Lwob,
			b"LWLO" => FormatKind::Lwlo,
			_ => {
				return Err(LwoError::UnsupportedFormat {
					path: path.to_path_buf(),
					tag,
				});
			}
		};

		Ok(Self { form_len, kind })
	}
}
