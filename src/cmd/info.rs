use std::path::PathBuf;

use lwodoc::lwo::{LwoFile, Result, tag_label};

/// Print high-level file and chunk statistics.
pub fn run(path: PathBuf) -> Result<()> {
	let file = LwoFile::open(&path)?;
	let stats = file.scan_chunk_stats()?;

	println!("path: {}", path.display());
	println!("format: {}", file.header.kind.as_str());
	println!("form_len: {}", file.header.form_len);
	println!("chunk_count: {}", stats.chunk_count);
	println!("last_tag: {}", tag_label(stats.last_tag));

	let mut entries: Vec<_> = stats.tags.into_iter().collect();
	entries.sort_by(|left, right| right.1.cmp(&left.1).then_with(|| left.0.cmp(&right.0)));

	println!("tags:");
	for (tag, count) in entries {
		println!("  {}: {}", tag_label(tag), count);
	}

	Ok(())
}
