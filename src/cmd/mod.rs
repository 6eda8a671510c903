/// Full-object decode command.
pub mod decode;
/// Clip resolution report command.
pub mod images;
/// File-level information command.
pub mod info;
