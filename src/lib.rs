//! Public library API for decoding LightWave `.lwo` object files.

/// LWO container parsing, geometry/surface decoding, and clip resolution.
pub mod lwo;
