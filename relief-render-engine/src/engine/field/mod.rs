//! Brightness field extraction and the displacement/color field built from it.
//!
//! One field is derived per loaded subject and drives both the geometry
//! displacement and the recolor effects until the subject is replaced.

/// Downsampling and per-sample luminance computation.
pub mod luminance;

/// The extracted raster wrapped as a displacement and recolor driver.
pub mod displacement;
