//! The two subject renderables and the per-frame math that drives them.

/// Heightmap-displaced surface grid and its shader material.
pub mod surface;

/// Point cloud arena, data textures and shader material.
pub mod particles;

/// Particle target functions and the wall-clock sub-mode cycle.
pub mod distortion;
