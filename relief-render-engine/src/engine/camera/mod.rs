//! Camera motion: ambient auto-rotate and pointer parallax, plus the two
//! explicit view transitions invokable from outside.

/// Parallax camera resource and per-tick controller system.
pub mod parallax_camera;
