/// Seconds for the growth ramp that raises the subject from flat after a load.
pub const GROW_RAMP_SECONDS: f32 = 5.0;

/// Per-tick exponential smoothing gain for particle positions.
pub const POSITION_LERP_FACTOR: f32 = 0.2;

/// Per-tick exponential smoothing gain for particle colors.
pub const COLOR_LERP_FACTOR: f32 = 0.15;

/// Wall-clock period of the particle sub-mode cycle. The first half runs the
/// selected distortion, the second half settles back onto the heightmap.
pub const PARTICLE_CYCLE_SECONDS: f32 = 10.0;

/// Distance below which a pending camera transition snaps onto its target.
pub const CAMERA_SNAP_DISTANCE: f32 = 1.0;

/// World units per second a pending camera transition covers.
pub const CAMERA_TRANSITION_SPEED: f32 = 120.0;

/// Ambient auto-rotate rate around the subject, radians per second.
pub const AUTO_ROTATE_SPEED: f32 = 0.15;
