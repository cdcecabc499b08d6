/// Target width of the downsampled brightness field. Height follows the
/// source image's aspect ratio.
pub const FIELD_TARGET_WIDTH: usize = 256;

/// World-unit span of the subject plane (and the long axis of the particle grid).
pub const SUBJECT_EXTENT: f32 = 200.0;

/// Subdivisions per side of the displacement surface grid.
pub const SURFACE_SEGMENTS: usize = 512;

/// World-unit height of a fully bright particle before the growth ramp scaling.
pub const PARTICLE_HEIGHT_SCALE: f32 = 50.0;

/// Radius of the ring particles redistribute onto in the messy-circle distortion.
pub const RING_RADIUS: f32 = 200.0;

/// Radius of the sphere particles project onto in the sphere distortion.
pub const SPHERE_RADIUS: f32 = 100.0;
