use bevy::prelude::*;
use bevy::render::extract_component::ExtractComponent;

/// Film grain / scanline pass uniforms, bound on the main camera entity.
#[derive(
    Component, Default, Clone, Copy, ExtractComponent, bevy::render::render_resource::ShaderType,
)]
pub struct GrainSettings {
    pub noise_intensity: f32,
    pub scanline_intensity: f32,
    pub time: f32,
    pub _padding: f32,
}

pub const GRAIN_SETTINGS: GrainSettings = GrainSettings {
    noise_intensity: 0.08,
    scanline_intensity: 0.05,
    time: 0.0,
    _padding: 0.0,
};

/// Maximum number of color stops a gradient recolor accepts.
pub const MAX_GRADIENT_STOPS: usize = 10;

/// Head-on viewpoint targeted by the frontal-view camera command.
pub const FRONTAL_VIEW: Vec3 = Vec3::new(0.0, 0.0, 260.0);

/// Three-quarter viewpoint targeted by the diagonal-view camera command.
pub const DIAGONAL_VIEW: Vec3 = Vec3::new(150.0, 0.0, 150.0);
