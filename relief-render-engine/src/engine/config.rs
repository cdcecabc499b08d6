//! Shared effect configuration snapshot.
//!
//! Owned by the external control surface (RPC frontend or keyboard
//! shortcuts); the core reads one consistent snapshot per tick and never
//! mutates it. Values are assumed pre-validated by the collaborator.

use bevy::prelude::*;

/// Which renderable is attached to the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    Surface,
    Particles,
}

/// Distortion variant the particle cloud cycles into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticleDistortion {
    #[default]
    NoiseFlow,
    Sphere,
    MessyCircle,
}

impl ParticleDistortion {
    pub fn next(self) -> Self {
        match self {
            Self::NoiseFlow => Self::Sphere,
            Self::Sphere => Self::MessyCircle,
            Self::MessyCircle => Self::NoiseFlow,
        }
    }
}

/// Breathing distortion parameters, applied per-vertex in the surface shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreatheParams {
    pub waviness: f32,
    pub speed: f32,
    pub whole_body_movement: f32,
    pub tall_point_exaggeration: f32,
    pub noise_speed: f32,
    pub noise_amount: f32,
}

impl Default for BreatheParams {
    fn default() -> Self {
        Self {
            waviness: 2.2,
            speed: 1.0,
            whole_body_movement: 2.0,
            tall_point_exaggeration: 20.0,
            noise_speed: 0.2,
            noise_amount: 4.0,
        }
    }
}

/// Process-wide effect configuration. Colors are linear-ish sRGB triplets in
/// [0, 1], matching what the recolor passes write back out.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct EffectState {
    pub mode: DisplayMode,
    pub particle_distortion: ParticleDistortion,

    /// Peak world-unit height the subject grows to.
    pub grow_length: f32,
    pub background: Color,

    pub duotone_dark: Vec3,
    pub duotone_light: Vec3,
    pub duotone_enabled: bool,
    pub duotone_crush: f32,

    /// 2..=MAX_GRADIENT_STOPS stops, equally spaced along [0, 1].
    pub gradient_stops: Vec<Vec3>,
    pub gradient_enabled: bool,
    pub gradient_transparency: bool,

    pub noise_intensity: f32,
    pub scanline_intensity: f32,

    pub parallax_enabled: bool,
    pub parallax_responds_to_mouse: bool,
    pub parallax_intensity: f32,
    pub parallax_return_speed: f32,

    pub breathe: BreatheParams,
}

impl Default for EffectState {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Surface,
            particle_distortion: ParticleDistortion::NoiseFlow,
            grow_length: 50.0,
            background: Color::WHITE,
            duotone_dark: Vec3::new(0.05, 0.02, 0.1),
            duotone_light: Vec3::new(0.98, 0.9, 0.76),
            duotone_enabled: false,
            duotone_crush: 0.0,
            gradient_stops: vec![Vec3::ZERO, Vec3::ONE],
            gradient_enabled: false,
            gradient_transparency: false,
            noise_intensity: 0.08,
            scanline_intensity: 0.05,
            parallax_enabled: true,
            parallax_responds_to_mouse: true,
            parallax_intensity: 0.35,
            parallax_return_speed: 4.0,
            breathe: BreatheParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distortion_cycle_visits_every_variant() {
        let start = ParticleDistortion::NoiseFlow;
        let mut seen = vec![start];
        let mut current = start;
        for _ in 0..2 {
            current = current.next();
            assert!(!seen.contains(&current));
            seen.push(current);
        }
        assert_eq!(current.next(), start);
    }

    #[test]
    fn defaults_keep_recoloring_disabled() {
        let state = EffectState::default();
        assert!(!state.duotone_enabled);
        assert!(!state.gradient_enabled);
        assert_eq!(state.gradient_stops.len(), 2);
    }
}
