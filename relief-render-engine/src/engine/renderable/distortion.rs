use bevy::prelude::*;

use constants::animation::PARTICLE_CYCLE_SECONDS;
use constants::field::{RING_RADIUS, SPHERE_RADIUS};

use crate::engine::config::ParticleDistortion;
use crate::engine::noise;

/// Half of the wall-clock cycle the particle system currently occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticlePhase {
    /// Particles chase the selected distortion's targets.
    Distortion,
    /// Particles settle back onto the brightness-derived surface.
    Heightmap,
}

/// Sub-mode from elapsed wall-clock seconds: the first half of every cycle
/// runs the distortion, the second half the heightmap.
pub fn particle_phase(elapsed: f32) -> ParticlePhase {
    if elapsed.rem_euclid(PARTICLE_CYCLE_SECONDS) < PARTICLE_CYCLE_SECONDS * 0.5 {
        ParticlePhase::Distortion
    } else {
        ParticlePhase::Heightmap
    }
}

/// Rest position with a gentle sinusoidal bob. The sine is driven by the
/// *current* position, which trails the target and keeps the bob organic.
pub fn heightmap_target(original: Vec3, current: Vec3, elapsed: f32) -> Vec3 {
    Vec3::new(
        original.x,
        original.y,
        original.z + (current.x / 4.0 + current.y / 7.0 + elapsed * 0.5).sin(),
    )
}

/// Rest position pushed around by a frozen noise field, phase-shifted per
/// axis so the three components decorrelate.
pub fn noise_flow_target(original: Vec3, elapsed: f32) -> Vec3 {
    let s = 0.02;
    let t = elapsed * 0.3;
    let offset = Vec3::new(
        noise::noise2(original.x * s + t, original.y * s),
        noise::noise2(original.x * s + 91.3 - t, original.y * s - 123.2 + t),
        noise::noise3(original.x * s, original.y * s, t),
    );
    original + offset * 12.0
}

/// Ring redistribution: the angle comes from the rest position, the radius
/// jitters with noise, and the height pulses with a fast sine.
pub fn messy_circle_target(original: Vec3, current: Vec3, elapsed: f32) -> Vec3 {
    let angle = original.y.atan2(original.x);
    let jitter = noise::noise2(original.x * 0.05 + elapsed * 0.4, original.y * 0.05) * 10.0;
    let radius = RING_RADIUS + jitter;
    Vec3::new(
        angle.cos() * radius,
        angle.sin() * radius,
        original.z + 30.0 + 30.0 * (current.x + current.y / 2.0 + elapsed * 2.5).sin(),
    )
}

/// Projection onto a fixed-radius sphere: xy is clamped into the disc and z
/// reconstructed analytically.
pub fn sphere_target(original: Vec3) -> Vec3 {
    let mut xy = original.truncate();
    let len = xy.length();
    if len > SPHERE_RADIUS {
        xy *= SPHERE_RADIUS / len;
    }
    let z = (SPHERE_RADIUS * SPHERE_RADIUS - xy.length_squared())
        .max(0.0)
        .sqrt();
    Vec3::new(xy.x, xy.y, z)
}

/// Target for one particle given the phase and the selected distortion.
pub fn particle_target(
    phase: ParticlePhase,
    distortion: ParticleDistortion,
    original: Vec3,
    current: Vec3,
    elapsed: f32,
) -> Vec3 {
    match phase {
        ParticlePhase::Heightmap => heightmap_target(original, current, elapsed),
        ParticlePhase::Distortion => match distortion {
            ParticleDistortion::NoiseFlow => noise_flow_target(original, elapsed),
            ParticleDistortion::MessyCircle => messy_circle_target(original, current, elapsed),
            ParticleDistortion::Sphere => sphere_target(original),
        },
    }
}
