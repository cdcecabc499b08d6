use bevy::prelude::*;

use crate::engine::camera::parallax_camera::ParallaxCamera;
use crate::engine::config::{DisplayMode, EffectState};

/// Handle effect-state switching via keyboard input on native builds.
/// On WASM the same state changes arrive through RPC notifications instead,
/// so the keyboard path compiles out entirely.
pub fn input_system(
    #[cfg(not(target_arch = "wasm32"))] mut state: ResMut<EffectState>,
    #[cfg(not(target_arch = "wasm32"))] mut parallax: ResMut<ParallaxCamera>,
    #[cfg(not(target_arch = "wasm32"))] keyboard: Res<ButtonInput<KeyCode>>,
) {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if keyboard.just_pressed(KeyCode::Tab) {
            state.mode = match state.mode {
                DisplayMode::Surface => DisplayMode::Particles,
                DisplayMode::Particles => DisplayMode::Surface,
            };
            info!("Display mode: {:?}", state.mode);
        }

        if keyboard.just_pressed(KeyCode::KeyD) {
            state.particle_distortion = state.particle_distortion.next();
            info!("Particle distortion: {:?}", state.particle_distortion);
        }

        if keyboard.just_pressed(KeyCode::KeyG) {
            state.gradient_enabled = !state.gradient_enabled;
            info!("Gradient recolor: {}", state.gradient_enabled);
        }

        if keyboard.just_pressed(KeyCode::KeyT) {
            state.gradient_transparency = !state.gradient_transparency;
            info!("Gradient transparency: {}", state.gradient_transparency);
        }

        if keyboard.just_pressed(KeyCode::KeyU) {
            state.duotone_enabled = !state.duotone_enabled;
            info!("Duotone recolor: {}", state.duotone_enabled);
        }

        if keyboard.just_pressed(KeyCode::KeyP) {
            state.parallax_enabled = !state.parallax_enabled;
            info!("Parallax: {}", state.parallax_enabled);
        }

        if keyboard.just_pressed(KeyCode::KeyF) {
            parallax.go_frontal_view();
            info!("Camera: frontal view");
        }

        if keyboard.just_pressed(KeyCode::KeyV) {
            parallax.go_diagonal_view();
            info!("Camera: diagonal view");
        }
    }
}
