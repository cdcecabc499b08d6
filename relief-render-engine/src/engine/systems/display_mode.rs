use bevy::prelude::*;

use crate::engine::config::{DisplayMode, EffectState};
use crate::engine::renderable::particles::ParticleRenderable;
use crate::engine::renderable::surface::SurfaceRenderable;

/// Attach the selected renderable and detach the other. Both entities stay
/// alive with their state intact, so switching back is instant and restores
/// the exact positions left behind.
pub fn apply_display_mode(
    mode: DisplayMode,
    surface: &mut Visibility,
    particles: &mut Visibility,
) {
    match mode {
        DisplayMode::Surface => {
            *surface = Visibility::Visible;
            *particles = Visibility::Hidden;
        }
        DisplayMode::Particles => {
            *surface = Visibility::Hidden;
            *particles = Visibility::Visible;
        }
    }
}

pub fn display_mode_system(
    state: Res<EffectState>,
    mut surfaces: Query<&mut Visibility, (With<SurfaceRenderable>, Without<ParticleRenderable>)>,
    mut particles: Query<&mut Visibility, (With<ParticleRenderable>, Without<SurfaceRenderable>)>,
) {
    let (Ok(mut surface), Ok(mut particle)) = (surfaces.single_mut(), particles.single_mut())
    else {
        return;
    };
    apply_display_mode(state.mode, &mut surface, &mut particle);
}

/// Keep the clear color in step with the configured background.
pub fn apply_background(state: Res<EffectState>, mut clear_color: ResMut<ClearColor>) {
    if state.is_changed() {
        clear_color.0 = state.background;
    }
}
