use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use constants::animation::{AUTO_ROTATE_SPEED, CAMERA_SNAP_DISTANCE, CAMERA_TRANSITION_SPEED};
use constants::render_settings::{DIAGONAL_VIEW, FRONTAL_VIEW};

use crate::engine::config::EffectState;

/// Explicit viewpoints a transition can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraView {
    Frontal,
    Diagonal,
}

impl CameraView {
    pub fn target(self) -> Vec3 {
        match self {
            CameraView::Frontal => FRONTAL_VIEW,
            CameraView::Diagonal => DIAGONAL_VIEW,
        }
    }
}

/// Camera state driven every tick. A pending view transition takes priority;
/// otherwise the camera orbits the subject and leans with the pointer.
#[derive(Resource)]
pub struct ParallaxCamera {
    /// Authoritative position before the parallax lean is applied.
    pub position: Vec3,
    pub pending_view: Option<CameraView>,
    /// Smoothed parallax lean, radians yaw / world-unit lift.
    pub pointer_offset: Vec2,
    /// Pointer position in [-0.5, 0.5]² viewport coordinates.
    pub pointer: Vec2,
}

impl Default for ParallaxCamera {
    fn default() -> Self {
        Self {
            position: DIAGONAL_VIEW,
            pending_view: None,
            pointer_offset: Vec2::ZERO,
            pointer: Vec2::ZERO,
        }
    }
}

impl ParallaxCamera {
    pub fn go_frontal_view(&mut self) {
        self.pending_view = Some(CameraView::Frontal);
    }

    pub fn go_diagonal_view(&mut self) {
        self.pending_view = Some(CameraView::Diagonal);
    }
}

/// One step of an explicit transition. Snaps exactly onto the target once
/// within the snap distance; never overshoots on the way there.
pub fn step_toward(current: Vec3, target: Vec3, max_step: f32) -> (Vec3, bool) {
    let delta = target - current;
    let distance = delta.length();
    if distance < CAMERA_SNAP_DISTANCE {
        return (target, true);
    }
    let step = max_step.min(distance);
    (current + delta / distance * step, false)
}

/// Per-tick camera update. First in the frame order: transitions, then
/// ambient orbit and parallax, then the transform write.
pub fn camera_controller(
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mut parallax: ResMut<ParallaxCamera>,
    state: Res<EffectState>,
    time: Res<Time>,
    mut cursor_moved: EventReader<CursorMoved>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };

    // Track the pointer in centred viewport coordinates.
    if let Ok(window) = windows.single() {
        for cursor in cursor_moved.read() {
            parallax.pointer = Vec2::new(
                cursor.position.x / window.width() - 0.5,
                0.5 - cursor.position.y / window.height(),
            );
        }
    }

    let dt = time.delta_secs();

    if let Some(view) = parallax.pending_view {
        let (position, arrived) =
            step_toward(parallax.position, view.target(), CAMERA_TRANSITION_SPEED * dt);
        parallax.position = position;
        if arrived {
            parallax.pending_view = None;
        }
    } else {
        // Ambient orbit around the subject's vertical axis.
        let radial = parallax.position.truncate();
        let radius = radial.length();
        if radius > f32::EPSILON {
            let angle = radial.y.atan2(radial.x) + AUTO_ROTATE_SPEED * dt;
            parallax.position = Vec3::new(
                angle.cos() * radius,
                angle.sin() * radius,
                parallax.position.z,
            );
        }
    }

    // Parallax lean chases the pointer and relaxes back to centre.
    let target_offset = if state.parallax_enabled && state.parallax_responds_to_mouse {
        parallax.pointer * state.parallax_intensity
    } else {
        Vec2::ZERO
    };
    let gain = (state.parallax_return_speed * dt).clamp(0.0, 1.0);
    parallax.pointer_offset = parallax.pointer_offset.lerp(target_offset, gain);

    let leaned = Quat::from_rotation_z(parallax.pointer_offset.x) * parallax.position
        + Vec3::Z * (parallax.pointer_offset.y * 40.0);
    *camera_transform = Transform::from_translation(leaned).looking_at(Vec3::ZERO, Vec3::Z);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_never_overshoots() {
        let current = Vec3::new(150.0, 0.0, 150.0);
        let target = FRONTAL_VIEW;
        let (next, arrived) = step_toward(current, target, 10.0);
        assert!(!arrived);
        assert!((next - current).length() <= 10.0 + 1e-4);
        assert!((target - next).length() < (target - current).length());
    }

    #[test]
    fn transition_snaps_exactly_inside_the_threshold() {
        let target = FRONTAL_VIEW;
        let current = target + Vec3::new(0.5, 0.3, 0.0);
        let (next, arrived) = step_toward(current, target, 10.0);
        assert!(arrived);
        assert_eq!(next, target);
    }

    #[test]
    fn transition_converges_from_any_distance() {
        let mut position = DIAGONAL_VIEW;
        let target = FRONTAL_VIEW;
        let mut arrived = false;
        for _ in 0..200 {
            let (next, done) = step_toward(position, target, 5.0);
            position = next;
            if done {
                arrived = true;
                break;
            }
        }
        assert!(arrived);
        assert_eq!(position, target);
    }

    #[test]
    fn view_commands_queue_a_pending_transition() {
        let mut camera = ParallaxCamera::default();
        assert!(camera.pending_view.is_none());
        camera.go_frontal_view();
        assert_eq!(camera.pending_view, Some(CameraView::Frontal));
        camera.go_diagonal_view();
        assert_eq!(camera.pending_view, Some(CameraView::Diagonal));
    }
}
