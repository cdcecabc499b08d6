use bevy::asset::AssetMetaCheck;
use bevy::pbr::MaterialPlugin;
use bevy::prelude::*;
use bevy::window::PresentMode;
use bevy_common_assets::json::JsonAssetPlugin;

use constants::render_settings::GRAIN_SETTINGS;

use crate::engine::camera::parallax_camera::{ParallaxCamera, camera_controller};
use crate::engine::config::EffectState;
use crate::engine::core::clock::AnimationClock;
use crate::engine::effects::film_grain::{GrainPostProcessPlugin, update_grain_settings};
use crate::engine::effects::recolor::render_recolor_targets;
use crate::engine::loading::catalog::SubjectCatalog;
use crate::engine::loading::subject_loader::{
    SubjectLoader, build_subject_when_ready, load_default_subject,
};
use crate::engine::renderable::particles::{ParticleCloudMaterial, animate_particles};
use crate::engine::renderable::surface::{ReliefSurfaceMaterial, animate_surface};
use crate::engine::systems::display_mode::{apply_background, display_mode_system};
use crate::engine::systems::input::input_system;
use crate::rpc::web_rpc::WebRpcPlugin;

/// Build the application: plugins, resources, and the strict per-tick order
/// camera -> renderable animation -> recolor pass, ahead of the main render.
pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .add_plugins(MaterialPlugin::<ReliefSurfaceMaterial>::default())
        .add_plugins(MaterialPlugin::<ParticleCloudMaterial>::default())
        .add_plugins(JsonAssetPlugin::<SubjectCatalog>::new(&["json"]))
        .add_plugins(GrainPostProcessPlugin)
        .add_plugins(WebRpcPlugin);

    app.init_resource::<EffectState>()
        .init_resource::<AnimationClock>()
        .init_resource::<ParallaxCamera>()
        .insert_resource(ClearColor(Color::WHITE))
        .add_systems(Startup, setup)
        .add_systems(
            Update,
            (
                camera_controller,
                animate_surface,
                animate_particles,
                render_recolor_targets,
            )
                .chain(),
        )
        .add_systems(
            Update,
            (
                load_default_subject,
                build_subject_when_ready,
                input_system,
                display_mode_system,
                apply_background,
                update_grain_settings,
            ),
        );

    app
}

/// Spawn the camera carrying the grain pass settings and start the catalog
/// load. No subject yet is a valid steady state; the loop renders only the
/// background until one arrives.
fn setup(mut commands: Commands, asset_server: Res<AssetServer>) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(constants::render_settings::DIAGONAL_VIEW)
            .looking_at(Vec3::ZERO, Vec3::Z),
        GRAIN_SETTINGS,
    ));

    commands.insert_resource(SubjectLoader {
        catalog: asset_server.load("subjects/catalog.json"),
        ..default()
    });
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}

fn create_window_config() -> Window {
    #[cfg(target_arch = "wasm32")]
    {
        Window {
            canvas: Some("#relief".into()),
            fit_canvas_to_parent: true,
            prevent_default_event_handling: false,
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Window {
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }
}
