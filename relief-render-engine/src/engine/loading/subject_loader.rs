use bevy::asset::{LoadState, RenderAssetUsages};
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy::render::view::NoFrustumCulling;

use crate::engine::config::{DisplayMode, EffectState};
use crate::engine::core::clock::AnimationClock;
use crate::engine::field::displacement::DisplacementField;
use crate::engine::field::luminance::extract;
use crate::engine::renderable::particles::{
    ParticleArena, ParticleCloudMaterial, ParticleRenderable, create_particle_index_mesh,
};
use crate::engine::renderable::surface::{
    ReliefParams, ReliefSurfaceMaterial, SurfaceRenderable, create_surface_mesh,
};
use crate::rpc::web_rpc::WebRpcInterface;

use super::SubjectError;
use super::catalog::SubjectCatalog;

/// Everything owned by the active subject. Entities and GPU resources are
/// released only after a replacement has been fully constructed, so a failed
/// reload never leaves a half-swapped scene.
#[derive(Resource)]
pub struct Subject {
    pub base_image: Handle<Image>,
    pub brightness_image: Handle<Image>,
    pub recolor_image: Handle<Image>,
    pub particle_position_image: Handle<Image>,
    pub particle_color_image: Handle<Image>,
    pub surface_material: Handle<ReliefSurfaceMaterial>,
    pub particle_material: Handle<ParticleCloudMaterial>,
    pub surface_entity: Entity,
    pub particle_entity: Entity,
    pub particles: ParticleArena,
}

/// Pending-load state. `pending` always holds the most recently requested
/// image: a newer request simply overwrites an in-flight one, so the last
/// request wins and stale loads are never swapped in.
#[derive(Resource, Default)]
pub struct SubjectLoader {
    pub pending: Option<Handle<Image>>,
    pub catalog: Handle<SubjectCatalog>,
    pub default_requested: bool,
}

impl SubjectLoader {
    pub fn request(&mut self, asset_server: &AssetServer, path: &str) {
        info!("Subject requested: {path}");
        self.pending = Some(asset_server.load(path.to_string()));
    }
}

/// Kick off the catalog's first entry once the catalog itself has loaded.
/// Before that (and after a failed load) the loop keeps rendering the
/// background only, which is a valid steady state.
pub fn load_default_subject(
    mut loader: ResMut<SubjectLoader>,
    catalogs: Res<Assets<SubjectCatalog>>,
    asset_server: Res<AssetServer>,
) {
    if loader.default_requested {
        return;
    }
    let Some(catalog) = catalogs.get(&loader.catalog) else {
        return;
    };
    match catalog.default_entry() {
        Some(entry) => {
            let path = entry.path.clone();
            info!("Loading default subject '{}'", entry.name);
            loader.request(&asset_server, &path);
        }
        None => warn!("Subject catalog is empty; waiting for an external request"),
    }
    loader.default_requested = true;
}

/// Watch the pending image and rebuild the subject once it has decoded.
/// Construction is new-before-old: the previous subject is despawned and its
/// textures released only after every replacement resource exists.
pub fn build_subject_when_ready(
    mut commands: Commands,
    mut loader: ResMut<SubjectLoader>,
    asset_server: Res<AssetServer>,
    state: Res<EffectState>,
    time: Res<Time>,
    mut clock: ResMut<AnimationClock>,
    mut images: ResMut<Assets<Image>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut surface_materials: ResMut<Assets<ReliefSurfaceMaterial>>,
    mut particle_materials: ResMut<Assets<ParticleCloudMaterial>>,
    mut rpc: ResMut<WebRpcInterface>,
    subject: Option<Res<Subject>>,
) {
    let Some(pending) = loader.pending.clone() else {
        return;
    };

    match asset_server.get_load_state(&pending) {
        Some(LoadState::Loaded) => {}
        Some(LoadState::Failed(err)) => {
            error!("Subject image failed to load: {err}");
            rpc.send_notification(
                "subject_load_failed",
                serde_json::json!({ "reason": err.to_string() }),
            );
            loader.pending = None;
            return;
        }
        _ => return,
    }

    let Some(base) = images.get(&pending) else {
        return;
    };

    let built = match build_subject_data(base) {
        Ok(built) => built,
        Err(err) => {
            // The reload aborts here; the prior subject stays intact.
            error!("Subject rebuild aborted: {err}");
            rpc.send_notification(
                "subject_load_failed",
                serde_json::json!({ "reason": err.to_string() }),
            );
            loader.pending = None;
            return;
        }
    };

    let brightness_image = images.add(built.brightness);
    let recolor_image = images.add(built.recolor);
    let particle_position_image = images.add(built.positions);
    let particle_color_image = images.add(built.colors);

    let surface_material = surface_materials.add(ReliefSurfaceMaterial {
        brightness_texture: brightness_image.clone(),
        map: recolor_image.clone(),
        params: ReliefParams::default(),
    });
    let particle_material = particle_materials.add(ParticleCloudMaterial {
        position_texture: particle_position_image.clone(),
        color_texture: particle_color_image.clone(),
        params: Vec4::new(
            built.arena.width as f32,
            built.arena.height as f32,
            3.0,
            0.0,
        ),
    });

    let (surface_visibility, particle_visibility) = match state.mode {
        DisplayMode::Surface => (Visibility::Visible, Visibility::Hidden),
        DisplayMode::Particles => (Visibility::Hidden, Visibility::Visible),
    };

    let surface_entity = commands
        .spawn((
            Mesh3d(meshes.add(create_surface_mesh())),
            MeshMaterial3d(surface_material.clone()),
            Transform::IDENTITY,
            surface_visibility,
            NoFrustumCulling,
            SurfaceRenderable,
        ))
        .id();

    let particle_entity = commands
        .spawn((
            Mesh3d(meshes.add(create_particle_index_mesh(built.arena.vertices.len()))),
            MeshMaterial3d(particle_material.clone()),
            Transform::IDENTITY,
            particle_visibility,
            NoFrustumCulling,
            ParticleRenderable,
        ))
        .id();

    // The replacement is complete; only now release the previous subject.
    if let Some(old) = subject {
        commands.entity(old.surface_entity).despawn();
        commands.entity(old.particle_entity).despawn();
        if old.base_image != pending {
            images.remove(&old.base_image);
        }
        images.remove(&old.brightness_image);
        images.remove(&old.recolor_image);
        images.remove(&old.particle_position_image);
        images.remove(&old.particle_color_image);
        surface_materials.remove(&old.surface_material);
        particle_materials.remove(&old.particle_material);
    }

    let (field_width, field_height) = (built.field.width(), built.field.height());
    commands.insert_resource(built.field);
    commands.insert_resource(Subject {
        base_image: pending,
        brightness_image,
        recolor_image,
        particle_position_image,
        particle_color_image,
        surface_material,
        particle_material,
        surface_entity,
        particle_entity,
        particles: built.arena,
    });

    clock.restart(time.elapsed_secs());
    loader.pending = None;

    info!("Subject ready: {field_width}x{field_height} brightness field");
    rpc.send_notification(
        "subject_loaded",
        serde_json::json!({
            "field_width": field_width,
            "field_height": field_height,
        }),
    );
}

struct BuiltSubject {
    field: DisplacementField,
    arena: ParticleArena,
    brightness: Image,
    recolor: Image,
    positions: Image,
    colors: Image,
}

/// Derive every subject resource from the decoded base image. Pure with
/// respect to the ECS: nothing is spawned or registered until this succeeds.
fn build_subject_data(base: &Image) -> Result<BuiltSubject, SubjectError> {
    let width = base.width() as usize;
    let height = base.height() as usize;
    let format = base.texture_descriptor.format;
    if format != TextureFormat::Rgba8UnormSrgb && format != TextureFormat::Rgba8Unorm {
        return Err(SubjectError::InvalidImage("subject must decode to RGBA8"));
    }
    let data = base.data.as_ref().ok_or(SubjectError::ResourceAllocation(
        "source image kept no CPU-side pixel data",
    ))?;

    let field = extract(width, height, data)?;
    let arena = ParticleArena::from_field(&field);
    let field = DisplacementField::new(field);

    let brightness = field.to_brightness_image();
    let positions = arena.position_image();
    let colors = arena.color_image();

    // The recolor target starts as an exact copy of the source, which is
    // also what a disabled recolor pass keeps writing into it.
    let recolor = Image::new(
        Extent3d {
            width: width as u32,
            height: height as u32,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data.clone(),
        format,
        RenderAssetUsages::default(),
    );

    Ok(BuiltSubject {
        field,
        arena,
        brightness,
        recolor,
        positions,
        colors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba_image(width: u32, height: u32) -> Image {
        let data = vec![128u8; (width * height * 4) as usize];
        Image::new(
            Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            data,
            TextureFormat::Rgba8UnormSrgb,
            RenderAssetUsages::default(),
        )
    }

    #[test]
    fn build_derives_every_subject_resource() {
        let built = build_subject_data(&rgba_image(8, 4)).unwrap();
        assert_eq!(built.field.width(), 256);
        assert_eq!(built.field.height(), 128);
        assert_eq!(
            built.arena.vertices.len(),
            built.field.width() * built.field.height()
        );
        assert_eq!(built.recolor.width(), 8);
        assert_eq!(built.brightness.width(), 256);
        assert_eq!(built.positions.width(), 256);
    }

    #[test]
    fn unsupported_format_is_rejected_before_any_allocation() {
        let mut image = rgba_image(4, 4);
        image.texture_descriptor.format = TextureFormat::R32Float;
        assert!(matches!(
            build_subject_data(&image),
            Err(SubjectError::InvalidImage(_))
        ));
    }

    #[test]
    fn recolor_target_starts_as_an_exact_copy() {
        let base = rgba_image(4, 4);
        let built = build_subject_data(&base).unwrap();
        assert_eq!(built.recolor.data, base.data);
    }

    #[test]
    fn most_recent_request_wins() {
        // Two back-to-back requests: only the second handle stays pending.
        let mut loader = SubjectLoader::default();
        let first = Handle::<Image>::default();
        loader.pending = Some(first.clone());
        let second = Handle::<Image>::weak_from_u128(42);
        loader.pending = Some(second.clone());
        assert_eq!(loader.pending, Some(second));
        assert_ne!(loader.pending, Some(first));
    }
}
