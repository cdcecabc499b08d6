use bevy::asset::RenderAssetUsages;
use bevy::pbr::{Material, MaterialPipeline, MaterialPipelineKey};
use bevy::prelude::*;
use bevy::reflect::TypePath;
use bevy::render::mesh::{Indices, MeshVertexBufferLayoutRef, PrimitiveTopology};
use bevy::render::render_resource::{
    AsBindGroup, RenderPipelineDescriptor, ShaderRef, ShaderType, SpecializedMeshPipelineError,
};

use constants::animation::GROW_RAMP_SECONDS;
use constants::field::{SUBJECT_EXTENT, SURFACE_SEGMENTS};

use crate::engine::config::{BreatheParams, EffectState};
use crate::engine::core::clock::AnimationClock;
use crate::engine::field::displacement::DisplacementField;
use crate::engine::loading::subject_loader::Subject;
use crate::engine::math::smoothstep;

/// Marker for the surface renderable entity.
#[derive(Component)]
pub struct SurfaceRenderable;

/// Uniform block of the surface shader.
#[derive(Debug, Clone, Copy, ShaderType)]
pub struct ReliefParams {
    pub displacement_scale: f32,
    pub time: f32,
    pub breathe_waviness: f32,
    pub breathe_speed: f32,
    pub breathe_whole_body_movement: f32,
    pub breathe_tall_point_exaggeration: f32,
    pub breathe_noise_speed: f32,
    pub breathe_noise_amount: f32,
}

impl Default for ReliefParams {
    fn default() -> Self {
        let breathe = BreatheParams::default();
        Self {
            displacement_scale: 0.0,
            time: 0.0,
            breathe_waviness: breathe.waviness,
            breathe_speed: breathe.speed,
            breathe_whole_body_movement: breathe.whole_body_movement,
            breathe_tall_point_exaggeration: breathe.tall_point_exaggeration,
            breathe_noise_speed: breathe.noise_speed,
            breathe_noise_amount: breathe.noise_amount,
        }
    }
}

/// Surface shader material: the brightness raster displaces vertices, the
/// recolor target colors them.
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct ReliefSurfaceMaterial {
    #[texture(0)]
    #[sampler(1)]
    pub brightness_texture: Handle<Image>,

    #[texture(2)]
    #[sampler(3)]
    pub map: Handle<Image>,

    #[uniform(4)]
    pub params: ReliefParams,
}

impl Material for ReliefSurfaceMaterial {
    fn vertex_shader() -> ShaderRef {
        "shaders/relief_surface.wgsl".into()
    }

    fn fragment_shader() -> ShaderRef {
        "shaders/relief_surface.wgsl".into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Blend
    }

    fn specialize(
        _pipeline: &MaterialPipeline<Self>,
        descriptor: &mut RenderPipelineDescriptor,
        _layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        // The subject stays visible from behind while the camera orbits.
        descriptor.primitive.cull_mode = None;
        Ok(())
    }
}

/// Growth ramp for the in-shader displacement. Zero at subject load, then a
/// smoothstep up to `grow_length / max_brightness` over the ramp duration —
/// the division pins peak height to `grow_length` regardless of the
/// subject's dynamic range.
pub fn displacement_scale(elapsed: f32, grow_length: f32, max_brightness: f32) -> f32 {
    if max_brightness <= 0.0 {
        return 0.0;
    }
    smoothstep(0.0, GROW_RAMP_SECONDS, elapsed) * grow_length / max_brightness
}

/// Build the subject plane: a dense grid in the XY plane, displaced along +Z
/// in the vertex shader.
pub fn create_surface_mesh() -> Mesh {
    let segments = SURFACE_SEGMENTS;
    let vertex_side = segments + 1;

    let mut positions = Vec::with_capacity(vertex_side * vertex_side);
    let mut normals = Vec::with_capacity(vertex_side * vertex_side);
    let mut uvs = Vec::with_capacity(vertex_side * vertex_side);

    for iy in 0..vertex_side {
        for ix in 0..vertex_side {
            let u = ix as f32 / segments as f32;
            let v = iy as f32 / segments as f32;
            positions.push([
                (u - 0.5) * SUBJECT_EXTENT,
                (0.5 - v) * SUBJECT_EXTENT,
                0.0,
            ]);
            normals.push([0.0, 0.0, 1.0]);
            uvs.push([u, v]);
        }
    }

    let mut indices = Vec::with_capacity(segments * segments * 6);
    for iy in 0..segments {
        for ix in 0..segments {
            let a = (iy * vertex_side + ix) as u32;
            let b = a + 1;
            let c = a + vertex_side as u32;
            let d = c + 1;
            indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

/// Push the growth ramp and breathing parameters into the surface material.
pub fn animate_surface(
    state: Res<EffectState>,
    clock: Res<AnimationClock>,
    time: Res<Time>,
    subject: Option<Res<Subject>>,
    field: Option<Res<DisplacementField>>,
    mut materials: ResMut<Assets<ReliefSurfaceMaterial>>,
) {
    let (Some(subject), Some(field)) = (subject, field) else {
        return;
    };
    let Some(material) = materials.get_mut(&subject.surface_material) else {
        return;
    };

    let elapsed = clock.elapsed(time.elapsed_secs());
    material.params.displacement_scale =
        displacement_scale(elapsed, state.grow_length, field.max_brightness());
    material.params.time = elapsed;
    material.params.breathe_waviness = state.breathe.waviness;
    material.params.breathe_speed = state.breathe.speed;
    material.params.breathe_whole_body_movement = state.breathe.whole_body_movement;
    material.params.breathe_tall_point_exaggeration = state.breathe.tall_point_exaggeration;
    material.params.breathe_noise_speed = state.breathe.noise_speed;
    material.params.breathe_noise_amount = state.breathe.noise_amount;
}
