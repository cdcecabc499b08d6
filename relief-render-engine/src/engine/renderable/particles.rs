use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::reflect::TypePath;
use bevy::render::mesh::PrimitiveTopology;
use bevy::render::render_resource::{
    AsBindGroup, Extent3d, ShaderRef, TextureDimension, TextureFormat,
};
use rand::Rng;

use constants::animation::{COLOR_LERP_FACTOR, POSITION_LERP_FACTOR};
use constants::field::{PARTICLE_HEIGHT_SCALE, SUBJECT_EXTENT};

use crate::engine::config::{DisplayMode, EffectState};
use crate::engine::core::clock::AnimationClock;
use crate::engine::field::luminance::BrightnessField;
use crate::engine::loading::subject_loader::Subject;

use super::distortion::{particle_phase, particle_target};

/// Marker for the particle renderable entity.
#[derive(Component)]
pub struct ParticleRenderable;

/// One particle record. `original_*` are immutable baselines captured at
/// subject load; `current_*` chase per-frame targets by exponential
/// smoothing, never by snapping.
#[derive(Debug, Clone, Copy)]
pub struct ParticleVertex {
    pub original_position: Vec3,
    pub current_position: Vec3,
    pub original_color: Vec3,
    pub current_color: Vec3,
}

/// Fixed-index arena of particle records, one per brightness-field sample.
/// The shader reads positions and colors from two data textures rewritten
/// from this arena every tick.
#[derive(Debug, Clone)]
pub struct ParticleArena {
    pub width: usize,
    pub height: usize,
    pub vertices: Vec<ParticleVertex>,
}

impl ParticleArena {
    /// Place one particle per field sample on the brightness-derived
    /// surface, centred on the origin and scaled to the subject extent.
    pub fn from_field(field: &BrightnessField) -> Self {
        let scale = SUBJECT_EXTENT / field.width.max(field.height) as f32;
        let half_w = field.width as f32 / 2.0;
        let half_h = field.height as f32 / 2.0;

        let mut vertices = Vec::with_capacity(field.width * field.height);
        for iy in 0..field.height {
            for ix in 0..field.width {
                let sample = field.sample(ix, iy);
                let position = Vec3::new(
                    (ix as f32 + 0.5 - half_w) * scale,
                    (half_h - iy as f32 - 0.5) * scale,
                    sample.brightness * PARTICLE_HEIGHT_SCALE,
                );
                let color = Vec3::new(sample.r, sample.g, sample.b);
                vertices.push(ParticleVertex {
                    original_position: position,
                    current_position: position,
                    original_color: color,
                    current_color: color,
                });
            }
        }

        Self {
            width: field.width,
            height: field.height,
            vertices,
        }
    }

    /// One animation tick: pick each particle's target for the current
    /// sub-mode and close a fixed fraction of the distance to it. Crossing a
    /// sub-mode boundary only redirects the target; the standing lerp masks
    /// the discontinuity.
    pub fn animate(
        &mut self,
        elapsed: f32,
        distortion: crate::engine::config::ParticleDistortion,
        rng: &mut impl Rng,
    ) {
        let phase = particle_phase(elapsed);
        for vertex in &mut self.vertices {
            let target = particle_target(
                phase,
                distortion,
                vertex.original_position,
                vertex.current_position,
                elapsed,
            );
            vertex.current_position = vertex.current_position.lerp(target, POSITION_LERP_FACTOR);

            let flicker = rng.gen_range(0.98..=1.0 / 0.98);
            let target_color =
                (vertex.original_color * flicker).clamp(Vec3::ZERO, Vec3::ONE);
            vertex.current_color = vertex.current_color.lerp(target_color, COLOR_LERP_FACTOR);
        }
    }

    /// Serialise current positions into an `Rgba32Float` texel buffer.
    pub fn write_position_data(&self, out: &mut [u8]) {
        let mut texels = Vec::with_capacity(self.vertices.len() * 4);
        for vertex in &self.vertices {
            texels.extend_from_slice(&[
                vertex.current_position.x,
                vertex.current_position.y,
                vertex.current_position.z,
                1.0,
            ]);
        }
        out.copy_from_slice(bytemuck::cast_slice(&texels));
    }

    /// Serialise current colors into an `Rgba32Float` texel buffer.
    pub fn write_color_data(&self, out: &mut [u8]) {
        let mut texels = Vec::with_capacity(self.vertices.len() * 4);
        for vertex in &self.vertices {
            texels.extend_from_slice(&[
                vertex.current_color.x,
                vertex.current_color.y,
                vertex.current_color.z,
                1.0,
            ]);
        }
        out.copy_from_slice(bytemuck::cast_slice(&texels));
    }

    /// Fresh data texture holding the arena's current positions.
    pub fn position_image(&self) -> Image {
        self.data_image(|v| v.current_position)
    }

    /// Fresh data texture holding the arena's current colors.
    pub fn color_image(&self) -> Image {
        self.data_image(|v| v.current_color)
    }

    fn data_image(&self, select: impl Fn(&ParticleVertex) -> Vec3) -> Image {
        let mut texels = Vec::with_capacity(self.vertices.len() * 4);
        for vertex in &self.vertices {
            let value = select(vertex);
            texels.extend_from_slice(&[value.x, value.y, value.z, 1.0]);
        }

        let mut image = Image::new(
            Extent3d {
                width: self.width as u32,
                height: self.height as u32,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            bytemuck::cast_slice(&texels).to_vec(),
            TextureFormat::Rgba32Float,
            RenderAssetUsages::default(),
        );
        image.sampler = bevy::image::ImageSampler::Descriptor(
            bevy::image::ImageSamplerDescriptor {
                mag_filter: bevy::image::ImageFilterMode::Nearest,
                min_filter: bevy::image::ImageFilterMode::Nearest,
                ..default()
            },
        );
        image
    }
}

/// Particle shader material. The vertex stage expands six dummy vertices per
/// particle into a camera-facing quad, fetching position and color by index
/// from the data textures.
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct ParticleCloudMaterial {
    #[texture(0)]
    #[sampler(1)]
    pub position_texture: Handle<Image>,

    #[texture(2)]
    #[sampler(3)]
    pub color_texture: Handle<Image>,

    /// [grid_width, grid_height, point_size, 0]
    #[uniform(4)]
    pub params: Vec4,
}

impl bevy::pbr::Material for ParticleCloudMaterial {
    fn vertex_shader() -> ShaderRef {
        "shaders/particle_cloud.wgsl".into()
    }

    fn fragment_shader() -> ShaderRef {
        "shaders/particle_cloud.wgsl".into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Blend
    }
}

/// Index mesh for GPU-side quad expansion: six vertices per particle whose
/// x attribute is the flat vertex index.
pub fn create_particle_index_mesh(particle_count: usize) -> Mesh {
    let vertex_count = particle_count * 6;
    let indices: Vec<[f32; 3]> = (0..vertex_count).map(|i| [i as f32, 0.0, 0.0]).collect();

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, indices);
    mesh
}

/// One particle tick: advance the arena and rewrite the data textures.
/// Runs only while the particle renderable is the attached one, so a
/// detached cloud resumes exactly where it left off.
pub fn animate_particles(
    state: Res<EffectState>,
    clock: Res<AnimationClock>,
    time: Res<Time>,
    subject: Option<ResMut<Subject>>,
    mut images: ResMut<Assets<Image>>,
) {
    let Some(mut subject) = subject else {
        return;
    };
    if state.mode != DisplayMode::Particles {
        return;
    }

    let elapsed = clock.elapsed(time.elapsed_secs());
    let mut rng = rand::thread_rng();
    let subject = &mut *subject;
    subject
        .particles
        .animate(elapsed, state.particle_distortion, &mut rng);

    if let Some(data) = images
        .get_mut(&subject.particle_position_image)
        .and_then(|image| image.data.as_mut())
    {
        subject.particles.write_position_data(data);
    }
    if let Some(data) = images
        .get_mut(&subject.particle_color_image)
        .and_then(|image| image.data.as_mut())
    {
        subject.particles.write_color_data(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::ParticleDistortion;
    use crate::engine::field::luminance::extract_with_target;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn test_field() -> BrightnessField {
        let mut data = Vec::new();
        for v in [0u8, 255, 128, 64] {
            data.extend_from_slice(&[v, v, v, 255]);
        }
        extract_with_target(2, 2, &data, 2).unwrap()
    }

    #[test]
    fn arena_has_one_particle_per_sample() {
        let arena = ParticleArena::from_field(&test_field());
        assert_eq!(arena.vertices.len(), 4);
        assert_eq!(arena.width, 2);
        assert_eq!(arena.height, 2);
    }

    #[test]
    fn heights_are_proportional_to_brightness() {
        let arena = ParticleArena::from_field(&test_field());
        let black = arena.vertices[0];
        let white = arena.vertices[1];
        assert_eq!(black.original_position.z, 0.0);
        assert!((white.original_position.z - PARTICLE_HEIGHT_SCALE).abs() < 1e-3);
    }

    #[test]
    fn checkerboard_heights_take_exactly_two_values() {
        let mut data = Vec::new();
        for y in 0..4u32 {
            for x in 0..4u32 {
                let v = if ((x / 2) + (y / 2)) % 2 == 0 { 255 } else { 0 };
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }
        let field = extract_with_target(4, 4, &data, 2).unwrap();
        let arena = ParticleArena::from_field(&field);
        let mut heights: Vec<f32> = arena
            .vertices
            .iter()
            .map(|v| v.original_position.z)
            .collect();
        heights.sort_by(f32::total_cmp);
        heights.dedup();
        assert_eq!(heights.len(), 2);
        assert_eq!(heights[0], 0.0);
        assert!((heights[1] - PARTICLE_HEIGHT_SCALE).abs() < 1e-3);
    }

    #[test]
    fn one_tick_moves_at_most_the_lerp_fraction_of_the_distance() {
        let mut arena = ParticleArena::from_field(&test_field());
        let mut rng = StdRng::seed_from_u64(7);

        // Pull everything toward the sphere first.
        for _ in 0..20 {
            arena.animate(1.0, ParticleDistortion::Sphere, &mut rng);
        }
        let before: Vec<Vec3> = arena.vertices.iter().map(|v| v.current_position).collect();

        // Switch distortion mid-animation; nothing may teleport.
        arena.animate(1.0, ParticleDistortion::NoiseFlow, &mut rng);

        for (i, vertex) in arena.vertices.iter().enumerate() {
            let target = particle_target(
                particle_phase(1.0),
                ParticleDistortion::NoiseFlow,
                vertex.original_position,
                before[i],
                1.0,
            );
            let moved = (vertex.current_position - before[i]).length();
            let allowed = POSITION_LERP_FACTOR * (target - before[i]).length();
            assert!(moved <= allowed + 1e-4);
        }
    }

    #[test]
    fn colors_drift_but_stay_anchored_to_the_original() {
        let mut arena = ParticleArena::from_field(&test_field());
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            arena.animate(0.5, ParticleDistortion::NoiseFlow, &mut rng);
        }
        for vertex in &arena.vertices {
            let drift = (vertex.current_color - vertex.original_color).length();
            assert!(drift < 0.1);
            assert!(vertex.current_color.min_element() >= 0.0);
            assert!(vertex.current_color.max_element() <= 1.0);
        }
    }

    #[test]
    fn data_buffers_match_texture_dimensions() {
        let arena = ParticleArena::from_field(&test_field());
        let image = arena.position_image();
        assert_eq!(image.width(), 2);
        assert_eq!(image.height(), 2);
        let expected = 2 * 2 * 4 * std::mem::size_of::<f32>();
        assert_eq!(image.data.as_ref().unwrap().len(), expected);

        let mut out = vec![0u8; expected];
        arena.write_position_data(&mut out);
        let floats: &[f32] = bytemuck::cast_slice(&out);
        assert_eq!(floats[2], arena.vertices[0].current_position.z);
    }

    #[test]
    fn index_mesh_expands_six_vertices_per_particle() {
        let mesh = create_particle_index_mesh(10);
        let positions = mesh
            .attribute(Mesh::ATTRIBUTE_POSITION)
            .and_then(|values| values.as_float3())
            .unwrap();
        assert_eq!(positions.len(), 60);
        assert_eq!(positions[59][0], 59.0);
    }
}
