use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

use crate::engine::math::smoothstep;

use super::luminance::BrightnessField;

/// Brightness range mapped onto [0, 1] with a smoothstep, so over- and
/// under-exposed subjects still span the full output range. A flat image
/// (`min == max`) maps to 0 everywhere; the raw formula would divide by zero.
pub fn normalize_brightness(min: f32, max: f32, brightness: f32) -> f32 {
    if max <= min {
        return 0.0;
    }
    smoothstep(min, max, brightness)
}

/// The extracted raster wrapped as a displacement and recolor driver.
///
/// Raw brightness drives geometry displacement (the growth ramp divides by
/// `max_brightness`, so peak height is contrast-independent); normalized
/// brightness drives recoloring.
#[derive(Resource, Debug, Clone)]
pub struct DisplacementField {
    field: BrightnessField,
}

impl DisplacementField {
    pub fn new(field: BrightnessField) -> Self {
        Self { field }
    }

    pub fn field(&self) -> &BrightnessField {
        &self.field
    }

    pub fn width(&self) -> usize {
        self.field.width
    }

    pub fn height(&self) -> usize {
        self.field.height
    }

    pub fn min_brightness(&self) -> f32 {
        self.field.min_brightness
    }

    pub fn max_brightness(&self) -> f32 {
        self.field.max_brightness
    }

    /// Raw brightness of a grid cell.
    pub fn brightness_at(&self, x: usize, y: usize) -> f32 {
        self.field.brightness_at(x, y)
    }

    /// Normalized brightness of a grid cell: `min -> 0`, `max -> 1`,
    /// monotonic in between.
    pub fn normalized_brightness_at(&self, x: usize, y: usize) -> f32 {
        normalize_brightness(
            self.field.min_brightness,
            self.field.max_brightness,
            self.field.brightness_at(x, y),
        )
    }

    /// Raw brightness at normalised coordinates, bilinearly filtered between
    /// grid cells.
    pub fn brightness_uv(&self, u: f32, v: f32) -> f32 {
        let width = self.field.width;
        let height = self.field.height;

        let px = (u.clamp(0.0, 1.0) * (width - 1) as f32).min((width - 1) as f32);
        let py = (v.clamp(0.0, 1.0) * (height - 1) as f32).min((height - 1) as f32);

        let x0 = px.floor() as usize;
        let y0 = py.floor() as usize;
        let x1 = (x0 + 1).min(width - 1);
        let y1 = (y0 + 1).min(height - 1);

        let wx = px - x0 as f32;
        let wy = py - y0 as f32;

        let top = self.field.brightness_at(x0, y0) * (1.0 - wx)
            + self.field.brightness_at(x1, y0) * wx;
        let bottom = self.field.brightness_at(x0, y1) * (1.0 - wx)
            + self.field.brightness_at(x1, y1) * wx;
        top * (1.0 - wy) + bottom * wy
    }

    /// Normalized brightness at normalised coordinates.
    pub fn normalized_brightness_uv(&self, u: f32, v: f32) -> f32 {
        normalize_brightness(
            self.field.min_brightness,
            self.field.max_brightness,
            self.brightness_uv(u, v),
        )
    }

    /// Bake the raster into a filterable single-channel texture; the surface
    /// vertex shader samples it as the in-shader displacement source.
    pub fn to_brightness_image(&self) -> Image {
        let data: Vec<u8> = self
            .field
            .samples
            .iter()
            .map(|s| (s.brightness * 255.0).round() as u8)
            .collect();

        Image::new(
            Extent3d {
                width: self.field.width as u32,
                height: self.field.height as u32,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            data,
            TextureFormat::R8Unorm,
            RenderAssetUsages::default(),
        )
    }
}
