use constants::field::FIELD_TARGET_WIDTH;

use crate::engine::loading::SubjectError;

/// One cell of the downsampled raster. Channels are in [0, 1]; the grid is
/// dense and row-major.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LuminanceSample {
    pub x: usize,
    pub y: usize,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub brightness: f32,
}

/// Downsampled brightness raster with the observed brightness range.
/// Invariant: `min_brightness <= sample.brightness <= max_brightness` for
/// every sample.
#[derive(Debug, Clone)]
pub struct BrightnessField {
    pub width: usize,
    pub height: usize,
    pub samples: Vec<LuminanceSample>,
    pub min_brightness: f32,
    pub max_brightness: f32,
}

impl BrightnessField {
    pub fn sample(&self, x: usize, y: usize) -> &LuminanceSample {
        &self.samples[y * self.width + x]
    }

    pub fn brightness_at(&self, x: usize, y: usize) -> f32 {
        self.sample(x, y).brightness
    }
}

/// ITU-R BT.709 luma. Displacement parity with the source material depends on
/// these exact weights.
pub fn luma_709(r: f32, g: f32, b: f32) -> f32 {
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// Extract a brightness field from an RGBA8 raster at the default target width.
pub fn extract(width: usize, height: usize, rgba: &[u8]) -> Result<BrightnessField, SubjectError> {
    extract_with_target(width, height, rgba, FIELD_TARGET_WIDTH)
}

/// Extract a brightness field resampled to `target_width` columns, with the
/// row count following the source aspect ratio.
pub fn extract_with_target(
    width: usize,
    height: usize,
    rgba: &[u8],
    target_width: usize,
) -> Result<BrightnessField, SubjectError> {
    if width == 0 || height == 0 {
        return Err(SubjectError::InvalidImage("source image has zero dimensions"));
    }
    if rgba.len() < width * height * 4 {
        return Err(SubjectError::InvalidImage(
            "pixel buffer is shorter than width * height",
        ));
    }

    let out_width = target_width.max(1);
    let out_height = ((height as f32 / width as f32) * out_width as f32)
        .round()
        .max(1.0) as usize;

    let mut samples = Vec::with_capacity(out_width * out_height);
    let mut min_brightness = 1.0f32;
    let mut max_brightness = 0.0f32;

    for y in 0..out_height {
        for x in 0..out_width {
            let u = (x as f32 + 0.5) / out_width as f32;
            let v = (y as f32 + 0.5) / out_height as f32;
            let [r, g, b] = sample_bilinear(width, height, rgba, u, v);
            let brightness = luma_709(r, g, b);
            min_brightness = min_brightness.min(brightness);
            max_brightness = max_brightness.max(brightness);
            samples.push(LuminanceSample {
                x,
                y,
                r,
                g,
                b,
                brightness,
            });
        }
    }

    Ok(BrightnessField {
        width: out_width,
        height: out_height,
        samples,
        min_brightness,
        max_brightness,
    })
}

/// Bilinear RGB sample of an RGBA8 raster at normalised centre-aligned
/// coordinates.
fn sample_bilinear(width: usize, height: usize, rgba: &[u8], u: f32, v: f32) -> [f32; 3] {
    let px = (u * width as f32 - 0.5).clamp(0.0, (width - 1) as f32);
    let py = (v * height as f32 - 0.5).clamp(0.0, (height - 1) as f32);

    let x0 = px.floor() as usize;
    let y0 = py.floor() as usize;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);

    let wx = px - x0 as f32;
    let wy = py - y0 as f32;

    let mut out = [0.0f32; 3];
    for (channel, value) in out.iter_mut().enumerate() {
        let c00 = channel_at(rgba, width, x0, y0, channel);
        let c10 = channel_at(rgba, width, x1, y0, channel);
        let c01 = channel_at(rgba, width, x0, y1, channel);
        let c11 = channel_at(rgba, width, x1, y1, channel);

        let top = c00 * (1.0 - wx) + c10 * wx;
        let bottom = c01 * (1.0 - wx) + c11 * wx;
        *value = top * (1.0 - wy) + bottom * wy;
    }
    out
}

#[inline]
fn channel_at(rgba: &[u8], width: usize, x: usize, y: usize, channel: usize) -> f32 {
    rgba[(y * width + x) * 4 + channel] as f32 / 255.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_image(width: usize, height: usize, rgba: [u8; 4]) -> Vec<u8> {
        rgba.repeat(width * height)
    }

    /// Checkerboard of `cell`-pixel squares of pure black and pure white.
    fn checkerboard(size: usize, cell: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(size * size * 4);
        for y in 0..size {
            for x in 0..size {
                let white = ((x / cell) + (y / cell)) % 2 == 0;
                let v = if white { 255 } else { 0 };
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }
        data
    }

    #[test]
    fn zero_dimension_image_is_rejected() {
        assert!(matches!(
            extract(0, 4, &[]),
            Err(SubjectError::InvalidImage(_))
        ));
        assert!(matches!(
            extract(4, 0, &[]),
            Err(SubjectError::InvalidImage(_))
        ));
    }

    #[test]
    fn truncated_buffer_is_rejected() {
        let data = solid_image(4, 4, [10, 20, 30, 255]);
        assert!(matches!(
            extract(4, 8, &data),
            Err(SubjectError::InvalidImage(_))
        ));
    }

    #[test]
    fn min_never_exceeds_max() {
        let mut data = solid_image(8, 8, [40, 80, 120, 255]);
        data[0] = 250;
        data[5 * 4] = 0;
        let field = extract_with_target(8, 8, &data, 8).unwrap();
        assert!(field.min_brightness <= field.max_brightness);
        for sample in &field.samples {
            assert!(sample.brightness >= field.min_brightness);
            assert!(sample.brightness <= field.max_brightness);
        }
    }

    #[test]
    fn flat_image_collapses_the_range() {
        let data = solid_image(2, 2, [128, 128, 128, 255]);
        let field = extract_with_target(2, 2, &data, 2).unwrap();
        assert_eq!(field.min_brightness, field.max_brightness);
        let expected = 128.0 / 255.0;
        assert!((field.max_brightness - expected).abs() < 1e-6);
    }

    #[test]
    fn bt709_weights_are_exact() {
        let red = extract_with_target(2, 2, &solid_image(2, 2, [255, 0, 0, 255]), 2).unwrap();
        let green = extract_with_target(2, 2, &solid_image(2, 2, [0, 255, 0, 255]), 2).unwrap();
        let blue = extract_with_target(2, 2, &solid_image(2, 2, [0, 0, 255, 255]), 2).unwrap();
        assert!((red.max_brightness - 0.2126).abs() < 1e-6);
        assert!((green.max_brightness - 0.7152).abs() < 1e-6);
        assert!((blue.max_brightness - 0.0722).abs() < 1e-6);
    }

    #[test]
    fn field_follows_aspect_ratio() {
        let data = solid_image(64, 32, [90, 90, 90, 255]);
        let field = extract_with_target(64, 32, &data, 16).unwrap();
        assert_eq!(field.width, 16);
        assert_eq!(field.height, 8);
        assert_eq!(field.samples.len(), 16 * 8);
    }

    #[test]
    fn grid_is_dense_and_row_major() {
        let data = solid_image(8, 8, [10, 10, 10, 255]);
        let field = extract_with_target(8, 8, &data, 4).unwrap();
        for (i, sample) in field.samples.iter().enumerate() {
            assert_eq!(sample.x, i % field.width);
            assert_eq!(sample.y, i / field.width);
        }
    }

    #[test]
    fn checkerboard_keeps_exactly_two_brightness_values() {
        // 256x256 board of 2x2-pixel cells halved to a 128-wide field: every
        // output sample lands inside a single cell, so only pure black and
        // pure white survive the resample.
        let data = checkerboard(256, 2);
        let field = extract_with_target(256, 256, &data, 128).unwrap();
        assert_eq!(field.width, 128);
        assert_eq!(field.height, 128);
        let white = luma_709(1.0, 1.0, 1.0);
        for sample in &field.samples {
            assert!(
                sample.brightness == 0.0 || sample.brightness == white,
                "unexpected brightness {}",
                sample.brightness
            );
        }
        assert_eq!(field.min_brightness, 0.0);
        assert_eq!(field.max_brightness, white);
        assert!((white - 1.0).abs() < 1e-6);
    }
}
