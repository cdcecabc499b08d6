use bevy::prelude::*;

use crate::engine::config::EffectState;
use crate::engine::field::displacement::DisplacementField;
use crate::engine::loading::subject_loader::Subject;

use super::duotone::{DuotoneParams, duotone_pixel};
use super::gradient::gradient_pixel;

/// Which recolor variant the current configuration selects. Gradient wins
/// when both are enabled; neither enabled is an exact passthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecolorVariant {
    Gradient,
    Duotone,
    Passthrough,
}

fn select_variant(state: &EffectState) -> RecolorVariant {
    if state.gradient_enabled && state.gradient_stops.len() >= 2 {
        RecolorVariant::Gradient
    } else if state.duotone_enabled {
        RecolorVariant::Duotone
    } else {
        RecolorVariant::Passthrough
    }
}

/// Run the active recolor over `src` (RGBA8) into `dst`. A disabled effect
/// copies bytes verbatim, which keeps the A/B toggle a correctness no-op.
pub fn render_recolor(
    state: &EffectState,
    min_brightness: f32,
    max_brightness: f32,
    src: &[u8],
    dst: &mut [u8],
) {
    let pixels = src.len().min(dst.len()) / 4;

    match select_variant(state) {
        RecolorVariant::Passthrough => {
            dst[..pixels * 4].copy_from_slice(&src[..pixels * 4]);
        }
        RecolorVariant::Duotone => {
            let params = DuotoneParams {
                dark: state.duotone_dark,
                light: state.duotone_light,
                crush: state.duotone_crush,
            };
            for i in 0..pixels {
                let [r, g, b] = read_rgb(src, i);
                let out = duotone_pixel(&params, r, g, b);
                write_rgba(dst, i, out.extend(1.0));
            }
        }
        RecolorVariant::Gradient => {
            for i in 0..pixels {
                let [r, g, b] = read_rgb(src, i);
                let out = gradient_pixel(
                    &state.gradient_stops,
                    state.gradient_transparency,
                    min_brightness,
                    max_brightness,
                    r,
                    g,
                    b,
                );
                write_rgba(dst, i, out);
            }
        }
    }
}

#[inline]
fn read_rgb(src: &[u8], pixel: usize) -> [f32; 3] {
    let i = pixel * 4;
    [
        src[i] as f32 / 255.0,
        src[i + 1] as f32 / 255.0,
        src[i + 2] as f32 / 255.0,
    ]
}

#[inline]
fn write_rgba(dst: &mut [u8], pixel: usize, rgba: Vec4) {
    let i = pixel * 4;
    dst[i] = (rgba.x.clamp(0.0, 1.0) * 255.0).round() as u8;
    dst[i + 1] = (rgba.y.clamp(0.0, 1.0) * 255.0).round() as u8;
    dst[i + 2] = (rgba.z.clamp(0.0, 1.0) * 255.0).round() as u8;
    dst[i + 3] = (rgba.w.clamp(0.0, 1.0) * 255.0).round() as u8;
}

/// Refresh the offscreen recolor target. Runs inside the tick, before the
/// main draw; change detection on the configuration and the subject keeps
/// the target current without repainting a static frame.
pub fn render_recolor_targets(
    state: Res<EffectState>,
    subject: Option<Res<Subject>>,
    field: Option<Res<DisplacementField>>,
    mut images: ResMut<Assets<Image>>,
) {
    let (Some(subject), Some(field)) = (subject, field) else {
        return;
    };
    if !state.is_changed() && !subject.is_changed() {
        return;
    }

    let Some(src) = images
        .get(&subject.base_image)
        .and_then(|image| image.data.clone())
    else {
        warn!("recolor skipped: base image has no CPU-side data");
        return;
    };

    let Some(dst) = images
        .get_mut(&subject.recolor_image)
        .and_then(|image| image.data.as_mut())
    else {
        warn!("recolor skipped: target image has no CPU-side data");
        return;
    };

    render_recolor(
        &state,
        field.min_brightness(),
        field.max_brightness(),
        &src,
        dst,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::EffectState;

    fn source_pixels() -> Vec<u8> {
        vec![
            0, 0, 0, 255, //
            255, 255, 255, 255, //
            200, 40, 90, 128, //
            17, 93, 211, 7,
        ]
    }

    #[test]
    fn disabled_effects_are_pixel_exact_passthrough() {
        let state = EffectState::default();
        let src = source_pixels();
        let mut dst = vec![0u8; src.len()];
        render_recolor(&state, 0.0, 1.0, &src, &mut dst);
        assert_eq!(src, dst);
    }

    #[test]
    fn gradient_takes_priority_over_duotone() {
        let mut state = EffectState::default();
        state.duotone_enabled = true;
        state.gradient_enabled = true;
        state.gradient_stops = vec![Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)];
        let src = source_pixels();
        let mut dst = vec![0u8; src.len()];
        render_recolor(&state, 0.0, 1.0, &src, &mut dst);
        // Every output pixel is the constant gradient color.
        for pixel in dst.chunks_exact(4) {
            assert_eq!(pixel, [255, 0, 0, 255]);
        }
    }

    #[test]
    fn duotone_recolors_black_and_white_to_the_pole_colors() {
        let mut state = EffectState::default();
        state.duotone_enabled = true;
        state.duotone_dark = Vec3::new(0.0, 0.0, 1.0);
        state.duotone_light = Vec3::new(1.0, 1.0, 0.0);
        let src = source_pixels();
        let mut dst = vec![0u8; src.len()];
        render_recolor(&state, 0.0, 1.0, &src, &mut dst);
        assert_eq!(&dst[0..4], [0, 0, 255, 255]);
        assert_eq!(&dst[4..8], [255, 255, 0, 255]);
    }

    #[test]
    fn gradient_alpha_fade_reaches_the_output_buffer() {
        let mut state = EffectState::default();
        state.gradient_enabled = true;
        state.gradient_transparency = true;
        state.gradient_stops = vec![Vec3::ZERO, Vec3::ONE];
        let src = source_pixels();
        let mut dst = vec![0u8; src.len()];
        render_recolor(&state, 0.0, 1.0, &src, &mut dst);
        // Pure black sits at the bottom stop: fully transparent.
        assert_eq!(dst[3], 0);
        // Pure white is out of the fade segment: fully opaque.
        assert_eq!(dst[7], 255);
    }
}
