use bevy::prelude::*;

use crate::engine::field::displacement::normalize_brightness;

use super::recolor_luma;

/// Color at position `t` in [0, 1] along equally spaced stops, linearly
/// interpolated between the bracketing pair. With `transparency` on, alpha
/// fades in across the lowest segment.
pub fn gradient_color(stops: &[Vec3], transparency: bool, t: f32) -> Vec4 {
    match stops {
        [] => Vec4::new(0.0, 0.0, 0.0, 1.0),
        [only] => only.extend(1.0),
        _ => {
            let t = t.clamp(0.0, 1.0);
            let position = t * (stops.len() - 1) as f32;
            let low = (position.floor() as usize).min(stops.len() - 2);
            let amount = position - low as f32;

            let color = stops[low].lerp(stops[low + 1], amount);
            let alpha = if transparency && low == 0 { amount } else { 1.0 };
            color.extend(alpha)
        }
    }
}

/// Map one source pixel through the gradient, keyed by brightness normalized
/// against the subject's observed range.
pub fn gradient_pixel(
    stops: &[Vec3],
    transparency: bool,
    min_brightness: f32,
    max_brightness: f32,
    r: f32,
    g: f32,
    b: f32,
) -> Vec4 {
    let normalized = normalize_brightness(min_brightness, max_brightness, recolor_luma(r, g, b));
    gradient_color(stops, transparency, normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_stop_gradient_hits_endpoints_and_midpoint() {
        let stops = [Vec3::ZERO, Vec3::ONE];
        assert_eq!(gradient_color(&stops, false, 0.0), Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(gradient_color(&stops, false, 1.0), Vec4::new(1.0, 1.0, 1.0, 1.0));
        assert_eq!(gradient_color(&stops, false, 0.5), Vec4::new(0.5, 0.5, 0.5, 1.0));
    }

    #[test]
    fn multi_stop_gradient_brackets_correctly() {
        let stops = [
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        ];
        // t = 0.5 sits exactly on the middle stop.
        assert_eq!(gradient_color(&stops, false, 0.5), Vec4::new(0.0, 1.0, 0.0, 1.0));
        // t = 0.25 is halfway into the first segment.
        let quarter = gradient_color(&stops, false, 0.25);
        assert!((quarter.x - 0.5).abs() < 1e-6);
        assert!((quarter.y - 0.5).abs() < 1e-6);
        assert_eq!(quarter.z, 0.0);
    }

    #[test]
    fn transparency_fades_only_the_lowest_segment() {
        let stops = [Vec3::ZERO, Vec3::splat(0.5), Vec3::ONE];
        assert_eq!(gradient_color(&stops, true, 0.0).w, 0.0);
        assert!((gradient_color(&stops, true, 0.25).w - 0.5).abs() < 1e-6);
        assert_eq!(gradient_color(&stops, true, 0.75).w, 1.0);
        assert_eq!(gradient_color(&stops, true, 1.0).w, 1.0);
    }

    #[test]
    fn out_of_range_positions_clamp_to_the_ends() {
        let stops = [Vec3::ZERO, Vec3::ONE];
        assert_eq!(gradient_color(&stops, false, -3.0).truncate(), Vec3::ZERO);
        assert_eq!(gradient_color(&stops, false, 7.0).truncate(), Vec3::ONE);
    }

    #[test]
    fn gradient_pixel_normalizes_against_the_subject_range() {
        let stops = [Vec3::ZERO, Vec3::ONE];
        // The darkest pixel of a low-contrast subject still reaches the
        // bottom stop, and the brightest the top stop.
        let dark = gradient_pixel(&stops, false, 0.4, 0.6, 0.4, 0.4, 0.4);
        let bright = gradient_pixel(&stops, false, 0.4, 0.6, 0.6, 0.6, 0.6);
        assert!(dark.x < 1e-6);
        assert!((bright.x - 1.0).abs() < 1e-6);
    }
}
