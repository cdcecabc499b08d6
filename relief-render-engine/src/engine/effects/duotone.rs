use bevy::prelude::*;

use crate::engine::math::smoothstep;

use super::recolor_luma;

/// Two-color mapper: luma is crushed through a smoothstep band, then blended
/// from the dark to the light color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuotoneParams {
    pub dark: Vec3,
    pub light: Vec3,
    pub crush: f32,
}

/// Map one source pixel (channels in [0, 1]) to its duotone color.
pub fn duotone_pixel(params: &DuotoneParams, r: f32, g: f32, b: f32) -> Vec3 {
    let grey = smoothstep(params.crush, 1.0 - params.crush, recolor_luma(r, g, b));
    params.dark.lerp(params.light, grey)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> DuotoneParams {
        DuotoneParams {
            dark: Vec3::ZERO,
            light: Vec3::ONE,
            crush: 0.0,
        }
    }

    #[test]
    fn black_maps_to_dark_and_white_to_light() {
        let p = params();
        assert_eq!(duotone_pixel(&p, 0.0, 0.0, 0.0), p.dark);
        assert_eq!(duotone_pixel(&p, 1.0, 1.0, 1.0), p.light);
    }

    #[test]
    fn output_is_monotonic_in_luma() {
        let p = params();
        let mut previous = -1.0f32;
        for i in 0..=20 {
            let v = i as f32 / 20.0;
            let out = duotone_pixel(&p, v, v, v).x;
            assert!(out >= previous);
            previous = out;
        }
    }

    #[test]
    fn crush_widens_the_pure_bands() {
        let soft = DuotoneParams {
            crush: 0.3,
            ..params()
        };
        // Luma 0.2 sits below the crushed band start, so it collapses to the
        // dark color even though it is not pure black.
        assert_eq!(duotone_pixel(&soft, 0.2, 0.2, 0.2), soft.dark);
        assert_eq!(duotone_pixel(&soft, 0.8, 0.8, 0.8), soft.light);
    }
}
