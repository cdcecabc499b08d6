//! Per-frame post effects: brightness-keyed recoloring into an offscreen
//! target, and the film grain / scanline pass at the end of the frame.

/// Two-color duotone recolor.
pub mod duotone;

/// N-stop gradient recolor.
pub mod gradient;

/// The offscreen recolor pass shared by both effects.
pub mod recolor;

/// Fullscreen film grain / scanline node in the render graph.
pub mod film_grain;

/// BT.601 luma used by the recolor effects. The displacement field uses the
/// BT.709 weights instead; the split mirrors the source material exactly.
pub fn recolor_luma(r: f32, g: f32, b: f32) -> f32 {
    0.299 * r + 0.587 * g + 0.114 * b
}
