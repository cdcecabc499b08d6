//! Systems applying the external configuration to the scene each tick.

/// Surface/particles attachment switch and background color application.
pub mod display_mode;

/// Native keyboard shortcuts mutating the effect state.
pub mod input;
