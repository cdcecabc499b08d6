//! Application assembly and the subject-relative animation clock.

/// App construction, plugin wiring and the per-tick system order.
pub mod app_setup;

/// Wall-clock anchor for subject-relative animation time.
pub mod clock;
