//! Subject lifecycle: the built-in catalog, image load tracking, and the
//! atomic swap that replaces one subject with the next.

use thiserror::Error;

/// Named catalog of built-in subject images.
pub mod catalog;

/// Pending-load tracking and subject construction.
pub mod subject_loader;

/// Failures during subject construction. All are local and recoverable: the
/// reload aborts, the previous subject stays on screen, the tick loop keeps
/// running.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubjectError {
    #[error("invalid source image: {0}")]
    InvalidImage(&'static str),

    #[error("resource allocation failed: {0}")]
    ResourceAllocation(&'static str),
}
