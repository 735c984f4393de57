//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::FrameId;

/// Domain errors represent invalid geometry or request values.
/// These are independent of registry and I/O concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("frame has non-finite position or dimension: {0}")]
    NonFiniteGeometry(FrameId),

    #[error("frame has negative dimension: {0}")]
    NegativeDimension(FrameId),

    #[error("spacing must be a finite, non-negative number, got {0}")]
    InvalidSpacing(f64),

    #[error("confidence threshold must be in (0, 1], got {0}")]
    InvalidThreshold(f64),
}
