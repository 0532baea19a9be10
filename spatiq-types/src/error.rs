use thiserror::Error;

/// Errors raised when constructing or converting bounds.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoundsError {
    #[error("bounds start ({start}) must not exceed end ({end})")]
    Inverted { start: f64, end: f64 },

    #[error("frame dimensions must be positive, got {width}x{height}")]
    EmptyFrame { width: u32, height: u32 },
}
