//! Error kinds shared by every stage of the control-image pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoseMaskError {
    /// A bone references a missing joint, or a joint lies outside the unit square.
    #[error("invalid skeleton: {0}")]
    InvalidSkeleton(String),
    /// A non-positive size, or an image with no pixels.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// The injected sprite generator reported a failure.
    #[error("sprite generation failed: {0}")]
    Generation(String),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PoseMaskError>;

/// Reject zero-valued sizes (resolution, radius, width).
pub(crate) fn require_positive(name: &str, value: u32) -> Result<u32> {
    if value == 0 {
        return Err(PoseMaskError::InvalidParameter(format!("{name} must be positive, got 0")));
    }
    Ok(value)
}
