//! Error type for the diffrant-core pipeline.
//!
//! Everything here is a precondition or configuration failure detected at the
//! boundary. Data conditions (degenerate exposure windows, fully masked
//! images, missing beam energy) are not errors and never surface as one.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("zoom must be a positive finite number, got {0}")]
    InvalidZoom(f64),

    #[error("canvas must have non-zero dimensions, got {width}x{height}")]
    EmptyCanvas { width: u32, height: u32 },

    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("sample count mismatch: expected {expected}, got {actual}")]
    SampleCountMismatch { expected: usize, actual: usize },

    #[error("unsupported bit depth: {0} (expected 8, 16 or 32)")]
    UnsupportedDepth(u32),

    #[error("unknown colormap: {0}")]
    UnknownColormap(String),

    #[error("unknown downsample mode: {0}")]
    UnknownDownsampleMode(String),

    #[error("histogram needs at least one bin")]
    ZeroBins,

    #[error("invalid detector geometry: {0}")]
    InvalidGeometry(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
