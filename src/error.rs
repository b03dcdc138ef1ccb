use diffrant_core::{BitDepth, PipelineError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Metadata parse error: {0}")]
    MetadataParse(#[from] serde_json::Error),

    #[error("Dump size mismatch: {width}x{height} at {depth} needs {expected} bytes, got {actual}")]
    SizeMismatch {
        width: u32,
        height: u32,
        depth: BitDepth,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid image: {0}")]
    Pipeline(#[from] PipelineError),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("SVG parse error: {0}")]
    SvgParse(String),

    #[error("Failed to allocate pixmap")]
    PixmapAllocation,

    #[error("PNG encode error: {0}")]
    PngEncode(String),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(#[from] PipelineError),
}
