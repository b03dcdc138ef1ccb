use crate::error::LoadError;
use diffrant_core::ImageMetadata;
use std::path::Path;

/// Parse and validate a metadata sidecar
pub fn parse_metadata(content: &str) -> Result<ImageMetadata, LoadError> {
    let metadata: ImageMetadata = serde_json::from_str(content)?;
    metadata.validate()?;
    Ok(metadata)
}

/// Load the JSON metadata sidecar at `path`
pub fn load_metadata(path: &Path) -> Result<ImageMetadata, LoadError> {
    let content = std::fs::read_to_string(path)?;
    let metadata = parse_metadata(&content)?;
    tracing::info!(
        path = %path.display(),
        panel = ?metadata.panel_size,
        depth = %metadata.image_depth,
        energy_kev = ?metadata.beam_energy_kev,
        "Loaded metadata"
    );
    Ok(metadata)
}
