//! Test fixtures: synthetic detector images written to a temp directory.

use diffrant::loaders::raw::encode_u16;
use std::path::PathBuf;
use tempfile::TempDir;

/// Panel edge in pixels
pub const PANEL: u32 = 64;

/// Samples at or above this value are masked
pub const TRUSTED_MAX: u32 = 60_000;

/// Value written to the masked stripe in [`panel_samples`]
pub const MASKED_VALUE: u16 = 65_535;

/// Metadata sidecar for a square panel with the beam in the middle
pub fn metadata_json(energy_kev: Option<f64>) -> String {
    let energy = match energy_kev {
        Some(e) => format!(r#", "beam_energy_kev": {e}"#),
        None => String::new(),
    };
    format!(
        r#"{{
    "beam_center": [32.0, 32.0],
    "pixel_size": 0.172,
    "panel_distance": 20.0,
    "panel_size_fast_slow": [{PANEL}, {PANEL}],
    "image_depth": 16,
    "trusted_range_max": {TRUSTED_MAX}{energy}
}}"#
    )
}

/// A radial ramp with one masked column at x = 0.
pub fn panel_samples() -> Vec<u16> {
    let mut samples = Vec::with_capacity((PANEL * PANEL) as usize);
    for y in 0..PANEL {
        for x in 0..PANEL {
            if x == 0 {
                samples.push(MASKED_VALUE);
            } else {
                let dx = x as f64 - 32.0;
                let dy = y as f64 - 32.0;
                samples.push((dx * dx + dy * dy).sqrt().round() as u16 * 10);
            }
        }
    }
    samples
}

/// Dump, sidecar and config files for one image
pub struct DumpDir {
    pub dir: TempDir,
    pub image: PathBuf,
    pub metadata: PathBuf,
}

impl DumpDir {
    /// The default panel with beam energy set
    pub fn new() -> Self {
        Self::with(&panel_samples(), &metadata_json(Some(12.4)))
    }

    pub fn with(samples: &[u16], metadata: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("frame.raw");
        let metadata_path = dir.path().join("frame.json");
        std::fs::write(&image, encode_u16(samples)).unwrap();
        std::fs::write(&metadata_path, metadata).unwrap();
        Self {
            dir,
            image,
            metadata: metadata_path,
        }
    }

    /// Write a YAML config next to the dump
    pub fn config(&self, yaml: &str) -> PathBuf {
        let path = self.dir.path().join("diffrant.yaml");
        std::fs::write(&path, yaml).unwrap();
        path
    }
}
