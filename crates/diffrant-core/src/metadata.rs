//! Detector geometry accompanying each frame.

use crate::error::{PipelineError, Result};
use crate::image::BitDepth;
use serde::{Deserialize, Serialize};

/// Detector geometry and validity range for one image.
///
/// Field names follow the JSON sidecar written by the acquisition tooling,
/// so a metadata file deserialises directly with `serde_json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Direct beam position in image pixels (fast, slow).
    pub beam_center: (f64, f64),

    /// Pixel pitch in millimetres.
    #[serde(rename = "pixel_size")]
    pub pixel_size_mm: f64,

    /// Sample to detector distance in millimetres.
    #[serde(rename = "panel_distance", alias = "panel_distance_mm")]
    pub panel_distance_mm: f64,

    /// Panel size in pixels (fast, slow).
    #[serde(rename = "panel_size_fast_slow")]
    pub panel_size: (u32, u32),

    pub image_depth: BitDepth,

    /// Inclusive ceiling of valid readings; anything above is masked.
    pub trusted_range_max: u32,

    /// Beam energy. Without it every resolution feature is disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beam_energy_kev: Option<f64>,
}

impl ImageMetadata {
    /// Reject geometry the resolution maths cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.pixel_size_mm.is_finite() && self.pixel_size_mm > 0.0) {
            return Err(PipelineError::InvalidGeometry(format!(
                "pixel size must be positive, got {}",
                self.pixel_size_mm
            )));
        }
        if !(self.panel_distance_mm.is_finite() && self.panel_distance_mm > 0.0) {
            return Err(PipelineError::InvalidGeometry(format!(
                "panel distance must be positive, got {}",
                self.panel_distance_mm
            )));
        }
        if let Some(energy) = self.beam_energy_kev {
            if !(energy.is_finite() && energy >= 0.0) {
                return Err(PipelineError::InvalidGeometry(format!(
                    "beam energy must not be negative, got {energy}"
                )));
            }
        }
        Ok(())
    }

    /// Beam energy usable for resolution maths; an energy of 0 counts as
    /// unknown.
    #[inline]
    pub fn energy_kev(&self) -> Option<f64> {
        self.beam_energy_kev.filter(|e| *e > 0.0)
    }

    /// Whether `raw` falls outside the trusted range.
    #[inline]
    pub fn is_masked(&self, raw: u32) -> bool {
        raw > self.trusted_range_max
    }
}
