//! Block reduction for zoom levels below 1:1.
//!
//! When one canvas pixel covers several image pixels, the block under it is
//! collapsed to a single representative raw value. Masked samples never take
//! part; a block with no trusted sample reduces to `None`, which the renderer
//! paints as masked.

use crate::error::PipelineError;
use crate::image::{RawImageData, Sample, Samples};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownsampleMode {
    /// Rounded mean of trusted samples.
    Average,
    /// Largest trusted sample; keeps isolated Bragg peaks visible.
    Max,
}

impl DownsampleMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DownsampleMode::Average => "average",
            DownsampleMode::Max => "max",
        }
    }
}

impl fmt::Display for DownsampleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DownsampleMode {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "average" | "mean" => Ok(DownsampleMode::Average),
            "max" => Ok(DownsampleMode::Max),
            _ => Err(PipelineError::UnknownDownsampleMode(s.to_string())),
        }
    }
}

/// Image pixels per canvas pixel along each axis: `ceil(1 / zoom)`.
#[inline]
pub fn block_size(zoom: f64) -> u32 {
    ((1.0 / zoom).ceil() as u32).max(1)
}

/// Reduce the block `[start_x, start_x + block) × [start_y, start_y + block)`,
/// clipped to the image, to one raw value.
pub fn reduce(
    image: &RawImageData,
    start_x: i64,
    start_y: i64,
    block: u32,
    mode: DownsampleMode,
    trusted_max: u32,
) -> Option<u32> {
    let width = image.width() as usize;
    let height = image.height() as usize;
    let x0 = start_x.clamp(0, width as i64) as usize;
    let y0 = start_y.clamp(0, height as i64) as usize;
    let x1 = (start_x + block as i64).clamp(0, width as i64) as usize;
    let y1 = (start_y + block as i64).clamp(0, height as i64) as usize;
    let region = BlockRegion { x0, y0, x1, y1 };

    match image.samples() {
        Samples::U8(data) => reduce_block(data, width, region, mode, trusted_max),
        Samples::U16(data) => reduce_block(data, width, region, mode, trusted_max),
        Samples::U32(data) => reduce_block(data, width, region, mode, trusted_max),
    }
}

/// Half-open pixel rectangle already clipped to the image.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlockRegion {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

#[inline]
pub(crate) fn reduce_block<S: Sample>(
    data: &[S],
    stride: usize,
    region: BlockRegion,
    mode: DownsampleMode,
    trusted_max: u32,
) -> Option<u32> {
    match mode {
        DownsampleMode::Max => {
            let mut best: Option<u32> = None;
            for y in region.y0..region.y1 {
                let row = &data[y * stride + region.x0..y * stride + region.x1];
                for &sample in row {
                    let v = sample.raw();
                    if v <= trusted_max && best.map_or(true, |b| v > b) {
                        best = Some(v);
                    }
                }
            }
            best
        }
        DownsampleMode::Average => {
            let mut sum: u64 = 0;
            let mut count: u64 = 0;
            for y in region.y0..region.y1 {
                let row = &data[y * stride + region.x0..y * stride + region.x1];
                for &sample in row {
                    let v = sample.raw();
                    if v <= trusted_max {
                        sum += v as u64;
                        count += 1;
                    }
                }
            }
            if count == 0 {
                None
            } else {
                Some(((2 * sum + count) / (2 * count)) as u32)
            }
        }
    }
}
