//! Decoded detector image storage.
//!
//! [`RawImageData`] holds one frame of unsigned integer intensities in its
//! native sample width. The pipeline is generic over [`Sample`] so the hot
//! loops never branch on the storage type per pixel; callers dispatch once
//! on [`Samples`] and hand the concrete slice down.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Detector sample bit depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum BitDepth {
    Eight,
    Sixteen,
    ThirtyTwo,
}

impl BitDepth {
    /// Number of bits per sample.
    pub fn bits(self) -> u32 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
            BitDepth::ThirtyTwo => 32,
        }
    }

    /// Largest value addressable by display tables for this depth.
    ///
    /// 32-bit images share the 16-bit ceiling: lookup tables and histograms
    /// stop at 65535 and anything above is clamped onto the last entry.
    pub fn display_max(self) -> u32 {
        match self {
            BitDepth::Eight => u8::MAX as u32,
            BitDepth::Sixteen | BitDepth::ThirtyTwo => u16::MAX as u32,
        }
    }

    /// Number of entries in a per-value table (`display_max + 1`).
    pub fn table_len(self) -> usize {
        self.display_max() as usize + 1
    }
}

impl TryFrom<u32> for BitDepth {
    type Error = PipelineError;

    fn try_from(bits: u32) -> Result<Self> {
        match bits {
            8 => Ok(BitDepth::Eight),
            16 => Ok(BitDepth::Sixteen),
            32 => Ok(BitDepth::ThirtyTwo),
            other => Err(PipelineError::UnsupportedDepth(other)),
        }
    }
}

impl From<BitDepth> for u32 {
    fn from(depth: BitDepth) -> Self {
        depth.bits()
    }
}

impl std::fmt::Display for BitDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// A raw detector sample widened to `u32` on read.
pub trait Sample: Copy + Send + Sync + 'static {
    fn raw(self) -> u32;
}

impl Sample for u8 {
    #[inline]
    fn raw(self) -> u32 {
        self as u32
    }
}

impl Sample for u16 {
    #[inline]
    fn raw(self) -> u32 {
        self as u32
    }
}

impl Sample for u32 {
    #[inline]
    fn raw(self) -> u32 {
        self
    }
}

/// Sample storage in native width.
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Samples::U8(data) => data.len(),
            Samples::U16(data) => data.len(),
            Samples::U32(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn depth(&self) -> BitDepth {
        match self {
            Samples::U8(_) => BitDepth::Eight,
            Samples::U16(_) => BitDepth::Sixteen,
            Samples::U32(_) => BitDepth::ThirtyTwo,
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<u32> {
        match self {
            Samples::U8(data) => data.get(index).map(|&v| v.raw()),
            Samples::U16(data) => data.get(index).map(|&v| v.raw()),
            Samples::U32(data) => data.get(index).map(|&v| v.raw()),
        }
    }
}

/// Process-unique identity of a decoded image, used as a memoization key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(u64);

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

impl ImageId {
    fn next() -> Self {
        ImageId(NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// One immutable, row-major detector frame.
///
/// Cloning produces a new value with the same identity; the data is never
/// mutated after construction so the identity stays a valid cache key.
#[derive(Debug, Clone)]
pub struct RawImageData {
    id: ImageId,
    width: u32,
    height: u32,
    samples: Samples,
}

impl RawImageData {
    /// Wrap decoded samples. The bit depth follows the storage width.
    pub fn new(width: u32, height: u32, samples: Samples) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidDimensions { width, height });
        }
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(PipelineError::SampleCountMismatch {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            id: ImageId::next(),
            width,
            height,
            samples,
        })
    }

    pub fn from_u8(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        Self::new(width, height, Samples::U8(data))
    }

    pub fn from_u16(width: u32, height: u32, data: Vec<u16>) -> Result<Self> {
        Self::new(width, height, Samples::U16(data))
    }

    pub fn from_u32(width: u32, height: u32, data: Vec<u32>) -> Result<Self> {
        Self::new(width, height, Samples::U32(data))
    }

    #[inline]
    pub fn id(&self) -> ImageId {
        self.id
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn depth(&self) -> BitDepth {
        self.samples.depth()
    }

    #[inline]
    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    pub fn pixel_count(&self) -> usize {
        self.samples.len()
    }

    /// Raw value at `(x, y)`, or `None` outside the image.
    pub fn get(&self, x: i64, y: i64) -> Option<u32> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        self.samples
            .get(y as usize * self.width as usize + x as usize)
    }
}
