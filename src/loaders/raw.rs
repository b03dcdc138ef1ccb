//! Raw little-endian sample dumps.
//!
//! A dump is the bare pixel array with no header: `width * height` samples
//! of `image_depth` bits, row-major, little-endian. Dimensions and depth come
//! from the metadata sidecar.

use crate::error::LoadError;
use diffrant_core::{BitDepth, ImageMetadata, RawImageData};
use std::path::Path;

/// Reinterpret `bytes` as the samples `metadata` describes.
pub fn decode_raw(bytes: &[u8], metadata: &ImageMetadata) -> Result<RawImageData, LoadError> {
    let (width, height) = metadata.panel_size;
    let depth = metadata.image_depth;
    let sample_bytes = (depth.bits() / 8) as usize;
    let expected = width as usize * height as usize * sample_bytes;
    if bytes.len() != expected {
        return Err(LoadError::SizeMismatch {
            width,
            height,
            depth,
            expected,
            actual: bytes.len(),
        });
    }

    let image = match depth {
        BitDepth::Eight => RawImageData::from_u8(width, height, bytes.to_vec())?,
        BitDepth::Sixteen => RawImageData::from_u16(
            width,
            height,
            bytes
                .chunks_exact(2)
                .map(|c| u16::from_le_bytes([c[0], c[1]]))
                .collect(),
        )?,
        BitDepth::ThirtyTwo => RawImageData::from_u32(
            width,
            height,
            bytes
                .chunks_exact(4)
                .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        )?,
    };
    Ok(image)
}

/// Read and decode a dump file.
pub fn load_raw(path: &Path, metadata: &ImageMetadata) -> Result<RawImageData, LoadError> {
    let bytes = std::fs::read(path)?;
    let image = decode_raw(&bytes, metadata)?;
    tracing::info!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        depth = %image.depth(),
        "Loaded raw image"
    );
    Ok(image)
}

/// Little-endian bytes for `samples`, the inverse of [`decode_raw`].
pub fn encode_u16(samples: &[u16]) -> Vec<u8> {
    samples.iter().flat_map(|v| v.to_le_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(width: u32, height: u32, depth: BitDepth) -> ImageMetadata {
        ImageMetadata {
            beam_center: (0.0, 0.0),
            pixel_size_mm: 0.075,
            panel_distance_mm: 100.0,
            panel_size: (width, height),
            image_depth: depth,
            trusted_range_max: u32::MAX,
            beam_energy_kev: None,
        }
    }

    #[test]
    fn test_decodes_little_endian_u16() {
        let bytes = [0x01, 0x00, 0x00, 0x01, 0xff, 0xff];
        let image = decode_raw(&bytes, &metadata(3, 1, BitDepth::Sixteen)).unwrap();
        assert_eq!(image.depth(), BitDepth::Sixteen);
        assert_eq!(image.get(0, 0), Some(1));
        assert_eq!(image.get(1, 0), Some(256));
        assert_eq!(image.get(2, 0), Some(65_535));
    }

    #[test]
    fn test_decodes_u32() {
        let bytes = 70_000u32.to_le_bytes();
        let image = decode_raw(&bytes, &metadata(1, 1, BitDepth::ThirtyTwo)).unwrap();
        assert_eq!(image.get(0, 0), Some(70_000));
    }

    #[test]
    fn test_decodes_u8() {
        let image = decode_raw(&[7, 8], &metadata(1, 2, BitDepth::Eight)).unwrap();
        assert_eq!(image.get(0, 1), Some(8));
    }

    #[test]
    fn test_rejects_truncated_dump() {
        let err = decode_raw(&[0; 5], &metadata(3, 1, BitDepth::Sixteen)).unwrap_err();
        assert!(matches!(
            err,
            LoadError::SizeMismatch {
                expected: 6,
                actual: 5,
                ..
            }
        ));
    }

    #[test]
    fn test_encode_u16_round_trips() {
        let samples = [0u16, 1, 300, 65_535];
        let image = decode_raw(&encode_u16(&samples), &metadata(2, 2, BitDepth::Sixteen)).unwrap();
        assert_eq!(image.get(1, 1), Some(65_535));
        assert_eq!(image.get(0, 1), Some(300));
    }
}
