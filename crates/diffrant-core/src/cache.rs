//! Memoized derived tables.
//!
//! Colormaps, the exposure LUT and the histogram are pure functions of a
//! small key. [`PipelineCache`] rebuilds each one only when its key changes
//! and otherwise hands back the stored table.

use crate::colormap::{ColormapName, ColormapTable};
use crate::error::Result;
use crate::exposure::ExposureLut;
use crate::histogram::Histogram;
use crate::image::{BitDepth, ImageId, RawImageData};
use crate::metadata::ImageMetadata;
use crate::view::ViewerState;

const PALETTES: usize = ColormapName::ALL.len();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct LutKey {
    depth: BitDepth,
    min_bits: u64,
    max_bits: u64,
}

impl LutKey {
    fn new(depth: BitDepth, exposure_min: f64, exposure_max: f64) -> Self {
        Self {
            depth,
            min_bits: exposure_min.to_bits(),
            max_bits: exposure_max.to_bits(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct HistogramKey {
    image: ImageId,
    trusted_max: u32,
    bins: usize,
}

/// How many times each table has been (re)built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub colormap_builds: u32,
    pub lut_builds: u32,
    pub histogram_builds: u32,
}

#[derive(Debug, Default)]
pub struct PipelineCache {
    colormaps: [Option<ColormapTable>; PALETTES],
    lut: Option<(LutKey, ExposureLut)>,
    histogram: Option<(HistogramKey, Histogram)>,
    stats: CacheStats,
}

impl PipelineCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table for `name`, built on first use. Palettes never change, so every
    /// table built stays cached.
    pub fn colormap(&mut self, name: ColormapName) -> &ColormapTable {
        colormap_slot(&mut self.colormaps, &mut self.stats, name)
    }

    /// LUT for `depth` and the given exposure window.
    pub fn lut(&mut self, depth: BitDepth, exposure_min: f64, exposure_max: f64) -> &ExposureLut {
        lut_slot(
            &mut self.lut,
            &mut self.stats,
            LutKey::new(depth, exposure_min, exposure_max),
        )
    }

    /// Both render tables for `view` over an image of `depth`.
    pub fn tables(&mut self, depth: BitDepth, view: &ViewerState) -> (&ExposureLut, &ColormapTable) {
        let lut = lut_slot(
            &mut self.lut,
            &mut self.stats,
            LutKey::new(depth, view.exposure_min, view.exposure_max),
        );
        let colormap = colormap_slot(&mut self.colormaps, &mut self.stats, view.colormap);
        (lut, colormap)
    }

    /// Histogram of `image`, rebuilt when the image, trusted range or bin
    /// count changes.
    pub fn histogram(
        &mut self,
        image: &RawImageData,
        metadata: &ImageMetadata,
        bins: usize,
    ) -> Result<&Histogram> {
        let key = HistogramKey {
            image: image.id(),
            trusted_max: metadata.trusted_range_max,
            bins,
        };
        let entry = match self.histogram.take() {
            Some(entry) if entry.0 == key => entry,
            stale => match Histogram::compute(image, metadata, bins) {
                Ok(hist) => {
                    self.stats.histogram_builds += 1;
                    tracing::debug!(image = ?key.image, bins, "Histogram cache miss");
                    (key, hist)
                }
                Err(err) => {
                    self.histogram = stale;
                    return Err(err);
                }
            },
        };
        Ok(&self.histogram.insert(entry).1)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Drop everything derived from a particular image.
    pub fn forget_image(&mut self, id: ImageId) {
        if self.histogram.as_ref().is_some_and(|(key, _)| key.image == id) {
            self.histogram = None;
        }
    }
}

fn colormap_slot<'a>(
    slots: &'a mut [Option<ColormapTable>; PALETTES],
    stats: &mut CacheStats,
    name: ColormapName,
) -> &'a ColormapTable {
    slots[name.index()].get_or_insert_with(|| {
        stats.colormap_builds += 1;
        tracing::debug!(colormap = %name, "Colormap cache miss");
        ColormapTable::build(name)
    })
}

fn lut_slot<'a>(
    slot: &'a mut Option<(LutKey, ExposureLut)>,
    stats: &mut CacheStats,
    key: LutKey,
) -> &'a ExposureLut {
    let entry = match slot.take() {
        Some(entry) if entry.0 == key => entry,
        _ => {
            stats.lut_builds += 1;
            let lut = ExposureLut::build(
                key.depth,
                f64::from_bits(key.min_bits),
                f64::from_bits(key.max_bits),
            );
            (key, lut)
        }
    };
    &slot.insert(entry).1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(trusted: u32) -> ImageMetadata {
        ImageMetadata {
            beam_center: (0.0, 0.0),
            pixel_size_mm: 0.075,
            panel_distance_mm: 100.0,
            panel_size: (2, 2),
            image_depth: BitDepth::Eight,
            trusted_range_max: trusted,
            beam_energy_kev: None,
        }
    }

    #[test]
    fn test_lut_rebuilt_only_on_window_change() {
        let mut cache = PipelineCache::new();
        cache.lut(BitDepth::Sixteen, 0.0, 100.0);
        cache.lut(BitDepth::Sixteen, 0.0, 100.0);
        assert_eq!(cache.stats().lut_builds, 1);

        cache.lut(BitDepth::Sixteen, 0.0, 101.0);
        assert_eq!(cache.stats().lut_builds, 2);
        cache.lut(BitDepth::Eight, 0.0, 101.0);
        assert_eq!(cache.stats().lut_builds, 3);
        assert_eq!(cache.lut(BitDepth::Eight, 0.0, 101.0).len(), 256);
    }

    #[test]
    fn test_colormaps_are_built_once_each() {
        let mut cache = PipelineCache::new();
        for _ in 0..3 {
            for name in ColormapName::ALL {
                assert_eq!(cache.colormap(name).name(), name);
            }
        }
        assert_eq!(cache.stats().colormap_builds, 4);
    }

    #[test]
    fn test_pan_and_zoom_do_not_invalidate_tables() {
        let mut cache = PipelineCache::new();
        let view = ViewerState::default();
        cache.tables(BitDepth::Sixteen, &view);
        let moved = view.panned_by(30.0, 12.0);
        let zoomed = ViewerState { zoom: 3.0, ..moved };
        cache.tables(BitDepth::Sixteen, &zoomed);
        assert_eq!(
            cache.stats(),
            CacheStats {
                colormap_builds: 1,
                lut_builds: 1,
                histogram_builds: 0,
            }
        );
    }

    #[test]
    fn test_histogram_keyed_on_image_identity() {
        let mut cache = PipelineCache::new();
        let a = RawImageData::from_u8(2, 2, vec![1, 2, 3, 4]).unwrap();
        let b = RawImageData::from_u8(2, 2, vec![1, 2, 3, 4]).unwrap();
        let meta = metadata(255);

        assert_eq!(cache.histogram(&a, &meta, 8).unwrap().total(), 4);
        cache.histogram(&a, &meta, 8).unwrap();
        assert_eq!(cache.stats().histogram_builds, 1);

        cache.histogram(&b, &meta, 8).unwrap();
        assert_eq!(cache.stats().histogram_builds, 2);

        assert_eq!(cache.histogram(&b, &metadata(2), 8).unwrap().total(), 2);
        assert_eq!(cache.stats().histogram_builds, 3);
    }

    #[test]
    fn test_failed_histogram_is_not_cached() {
        let mut cache = PipelineCache::new();
        let img = RawImageData::from_u8(1, 1, vec![0]).unwrap();
        assert!(cache.histogram(&img, &metadata(255), 0).is_err());
        assert_eq!(cache.stats().histogram_builds, 0);
        cache.forget_image(img.id());
    }
}
