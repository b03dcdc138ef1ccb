//! Intensity histogram of trusted samples.
//!
//! Bins span `[0, min(trusted_range_max, depth.display_max())]` in equal
//! widths. Masked samples are skipped entirely; they neither count nor move
//! `max_raw`.

use crate::error::{PipelineError, Result};
use crate::image::{RawImageData, Sample, Samples};
use crate::metadata::ImageMetadata;

/// Bin count used when the caller does not ask for one.
pub const DEFAULT_HISTOGRAM_BINS: usize = 512;

/// Pixels kept free above the tallest bar in [`Histogram::bar_heights`].
pub const BAR_HEADROOM: f64 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    counts: Vec<u64>,
    bin_width: f64,
    max_raw: Option<u32>,
    total: u64,
}

impl Histogram {
    /// Single pass over every sample of `image`.
    pub fn compute(
        image: &RawImageData,
        metadata: &ImageMetadata,
        num_bins: usize,
    ) -> Result<Self> {
        if num_bins == 0 {
            return Err(PipelineError::ZeroBins);
        }
        let trusted_max = metadata.trusted_range_max;
        let effective_max = trusted_max.min(image.depth().display_max());
        let bin_width = effective_max as f64 / num_bins as f64;

        let mut hist = Self {
            counts: vec![0; num_bins],
            bin_width,
            max_raw: None,
            total: 0,
        };
        match image.samples() {
            Samples::U8(data) => hist.accumulate(data, trusted_max),
            Samples::U16(data) => hist.accumulate(data, trusted_max),
            Samples::U32(data) => hist.accumulate(data, trusted_max),
        }

        tracing::debug!(
            bins = num_bins,
            bin_width,
            total = hist.total,
            max_raw = ?hist.max_raw,
            "Computed histogram"
        );
        Ok(hist)
    }

    fn accumulate<S: Sample>(&mut self, data: &[S], trusted_max: u32) {
        let last = self.counts.len() - 1;
        let mut max_raw: Option<u32> = None;
        for &sample in data {
            let v = sample.raw();
            if v > trusted_max {
                continue;
            }
            if max_raw.map_or(true, |m| v > m) {
                max_raw = Some(v);
            }
            let bin = if self.bin_width > 0.0 {
                ((v as f64 / self.bin_width).floor() as usize).min(last)
            } else {
                0
            };
            self.counts[bin] += 1;
            self.total += 1;
        }
        self.max_raw = max_raw;
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn num_bins(&self) -> usize {
        self.counts.len()
    }

    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    /// `num_bins + 1` ascending edges, `i * bin_width`.
    pub fn bin_edges(&self) -> Vec<f64> {
        (0..=self.counts.len())
            .map(|i| i as f64 * self.bin_width)
            .collect()
    }

    /// Largest trusted value seen, `None` when every sample is masked.
    pub fn max_raw(&self) -> Option<u32> {
        self.max_raw
    }

    /// Number of trusted samples.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Log10-scaled bar heights for a widget `height` pixels tall.
    ///
    /// Empty bins are zero high; the tallest bar reaches
    /// `height - BAR_HEADROOM`.
    pub fn bar_heights(&self, height: f64) -> Vec<f64> {
        let log = |c: u64| if c > 0 { (c as f64).log10() } else { 0.0 };
        let peak = self.counts.iter().map(|&c| log(c)).fold(0.0, f64::max);
        let peak = if peak == 0.0 { 1.0 } else { peak };
        self.counts
            .iter()
            .map(|&c| {
                if c == 0 {
                    0.0
                } else {
                    log(c) / peak * (height - BAR_HEADROOM)
                }
            })
            .collect()
    }

    /// Horizontal axis for a widget `width` pixels wide.
    pub fn axis(&self, width: f64) -> HistogramAxis {
        HistogramAxis {
            width,
            display_max: self.max_raw.unwrap_or(0).max(1) as f64,
        }
    }
}

/// Linear mapping between raw values and histogram widget x positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramAxis {
    pub width: f64,
    pub display_max: f64,
}

impl HistogramAxis {
    pub fn raw_to_x(&self, raw: f64) -> f64 {
        raw / self.display_max * self.width
    }

    /// Whole raw count under `x`, clamped to `[0, display_max]`.
    pub fn x_to_raw(&self, x: f64) -> f64 {
        (x / self.width * self.display_max)
            .clamp(0.0, self.display_max)
            .round()
    }

    /// Raw-value distance covered by a horizontal drag of `dx` pixels.
    pub fn delta_to_raw(&self, dx: f64) -> f64 {
        dx / self.width * self.display_max
    }
}
