//! Percentile-based suggestion for the upper exposure bound.

use crate::image::{RawImageData, Sample, Samples};
use crate::metadata::ImageMetadata;

/// Fraction of trusted pixels that should fall at or below the suggestion.
pub const AUTO_EXPOSURE_PERCENTILE: f64 = 0.9;

/// Lowest value ever suggested, so the window never collapses to zero width.
pub const MIN_SUGGESTED_MAX: u32 = 2;

/// Suggest `exposure_max` as the 90th percentile of trusted samples.
///
/// Returns `None` when every sample is masked; callers must leave the
/// current window untouched in that case.
pub fn suggest_max(image: &RawImageData, metadata: &ImageMetadata) -> Option<u32> {
    let bins = image.depth().table_len();
    let trusted_max = metadata.trusted_range_max;

    let (counts, total) = match image.samples() {
        Samples::U8(data) => value_counts(data, bins, trusted_max),
        Samples::U16(data) => value_counts(data, bins, trusted_max),
        Samples::U32(data) => value_counts(data, bins, trusted_max),
    };
    if total == 0 {
        tracing::debug!("No trusted samples, skipping auto-exposure");
        return None;
    }

    let target = (AUTO_EXPOSURE_PERCENTILE * total as f64).floor() as u64;
    let mut cumulative = 0u64;
    let mut percentile = bins as u32 - 1;
    for (value, &count) in counts.iter().enumerate() {
        cumulative += count;
        if cumulative >= target {
            percentile = value as u32;
            break;
        }
    }

    let suggestion = percentile.max(MIN_SUGGESTED_MAX);
    tracing::debug!(total, percentile, suggestion, "Auto-exposure suggestion");
    Some(suggestion)
}

/// Suggested `(exposure_min, exposure_max)`, with the minimum pinned at 0.
pub fn suggest_window(image: &RawImageData, metadata: &ImageMetadata) -> Option<(f64, f64)> {
    suggest_max(image, metadata).map(|max| (0.0, max as f64))
}

/// One bin per representable value; values past the table share the last bin.
fn value_counts<S: Sample>(data: &[S], bins: usize, trusted_max: u32) -> (Vec<u64>, u64) {
    let mut counts = vec![0u64; bins];
    let last = bins - 1;
    let mut total = 0u64;
    for &sample in data {
        let v = sample.raw();
        if v > trusted_max {
            continue;
        }
        counts[(v as usize).min(last)] += 1;
        total += 1;
    }
    (counts, total)
}
