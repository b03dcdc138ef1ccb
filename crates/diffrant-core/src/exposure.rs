//! Exposure windowing: raw intensity → 8-bit display intensity.
//!
//! [`ExposureLut`] is the only place the exposure window is applied. The
//! table covers `0..=depth.display_max()`; 32-bit images share the 16-bit
//! table, so every raw value above 65535 reads the last entry (see
//! [`ExposureLut::get`]).

use crate::image::BitDepth;
use crate::view::ViewerState;

/// Per-value lookup table for one `(depth, min, max)` window.
#[derive(Clone, PartialEq)]
pub struct ExposureLut {
    depth: BitDepth,
    exposure_min: f64,
    exposure_max: f64,
    table: Vec<u8>,
}

impl std::fmt::Debug for ExposureLut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExposureLut")
            .field("depth", &self.depth)
            .field("exposure_min", &self.exposure_min)
            .field("exposure_max", &self.exposure_max)
            .field("len", &self.table.len())
            .finish()
    }
}

impl ExposureLut {
    /// Build the table for an exposure window.
    ///
    /// A zero or negative window is a hard threshold: values below `min` are
    /// black, everything else white.
    pub fn build(depth: BitDepth, exposure_min: f64, exposure_max: f64) -> Self {
        let len = depth.table_len();
        let range = exposure_max - exposure_min;

        let table: Vec<u8> = if range <= 0.0 || range.is_nan() {
            (0..len)
                .map(|v| if (v as f64) < exposure_min { 0 } else { 255 })
                .collect()
        } else {
            (0..len)
                .map(|v| {
                    let v = v as f64;
                    if v <= exposure_min {
                        0
                    } else if v >= exposure_max {
                        255
                    } else {
                        ((v - exposure_min) * 255.0 / range).round() as u8
                    }
                })
                .collect()
        };

        tracing::debug!(
            depth = depth.bits(),
            exposure_min,
            exposure_max,
            entries = table.len(),
            "Built exposure LUT"
        );

        Self {
            depth,
            exposure_min,
            exposure_max,
            table,
        }
    }

    /// Display intensity for `raw`, clamped to the last entry.
    #[inline]
    pub fn get(&self, raw: u32) -> u8 {
        let index = (raw as usize).min(self.table.len() - 1);
        self.table[index]
    }

    pub fn depth(&self) -> BitDepth {
        self.depth
    }

    pub fn window(&self) -> (f64, f64) {
        (self.exposure_min, self.exposure_max)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Which bound of the exposure window a handle drag moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExposureHandle {
    Min,
    Max,
}

/// Move one bound to `raw` rounded to a whole count, keeping the window at
/// least one count wide.
///
/// The minimum never goes below zero.
pub fn drag_handle(view: &ViewerState, handle: ExposureHandle, raw: f64) -> ViewerState {
    let raw = raw.round();
    let mut next = view.clone();
    match handle {
        ExposureHandle::Min => {
            next.exposure_min = raw.min(view.exposure_max - 1.0).max(0.0);
        }
        ExposureHandle::Max => {
            next.exposure_max = raw.max(view.exposure_min + 1.0);
        }
    }
    next
}

/// Shift a window captured at drag start by `raw_delta`, preserving width.
///
/// The shifted window is pushed back inside `[0, display_max]` and both
/// bounds are rounded to whole counts.
pub fn shift_window(
    view: &ViewerState,
    start: (f64, f64),
    raw_delta: f64,
    display_max: f64,
) -> ViewerState {
    let mut min = start.0 + raw_delta;
    let mut max = start.1 + raw_delta;
    if min < 0.0 {
        max -= min;
        min = 0.0;
    }
    if max > display_max {
        min -= max - display_max;
        max = display_max;
    }

    let mut next = view.clone();
    next.exposure_min = min.round().max(0.0);
    next.exposure_max = max.round();
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sizes() {
        assert_eq!(ExposureLut::build(BitDepth::Eight, 0.0, 255.0).len(), 256);
        assert_eq!(ExposureLut::build(BitDepth::Sixteen, 0.0, 10.0).len(), 65536);
        assert_eq!(
            ExposureLut::build(BitDepth::ThirtyTwo, 0.0, 10.0).len(),
            65536
        );
    }

    #[test]
    fn test_linear_interpolation() {
        let lut = ExposureLut::build(BitDepth::Sixteen, 100.0, 200.0);
        assert_eq!(lut.get(100), 0);
        assert_eq!(lut.get(150), 128); // 127.5 rounds away from zero
        assert_eq!(lut.get(200), 255);
        assert_eq!(lut.get(101), 3); // 2.55
    }

    #[test]
    fn test_thirty_two_bit_values_clamp_to_last_entry() {
        let lut = ExposureLut::build(BitDepth::ThirtyTwo, 0.0, 100_000.0);
        assert_eq!(lut.get(70_000), lut.get(65_535));
        assert_eq!(lut.get(u32::MAX), lut.get(65_535));
    }

    #[test]
    fn test_zero_width_window_is_threshold() {
        let lut = ExposureLut::build(BitDepth::Eight, 10.0, 10.0);
        assert_eq!(lut.get(9), 0);
        assert_eq!(lut.get(10), 255);
    }

    #[test]
    fn test_handle_drag_keeps_window_open() {
        let view = ViewerState {
            exposure_min: 10.0,
            exposure_max: 50.0,
            ..Default::default()
        };
        let moved = drag_handle(&view, ExposureHandle::Min, 80.0);
        assert_eq!(moved.exposure_min, 49.0);
        let moved = drag_handle(&view, ExposureHandle::Min, -5.0);
        assert_eq!(moved.exposure_min, 0.0);
        let moved = drag_handle(&view, ExposureHandle::Max, 3.0);
        assert_eq!(moved.exposure_max, 11.0);
        assert_eq!(moved.exposure_min, 10.0);
    }

    #[test]
    fn test_handle_drag_rounds_to_whole_counts() {
        let view = ViewerState {
            exposure_min: 0.0,
            exposure_max: 100.0,
            ..Default::default()
        };
        assert_eq!(drag_handle(&view, ExposureHandle::Max, 37.4).exposure_max, 37.0);
        assert_eq!(drag_handle(&view, ExposureHandle::Min, 12.6).exposure_min, 13.0);
    }

    #[test]
    fn test_shift_window_clamps_and_preserves_width() {
        let view = ViewerState::default();
        let shifted = shift_window(&view, (10.0, 40.0), -25.0, 100.0);
        assert_eq!((shifted.exposure_min, shifted.exposure_max), (0.0, 30.0));

        let shifted = shift_window(&view, (10.0, 40.0), 75.0, 100.0);
        assert_eq!((shifted.exposure_min, shifted.exposure_max), (70.0, 100.0));

        let shifted = shift_window(&view, (10.0, 40.0), 5.4, 100.0);
        assert_eq!((shifted.exposure_min, shifted.exposure_max), (15.0, 45.0));
    }
}
