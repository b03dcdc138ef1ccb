//! diffrant-core: rendering pipeline for diffraction detector images
//!
//! This crate turns a single-channel detector frame (8, 16 or 32-bit
//! integer intensities) into false-color RGBA frames for an interactive,
//! pannable and zoomable viewer, and provides the analytics that go with
//! it: an intensity histogram, a percentile auto-exposure and
//! crystallographic resolution geometry.
//!
//! There is no I/O here. Callers hand in an already-decoded
//! [`RawImageData`], its [`ImageMetadata`] and the current [`ViewerState`].
//!
//! # Quick Start
//!
//! ```
//! use diffrant_core::{
//!     render, BitDepth, CanvasSize, ColormapName, ImageMetadata, PipelineCache, RawImageData,
//!     ViewerState,
//! };
//!
//! let image = RawImageData::from_u8(4, 4, (0..16).collect()).unwrap();
//! let metadata = ImageMetadata {
//!     beam_center: (2.0, 2.0),
//!     pixel_size_mm: 0.075,
//!     panel_distance_mm: 150.0,
//!     panel_size: (4, 4),
//!     image_depth: BitDepth::Eight,
//!     trusted_range_max: 254,
//!     beam_energy_kev: Some(12.4),
//! };
//! let canvas = CanvasSize::new(4, 4);
//! let view = ViewerState {
//!     exposure_max: 255.0,
//!     colormap: ColormapName::Grayscale,
//!     ..ViewerState::default()
//! }
//! .fitted(canvas, image.width(), image.height());
//!
//! let mut cache = PipelineCache::new();
//! let (lut, colormap) = cache.tables(image.depth(), &view);
//! let frame = render(canvas, &image, &view, &metadata, lut, colormap).unwrap();
//!
//! assert_eq!(frame.bitmap.pixel(3, 0), [3, 3, 3, 255]);
//! ```
//!
//! # Pipeline
//!
//! ```text
//! canvas pixel
//!     |
//!     v
//! image coordinate      (canvas - canvas/2) / zoom + pan
//!     |
//!     +--> zoom >= 1:   nearest sample
//!     +--> zoom <  1:   block of ceil(1/zoom) reduced by max or mean
//!     |
//!     v
//! raw value > trusted_range_max ?  --> mask color
//!     |
//!     v
//! ExposureLut           raw -> 0..=255
//!     |
//!     v
//! ColormapTable         0..=255 -> RGBA
//! ```
//!
//! The vector overlay (pixel values at high zoom, beam-center crosshair,
//! resolution rings) is returned alongside the bitmap in a [`Frame`] and
//! left to the caller's rasteriser.
//!
//! # Masking
//!
//! A sample is masked exactly when `raw > trusted_range_max`. Masked samples
//! never reach the LUT, never count towards the histogram and never move the
//! auto-exposure suggestion.
//!
//! # 32-bit images
//!
//! Display tables stop at 65535 for both 16- and 32-bit data. Larger values
//! read the last LUT entry and fall into the last histogram bin.

pub mod auto_exposure;
pub mod cache;
pub mod colormap;
pub mod downsample;
pub mod error;
pub mod exposure;
pub mod histogram;
pub mod image;
pub mod metadata;
pub mod render;
pub mod resolution;
pub mod scheduler;
pub mod view;


pub use auto_exposure::{suggest_max, suggest_window};
pub use cache::{CacheStats, PipelineCache};
pub use colormap::{ColormapName, ColormapTable};
pub use downsample::DownsampleMode;
pub use error::{PipelineError, Result};
pub use exposure::{drag_handle, shift_window, ExposureHandle, ExposureLut};
pub use histogram::{Histogram, HistogramAxis, DEFAULT_HISTOGRAM_BINS};
pub use image::{BitDepth, ImageId, RawImageData, Sample, Samples};
pub use metadata::ImageMetadata;
pub use render::{
    cursor_info, render, Crosshair, CursorInfo, Frame, PixelLabel, RgbaBitmap, RingOverlay,
    TextColor,
};
pub use resolution::{
    pixel_resolution, ring_radii, HorizontalAlign, LabelAlignment, ResolutionRing, VerticalAlign,
};
pub use scheduler::{FrameScheduler, Scheduled};
pub use view::{CanvasSize, Point, ViewerState};
