//! Viewer state and the display ↔ image coordinate mapping.
//!
//! The canvas center always shows the image point `pan`; one image pixel
//! covers `zoom` canvas pixels. Every transform here returns a new
//! [`ViewerState`]; the pipeline itself never mutates one.

use crate::colormap::ColormapName;
use crate::downsample::DownsampleMode;
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};

/// Smallest zoom reachable through [`ViewerState::zoomed_at`].
pub const MIN_ZOOM: f64 = 0.01;
/// Largest zoom reachable through [`ViewerState::zoomed_at`].
pub const MAX_ZOOM: f64 = 100.0;
/// Zoom factor applied per wheel notch.
pub const WHEEL_ZOOM_STEP: f64 = 1.15;

/// A 2D point, in canvas or image space depending on context.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Destination raster size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PipelineError::EmptyCanvas {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn half(&self) -> Point {
        Point::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }
}

/// Snapshot of everything the user can change about the view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerState {
    /// Image-space point shown at the canvas center.
    pub pan: Point,
    /// Canvas pixels per image pixel.
    pub zoom: f64,
    /// Raw value mapped to black.
    pub exposure_min: f64,
    /// Raw value mapped to white.
    pub exposure_max: f64,
    pub colormap: ColormapName,
    pub downsample_mode: DownsampleMode,
    pub show_mask: bool,
    pub show_resolution_rings: bool,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            pan: Point::default(),
            zoom: 0.2,
            exposure_min: 0.0,
            exposure_max: 256.0,
            colormap: ColormapName::Inverse,
            downsample_mode: DownsampleMode::Max,
            show_mask: false,
            show_resolution_rings: false,
        }
    }
}

impl ViewerState {
    /// Fail fast on a state the renderer cannot map through.
    pub fn validate(&self) -> Result<()> {
        if !(self.zoom.is_finite() && self.zoom > 0.0) {
            return Err(PipelineError::InvalidZoom(self.zoom));
        }
        Ok(())
    }

    /// `(canvas - canvas/2) / zoom + pan`
    #[inline]
    pub fn canvas_to_image(&self, canvas: CanvasSize, point: Point) -> Point {
        let half = canvas.half();
        Point::new(
            (point.x - half.x) / self.zoom + self.pan.x,
            (point.y - half.y) / self.zoom + self.pan.y,
        )
    }

    /// Inverse of [`canvas_to_image`](Self::canvas_to_image).
    #[inline]
    pub fn image_to_canvas(&self, canvas: CanvasSize, point: Point) -> Point {
        let half = canvas.half();
        Point::new(
            (point.x - self.pan.x) * self.zoom + half.x,
            (point.y - self.pan.y) * self.zoom + half.y,
        )
    }

    /// Center the image and pick the largest zoom that shows all of it.
    pub fn fitted(&self, canvas: CanvasSize, image_width: u32, image_height: u32) -> Self {
        let zoom_x = canvas.width as f64 / image_width.max(1) as f64;
        let zoom_y = canvas.height as f64 / image_height.max(1) as f64;
        Self {
            pan: Point::new(image_width as f64 / 2.0, image_height as f64 / 2.0),
            zoom: zoom_x.min(zoom_y),
            ..self.clone()
        }
    }

    /// Multiply zoom by `factor`, keeping the image point under `anchor` fixed.
    pub fn zoomed_at(&self, canvas: CanvasSize, anchor: Point, factor: f64) -> Self {
        let target = self.canvas_to_image(canvas, anchor);
        let zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let half = canvas.half();
        Self {
            pan: Point::new(
                target.x - (anchor.x - half.x) / zoom,
                target.y - (anchor.y - half.y) / zoom,
            ),
            zoom,
            ..self.clone()
        }
    }

    /// One wheel notch; negative `delta_y` zooms in.
    pub fn wheel_zoomed(&self, canvas: CanvasSize, anchor: Point, delta_y: f64) -> Self {
        let factor = if delta_y < 0.0 {
            WHEEL_ZOOM_STEP
        } else {
            1.0 / WHEEL_ZOOM_STEP
        };
        self.zoomed_at(canvas, anchor, factor)
    }

    /// Drag the image by a canvas-space delta.
    pub fn panned_by(&self, dx: f64, dy: f64) -> Self {
        Self {
            pan: Point::new(self.pan.x - dx / self.zoom, self.pan.y - dy / self.zoom),
            ..self.clone()
        }
    }
}
