//! Canvas rendering.
//!
//! [`render`] turns one image under one [`ViewerState`] into a [`Frame`]:
//! the RGBA bitmap plus the vector overlay (pixel-value labels, beam-center
//! crosshair, resolution rings) that a rasteriser draws on top.
//!
//! The bitmap pass walks every canvas pixel once. The image storage type is
//! resolved before the loop, so the per-pixel work is a coordinate map, an
//! optional block reduction and two table lookups.

use crate::colormap::ColormapTable;
use crate::downsample::{block_size, reduce_block, BlockRegion};
use crate::error::Result;
use crate::exposure::ExposureLut;
use crate::image::{RawImageData, Sample, Samples};
use crate::metadata::ImageMetadata;
use crate::resolution::{
    beam_center_canvas, pixel_resolution, ring_radii, LabelAlignment, ResolutionRing,
};
use crate::view::{CanvasSize, Point, ViewerState};

/// Fill for canvas pixels that map outside the image.
pub const BACKGROUND: [u8; 4] = [40, 40, 40, 255];

/// Fill for masked pixels when `show_mask` is on.
pub const MASK_COLOR: [u8; 4] = [200, 50, 50, 255];

/// Zoom at which every visible pixel gets its raw value drawn on it.
pub const TEXT_ZOOM_THRESHOLD: f64 = 25.0;

/// Luminance above which a pixel label is drawn black instead of white.
pub const LABEL_LUMINANCE_THRESHOLD: f64 = 127.0;

/// Overlay styling shared by every rasteriser.
pub mod style {
    pub const CROSSHAIR_COLOR: [u8; 3] = [0x4a, 0x90, 0xd9];
    pub const CROSSHAIR_WIDTH: f64 = 2.0;
    pub const CROSSHAIR_MIN_ARM: f64 = 8.0;

    pub const RING_COLOR: [u8; 3] = [255, 60, 60];
    pub const RING_STROKE_OPACITY: f64 = 0.85;
    pub const RING_LABEL_OPACITY: f64 = 0.9;
    pub const RING_WIDTH: f64 = 1.5;
    pub const RING_DASH: [f64; 2] = [6.0, 4.0];
    pub const RING_FONT_SIZE: f64 = 11.0;
    pub const RING_FONT_FAMILY: &str = "sans-serif";

    pub const PIXEL_FONT_MIN: f64 = 9.0;
    pub const PIXEL_FONT_MAX: f64 = 16.0;
    pub const PIXEL_FONT_FAMILY: &str = "monospace";
}

/// Row-major RGBA8 raster, straight alpha.
#[derive(Clone, PartialEq, Eq)]
pub struct RgbaBitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl std::fmt::Debug for RgbaBitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RgbaBitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl RgbaBitmap {
    fn filled(canvas: CanvasSize, color: [u8; 4]) -> Self {
        let len = canvas.width as usize * canvas.height as usize;
        let mut data = Vec::with_capacity(len * 4);
        for _ in 0..len {
            data.extend_from_slice(&color);
        }
        Self {
            width: canvas.width,
            height: canvas.height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGBA at `(x, y)`. Panics outside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Text color picked for contrast with the pixel underneath.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextColor {
    Black,
    White,
}

impl TextColor {
    /// Black on bright colors, white on dark ones.
    pub fn contrasting(rgb: [u8; 4]) -> Self {
        let luminance = 0.299 * rgb[0] as f64 + 0.587 * rgb[1] as f64 + 0.114 * rgb[2] as f64;
        if luminance > LABEL_LUMINANCE_THRESHOLD {
            TextColor::Black
        } else {
            TextColor::White
        }
    }

    pub fn rgb(self) -> [u8; 3] {
        match self {
            TextColor::Black => [0, 0, 0],
            TextColor::White => [255, 255, 255],
        }
    }
}

/// Raw value drawn centred on an image pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelLabel {
    pub position: Point,
    pub text: String,
    pub color: TextColor,
    pub font_size: f64,
}

/// Beam-center marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crosshair {
    pub center: Point,
    pub arm: f64,
}

/// A ring ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct RingOverlay {
    pub center: Point,
    pub ring: ResolutionRing,
    pub label: String,
    pub label_position: Point,
    pub alignment: LabelAlignment,
}

/// Everything needed to paint one canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub bitmap: RgbaBitmap,
    pub labels: Vec<PixelLabel>,
    pub crosshair: Crosshair,
    pub rings: Vec<RingOverlay>,
}

/// What sits under a canvas point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorInfo {
    pub x: i64,
    pub y: i64,
    pub raw: u32,
    pub masked: bool,
    /// d-spacing in Å, `None` without beam energy or at the beam center.
    pub resolution: Option<f64>,
}

/// Render `image` onto a `canvas`-sized frame.
///
/// `lut` and `colormap` are expected to match `view`'s exposure window and
/// palette; the caller owns that memoization (see
/// [`PipelineCache`](crate::PipelineCache)).
pub fn render(
    canvas: CanvasSize,
    image: &RawImageData,
    view: &ViewerState,
    metadata: &ImageMetadata,
    lut: &ExposureLut,
    colormap: &ColormapTable,
) -> Result<Frame> {
    canvas.validate()?;
    view.validate()?;

    let mask_color = if view.show_mask {
        MASK_COLOR
    } else {
        colormap.color(lut.get(0))
    };
    let pass = BitmapPass {
        canvas,
        view,
        image_width: image.width() as usize,
        image_height: image.height() as usize,
        trusted_max: metadata.trusted_range_max,
        lut,
        colormap,
        mask_color,
    };

    let mut bitmap = RgbaBitmap::filled(canvas, BACKGROUND);
    match image.samples() {
        Samples::U8(data) => pass.run(data, &mut bitmap.data),
        Samples::U16(data) => pass.run(data, &mut bitmap.data),
        Samples::U32(data) => pass.run(data, &mut bitmap.data),
    }

    let labels = if view.zoom >= TEXT_ZOOM_THRESHOLD {
        pixel_labels(canvas, image, view, metadata, lut, colormap)
    } else {
        Vec::new()
    };

    let crosshair = Crosshair {
        center: beam_center_canvas(metadata, view, canvas),
        arm: style::CROSSHAIR_MIN_ARM.max(view.zoom * 0.5),
    };

    let rings = if view.show_resolution_rings {
        ring_radii(metadata, view)
            .into_iter()
            .map(|ring| RingOverlay {
                center: crosshair.center,
                label: ring.label(),
                label_position: ring.label_position(crosshair.center),
                alignment: ring.alignment(),
                ring,
            })
            .collect()
    } else {
        Vec::new()
    };

    tracing::trace!(
        width = canvas.width,
        height = canvas.height,
        zoom = view.zoom,
        labels = labels.len(),
        rings = rings.len(),
        "Rendered frame"
    );

    Ok(Frame {
        bitmap,
        labels,
        crosshair,
        rings,
    })
}

struct BitmapPass<'a> {
    canvas: CanvasSize,
    view: &'a ViewerState,
    image_width: usize,
    image_height: usize,
    trusted_max: u32,
    lut: &'a ExposureLut,
    colormap: &'a ColormapTable,
    mask_color: [u8; 4],
}

impl BitmapPass<'_> {
    /// Overwrites every on-image pixel of `out`; off-image pixels keep the
    /// background they were filled with.
    fn run<S: Sample>(&self, data: &[S], out: &mut [u8]) {
        let half = self.canvas.half();
        let zoom = self.view.zoom;
        let pan = self.view.pan;
        let row_bytes = self.canvas.width as usize * 4;
        let block = block_size(zoom) as usize;

        for (cy, row) in out.chunks_exact_mut(row_bytes).enumerate() {
            let iy = ((cy as f64 - half.y) / zoom + pan.y).floor();
            if iy < 0.0 || iy >= self.image_height as f64 {
                continue;
            }
            let iy = iy as usize;

            for (cx, px) in row.chunks_exact_mut(4).enumerate() {
                let ix = ((cx as f64 - half.x) / zoom + pan.x).floor();
                if ix < 0.0 || ix >= self.image_width as f64 {
                    continue;
                }
                let ix = ix as usize;

                let raw = if zoom >= 1.0 {
                    Some(data[iy * self.image_width + ix].raw())
                } else {
                    let region = BlockRegion {
                        x0: ix,
                        y0: iy,
                        x1: (ix + block).min(self.image_width),
                        y1: (iy + block).min(self.image_height),
                    };
                    reduce_block(
                        data,
                        self.image_width,
                        region,
                        self.view.downsample_mode,
                        self.trusted_max,
                    )
                };
                px.copy_from_slice(&self.colorize(raw));
            }
        }
    }

    #[inline]
    fn colorize(&self, raw: Option<u32>) -> [u8; 4] {
        match raw {
            Some(v) if v <= self.trusted_max => self.colormap.color(self.lut.get(v)),
            _ => self.mask_color,
        }
    }
}

fn pixel_labels(
    canvas: CanvasSize,
    image: &RawImageData,
    view: &ViewerState,
    metadata: &ImageMetadata,
    lut: &ExposureLut,
    colormap: &ColormapTable,
) -> Vec<PixelLabel> {
    let half = canvas.half();
    let zoom = view.zoom;
    let pan = view.pan;

    let x_start = ((-half.x) / zoom + pan.x).floor().max(0.0) as i64;
    let x_end = ((canvas.width as f64 - half.x) / zoom + pan.x)
        .ceil()
        .min(image.width() as f64 - 1.0) as i64;
    let y_start = ((-half.y) / zoom + pan.y).floor().max(0.0) as i64;
    let y_end = ((canvas.height as f64 - half.y) / zoom + pan.y)
        .ceil()
        .min(image.height() as f64 - 1.0) as i64;

    let font_size = (zoom * 0.3).clamp(style::PIXEL_FONT_MIN, style::PIXEL_FONT_MAX);
    let mut labels = Vec::new();
    for iy in y_start..=y_end {
        for ix in x_start..=x_end {
            let Some(raw) = image.get(ix, iy) else {
                continue;
            };
            if metadata.is_masked(raw) {
                continue;
            }
            labels.push(PixelLabel {
                position: Point::new(
                    (ix as f64 - pan.x + 0.5) * zoom + half.x,
                    (iy as f64 - pan.y + 0.5) * zoom + half.y,
                ),
                text: raw.to_string(),
                color: TextColor::contrasting(colormap.color(lut.get(raw))),
                font_size,
            });
        }
    }
    labels
}

/// Image pixel under `point`, or `None` off the image.
///
/// The view and canvas are validated first, as in [`render`].
pub fn cursor_info(
    canvas: CanvasSize,
    point: Point,
    image: &RawImageData,
    metadata: &ImageMetadata,
    view: &ViewerState,
) -> Result<Option<CursorInfo>> {
    canvas.validate()?;
    view.validate()?;

    let p = view.canvas_to_image(canvas, point);
    let (x, y) = (p.x.floor() as i64, p.y.floor() as i64);
    let Some(raw) = image.get(x, y) else {
        return Ok(None);
    };
    Ok(Some(CursorInfo {
        x,
        y,
        raw,
        masked: metadata.is_masked(raw),
        resolution: pixel_resolution(x as f64, y as f64, metadata),
    }))
}
