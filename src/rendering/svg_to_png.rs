use crate::error::RenderError;
use crate::rendering::overlay::overlay_svg;
use diffrant_core::Frame;
use resvg::usvg::{self, Transform};
use std::io::Cursor;
use std::sync::Arc;
use tiny_skia::{IntSize, Pixmap};

/// Composites a [`Frame`] into pixels and encodes it as PNG.
///
/// The bitmap layer is copied into a pixmap as-is; the overlay is rendered
/// from an SVG scene on top of it. The bitmap is fully opaque, so the pixmap
/// stays opaque and its premultiplied data is also valid straight RGBA.
pub struct FrameRenderer {
    /// Font database for overlay text
    fontdb: Arc<fontdb::Database>,
}

impl FrameRenderer {
    /// Create a renderer with extra fonts loaded from the provided data
    pub fn with_fonts(fonts: Vec<(String, Vec<u8>)>) -> Self {
        let mut fontdb = fontdb::Database::new();

        for (name, data) in fonts {
            fontdb.load_font_data(data);
            tracing::debug!(font = %name, "Loaded font");
        }

        // Load system fonts as fallback
        fontdb.load_system_fonts();

        tracing::debug!(
            font_count = fontdb.len(),
            "Loaded fonts for overlay text rendering"
        );

        Self {
            fontdb: Arc::new(fontdb),
        }
    }

    /// Create a renderer with system fonts only
    pub fn new() -> Self {
        Self::with_fonts(Vec::new())
    }

    /// Bitmap plus overlay as an RGBA pixmap
    pub fn rasterize(&self, frame: &Frame) -> Result<Pixmap, RenderError> {
        let size = IntSize::from_wh(frame.bitmap.width(), frame.bitmap.height())
            .ok_or(RenderError::PixmapAllocation)?;
        let mut pixmap = Pixmap::from_vec(frame.bitmap.as_bytes().to_vec(), size)
            .ok_or(RenderError::PixmapAllocation)?;

        let svg = overlay_svg(frame);
        let options = usvg::Options {
            fontdb: self.fontdb.clone(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_data(svg.as_bytes(), &options)
            .map_err(|e| RenderError::SvgParse(e.to_string()))?;
        resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

        Ok(pixmap)
    }

    /// Composite and encode `frame` as an 8-bit RGBA PNG
    pub fn render_png(&self, frame: &Frame) -> Result<Vec<u8>, RenderError> {
        let pixmap = self.rasterize(frame)?;
        encode_png(pixmap.width(), pixmap.height(), pixmap.data())
    }
}

impl Default for FrameRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode opaque RGBA8 data as PNG
pub fn encode_png(width: u32, height: u32, rgba: &[u8]) -> Result<Vec<u8>, RenderError> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Fast);
        let mut writer = encoder
            .write_header()
            .map_err(|e| RenderError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(rgba)
            .map_err(|e| RenderError::PngEncode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}
