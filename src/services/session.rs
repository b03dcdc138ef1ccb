use crate::models::ViewerConfig;
use diffrant_core::{
    cursor_info, drag_handle, render, shift_window, suggest_window, CacheStats, CanvasSize,
    ColormapName, CursorInfo, DownsampleMode, ExposureHandle, Frame, FrameScheduler, Histogram,
    ImageMetadata, PipelineCache, Point, RawImageData, Result, Scheduled, ViewerState,
    DEFAULT_HISTOGRAM_BINS,
};

/// One loaded image and everything needed to keep re-rendering it.
///
/// Every state change schedules a render; [`on_frame`](Self::on_frame)
/// renders whatever state is pending, so bursts of changes between frames
/// produce a single frame.
pub struct ViewerSession {
    image: RawImageData,
    metadata: ImageMetadata,
    canvas: CanvasSize,
    view: ViewerState,
    cache: PipelineCache,
    scheduler: FrameScheduler<ViewerState>,
    /// Upper end of the exposure scale: `max(max_raw, 1)`
    display_max: f64,
    /// Exposure window captured when a window drag started
    shift_origin: Option<(f64, f64)>,
}

impl ViewerSession {
    /// Start a session; the initial state is scheduled for the first frame.
    pub fn new(
        image: RawImageData,
        metadata: ImageMetadata,
        canvas: CanvasSize,
        view: ViewerState,
    ) -> Result<Self> {
        canvas.validate()?;
        view.validate()?;
        if (image.width(), image.height()) != metadata.panel_size {
            tracing::warn!(
                image = ?(image.width(), image.height()),
                panel = ?metadata.panel_size,
                "Image dimensions differ from metadata panel size"
            );
        }

        let mut cache = PipelineCache::new();
        let max_raw = cache
            .histogram(&image, &metadata, DEFAULT_HISTOGRAM_BINS)?
            .max_raw()
            .unwrap_or(0);

        let mut session = Self {
            image,
            metadata,
            canvas,
            view,
            cache,
            scheduler: FrameScheduler::new(),
            display_max: max_raw.max(1) as f64,
            shift_origin: None,
        };
        session.schedule();
        Ok(session)
    }

    /// Start a session from a viewer configuration, applying fit and
    /// auto-exposure when the configuration asks for them.
    pub fn from_config(
        image: RawImageData,
        metadata: ImageMetadata,
        config: &ViewerConfig,
    ) -> Result<Self> {
        let view = config.initial_view(image.width(), image.height());
        let mut session = Self::new(image, metadata, config.canvas, view)?;
        if config.auto_exposure && session.auto_exposure().is_none() {
            tracing::warn!("Every sample is masked, keeping configured exposure");
        }
        Ok(session)
    }

    pub fn image(&self) -> &RawImageData {
        &self.image
    }

    pub fn metadata(&self) -> &ImageMetadata {
        &self.metadata
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn view(&self) -> &ViewerState {
        &self.view
    }

    /// Upper end of the exposure scale the histogram widget spans
    pub fn display_max(&self) -> f64 {
        self.display_max
    }

    /// Whether a render is waiting for the next frame
    pub fn is_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    fn schedule(&mut self) -> Scheduled {
        self.scheduler.schedule(self.view.clone())
    }

    /// Replace the whole view state.
    pub fn set_view(&mut self, view: ViewerState) -> Result<Scheduled> {
        view.validate()?;
        self.view = view;
        Ok(self.schedule())
    }

    /// Apply `f` to a copy of the view state and install the result.
    pub fn update(&mut self, f: impl FnOnce(&mut ViewerState)) -> Result<Scheduled> {
        let mut next = self.view.clone();
        f(&mut next);
        self.set_view(next)
    }

    /// Center the image and zoom so all of it is visible.
    pub fn fit(&mut self) -> Scheduled {
        self.view = self
            .view
            .fitted(self.canvas, self.image.width(), self.image.height());
        self.schedule()
    }

    /// Zoom by `factor` around a canvas point.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) -> Result<Scheduled> {
        let next = self.view.zoomed_at(self.canvas, anchor, factor);
        self.set_view(next)
    }

    /// One mouse-wheel step around a canvas point.
    pub fn wheel(&mut self, anchor: Point, delta_y: f64) -> Scheduled {
        self.view = self.view.wheel_zoomed(self.canvas, anchor, delta_y);
        self.schedule()
    }

    /// Drag the image by a canvas-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> Scheduled {
        self.view = self.view.panned_by(dx, dy);
        self.schedule()
    }

    pub fn set_colormap(&mut self, colormap: ColormapName) -> Scheduled {
        self.view.colormap = colormap;
        self.schedule()
    }

    pub fn set_downsample(&mut self, mode: DownsampleMode) -> Scheduled {
        self.view.downsample_mode = mode;
        self.schedule()
    }

    pub fn set_show_mask(&mut self, show: bool) -> Scheduled {
        self.view.show_mask = show;
        self.schedule()
    }

    pub fn set_show_rings(&mut self, show: bool) -> Scheduled {
        self.view.show_resolution_rings = show;
        self.schedule()
    }

    /// Move one exposure bound to a raw value.
    pub fn drag_exposure_handle(&mut self, handle: ExposureHandle, raw: f64) -> Scheduled {
        self.view = drag_handle(&self.view, handle, raw);
        self.schedule()
    }

    /// Capture the current window as the origin of a window drag.
    pub fn begin_exposure_shift(&mut self) {
        self.shift_origin = Some((self.view.exposure_min, self.view.exposure_max));
    }

    /// Shift the window captured by
    /// [`begin_exposure_shift`](Self::begin_exposure_shift) by `raw_delta`.
    ///
    /// Without a captured origin the current window is used.
    pub fn shift_exposure(&mut self, raw_delta: f64) -> Scheduled {
        let origin = self
            .shift_origin
            .unwrap_or((self.view.exposure_min, self.view.exposure_max));
        self.view = shift_window(&self.view, origin, raw_delta, self.display_max);
        self.schedule()
    }

    pub fn end_exposure_shift(&mut self) {
        self.shift_origin = None;
    }

    /// Apply the percentile exposure suggestion.
    ///
    /// Returns the applied window, or `None` (state untouched) when every
    /// sample is masked.
    pub fn auto_exposure(&mut self) -> Option<(f64, f64)> {
        let (min, max) = suggest_window(&self.image, &self.metadata)?;
        self.view.exposure_min = min;
        self.view.exposure_max = max;
        tracing::info!(exposure_min = min, exposure_max = max, "Applied auto-exposure");
        self.schedule();
        Some((min, max))
    }

    /// Change the canvas size, keeping pan and zoom.
    pub fn resize(&mut self, canvas: CanvasSize) -> Result<Scheduled> {
        canvas.validate()?;
        self.canvas = canvas;
        Ok(self.schedule())
    }

    /// Histogram of the loaded image, cached across calls.
    pub fn histogram(&mut self, bins: usize) -> Result<&Histogram> {
        self.cache.histogram(&self.image, &self.metadata, bins)
    }

    /// Pixel under a canvas point in the current view.
    pub fn cursor(&self, point: Point) -> Result<Option<CursorInfo>> {
        cursor_info(self.canvas, point, &self.image, &self.metadata, &self.view)
    }

    /// Frame-clock tick: render the pending state, if any.
    pub fn on_frame(&mut self) -> Option<Result<Frame>> {
        let Self {
            image,
            metadata,
            canvas,
            cache,
            scheduler,
            ..
        } = self;
        scheduler.on_frame(|view| {
            tracing::trace!(zoom = view.zoom, "Rendering frame");
            let (lut, colormap) = cache.tables(image.depth(), &view);
            render(*canvas, image, &view, metadata, lut, colormap)
        })
    }

    /// Render the current state immediately, dropping any pending request.
    pub fn render_now(&mut self) -> Result<Frame> {
        self.scheduler.cancel();
        let (lut, colormap) = self.cache.tables(self.image.depth(), &self.view);
        render(
            self.canvas,
            &self.image,
            &self.view,
            &self.metadata,
            lut,
            colormap,
        )
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Renders replaced before their frame arrived
    pub fn superseded_renders(&self) -> u64 {
        self.scheduler.superseded_count()
    }
}
