use crate::error::ConfigError;
use diffrant_core::{
    CanvasSize, ColormapName, DownsampleMode, Point, ViewerState, DEFAULT_HISTOGRAM_BINS,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Viewer configuration loaded from a YAML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Output raster size
    pub canvas: CanvasSize,

    /// Fit the whole panel into the canvas before rendering
    pub fit: bool,

    /// Replace the exposure window with the percentile suggestion
    pub auto_exposure: bool,

    /// Bin count for histogram output
    pub histogram_bins: usize,

    /// Initial viewer state
    pub view: ViewerState,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasSize::new(1024, 1024),
            fit: true,
            auto_exposure: false,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            view: ViewerState::default(),
        }
    }
}

/// Command-line overrides, applied on top of the YAML configuration
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ViewOverrides {
    /// Viewer configuration file (YAML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Canvas width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Canvas height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Canvas pixels per image pixel (disables --fit)
    #[arg(long)]
    pub zoom: Option<f64>,

    /// Image x coordinate shown at the canvas center (disables --fit)
    #[arg(long, allow_hyphen_values = true)]
    pub pan_x: Option<f64>,

    /// Image y coordinate shown at the canvas center (disables --fit)
    #[arg(long, allow_hyphen_values = true)]
    pub pan_y: Option<f64>,

    /// Raw value mapped to black
    #[arg(long)]
    pub exposure_min: Option<f64>,

    /// Raw value mapped to white
    #[arg(long)]
    pub exposure_max: Option<f64>,

    /// Colormap: grayscale, inverse, heat or rainbow
    #[arg(long)]
    pub colormap: Option<ColormapName>,

    /// Downsample mode for zoom below 1: average or max
    #[arg(long)]
    pub downsample: Option<DownsampleMode>,

    /// Paint masked pixels red
    #[arg(long)]
    pub show_mask: bool,

    /// Draw resolution rings
    #[arg(long)]
    pub rings: bool,

    /// Fit the panel into the canvas
    #[arg(long)]
    pub fit: bool,

    /// Use the percentile auto-exposure
    #[arg(long)]
    pub auto_exposure: bool,
}

impl ViewerConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`.
    ///
    /// No path, or a path that does not exist, yields the defaults. A file
    /// that exists but cannot be read or parsed is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config = Self::from_yaml_str(&content)?;
                tracing::info!(
                    path = %path.display(),
                    width = config.canvas.width,
                    height = config.canvas.height,
                    colormap = %config.view.colormap,
                    "Loaded configuration"
                );
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.canvas.validate()?;
        self.view.validate()?;
        Ok(())
    }

    /// Apply command-line overrides. Setting zoom or pan turns fitting off.
    pub fn with_overrides(mut self, overrides: &ViewOverrides) -> Result<Self, ConfigError> {
        if let Some(width) = overrides.width {
            self.canvas.width = width;
        }
        if let Some(height) = overrides.height {
            self.canvas.height = height;
        }

        let view = &mut self.view;
        if let Some(zoom) = overrides.zoom {
            view.zoom = zoom;
        }
        if overrides.pan_x.is_some() || overrides.pan_y.is_some() {
            view.pan = Point::new(
                overrides.pan_x.unwrap_or(view.pan.x),
                overrides.pan_y.unwrap_or(view.pan.y),
            );
        }
        if let Some(min) = overrides.exposure_min {
            view.exposure_min = min;
        }
        if let Some(max) = overrides.exposure_max {
            view.exposure_max = max;
        }
        if let Some(colormap) = overrides.colormap {
            view.colormap = colormap;
        }
        if let Some(mode) = overrides.downsample {
            view.downsample_mode = mode;
        }
        view.show_mask |= overrides.show_mask;
        view.show_resolution_rings |= overrides.rings;

        let explicit_view =
            overrides.zoom.is_some() || overrides.pan_x.is_some() || overrides.pan_y.is_some();
        self.fit = overrides.fit || (self.fit && !explicit_view);
        self.auto_exposure |= overrides.auto_exposure;

        self.validate()?;
        Ok(self)
    }

    /// Viewer state to start from for a panel of the given size.
    pub fn initial_view(&self, image_width: u32, image_height: u32) -> ViewerState {
        if self.fit {
            self.view.fitted(self.canvas, image_width, image_height)
        } else {
            self.view.clone()
        }
    }
}
