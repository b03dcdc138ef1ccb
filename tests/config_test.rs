//! YAML configuration files combined with command-line overrides.

mod common;

use common::DumpDir;
use diffrant::error::ConfigError;
use diffrant::models::{ViewOverrides, ViewerConfig};
use diffrant_core::{CanvasSize, ColormapName, DownsampleMode, Point};
use pretty_assertions::assert_eq;

const CONFIG: &str = r#"
canvas:
  width: 320
  height: 240
auto_exposure: true
histogram_bins: 64
view:
  colormap: rainbow
  downsample_mode: average
  exposure_min: 10
  exposure_max: 500
"#;

#[test]
fn test_load_config_file() {
    let dump = DumpDir::new();
    let path = dump.config(CONFIG);
    let config = ViewerConfig::load(Some(&path)).unwrap();
    assert_eq!(config.canvas, CanvasSize::new(320, 240));
    assert!(config.auto_exposure);
    assert!(config.fit);
    assert_eq!(config.histogram_bins, 64);
    assert_eq!(config.view.colormap, ColormapName::Rainbow);
    assert_eq!(config.view.downsample_mode, DownsampleMode::Average);
    assert_eq!(
        (config.view.exposure_min, config.view.exposure_max),
        (10.0, 500.0)
    );
}

#[test]
fn test_flags_override_file() {
    let dump = DumpDir::new();
    let overrides = ViewOverrides {
        config: Some(dump.config(CONFIG)),
        height: Some(100),
        colormap: Some(ColormapName::Grayscale),
        zoom: Some(4.0),
        pan_y: Some(12.0),
        show_mask: true,
        ..Default::default()
    };
    let config = ViewerConfig::load(overrides.config.as_deref())
        .unwrap()
        .with_overrides(&overrides)
        .unwrap();
    assert_eq!(config.canvas, CanvasSize::new(320, 100));
    assert_eq!(config.view.colormap, ColormapName::Grayscale);
    assert_eq!(config.view.downsample_mode, DownsampleMode::Average);
    assert!(config.view.show_mask);
    assert!(!config.fit);

    let view = config.initial_view(64, 64);
    assert_eq!(view.zoom, 4.0);
    assert_eq!(view.pan, Point::new(0.0, 12.0));
}

#[test]
fn test_malformed_file_is_an_error() {
    let dump = DumpDir::new();
    let path = dump.config("canvas: [1, 2");
    assert!(matches!(
        ViewerConfig::load(Some(&path)),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_unknown_downsample_mode() {
    let dump = DumpDir::new();
    let path = dump.config("view:\n  downsample_mode: median\n");
    assert!(ViewerConfig::load(Some(&path)).is_err());
}
