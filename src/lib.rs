//! Diffrant - diffraction image rendering
//!
//! Command-line shell around `diffrant-core`: raw dump and metadata loading,
//! YAML viewer configuration, overlay rasterisation and PNG output.
//! This library exposes modules for integration testing.

pub mod error;
pub mod loaders;
pub mod models;
pub mod rendering;
pub mod services;
