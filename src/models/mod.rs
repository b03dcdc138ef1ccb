pub mod config;

pub use config::{ViewOverrides, ViewerConfig};
