pub mod overlay;
pub mod svg_to_png;

pub use overlay::overlay_svg;
pub use svg_to_png::{encode_png, FrameRenderer};
