pub mod metadata;
pub mod raw;

pub use metadata::{load_metadata, parse_metadata};
pub use raw::{decode_raw, load_raw};
