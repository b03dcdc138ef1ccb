//! Assertion helpers for tests.

use pretty_assertions::assert_eq;

/// Assert `bytes` is a valid RGBA PNG of the given size
pub fn assert_png(bytes: &[u8], width: u32, height: u32) {
    assert!(
        bytes.starts_with(b"\x89PNG\r\n\x1a\n"),
        "Expected PNG image, got {} bytes starting with {:?}",
        bytes.len(),
        &bytes[..8.min(bytes.len())]
    );
    let decoder = png::Decoder::new(std::io::Cursor::new(bytes));
    let reader = decoder.read_info().unwrap();
    let info = reader.info();
    assert_eq!((info.width, info.height), (width, height));
    assert_eq!(info.color_type, png::ColorType::Rgba);
}

/// Decode a PNG into `(width, height, rgba)`
pub fn decode_png(bytes: &[u8]) -> (u32, u32, Vec<u8>) {
    let decoder = png::Decoder::new(std::io::Cursor::new(bytes));
    let mut reader = decoder.read_info().unwrap();
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).unwrap();
    buf.truncate(info.buffer_size());
    (info.width, info.height, buf)
}

/// Assert every pixel of an RGBA buffer is opaque
pub fn assert_opaque(rgba: &[u8]) {
    let translucent = rgba.chunks_exact(4).filter(|px| px[3] != 255).count();
    assert_eq!(translucent, 0, "{translucent} pixels are not opaque");
}
