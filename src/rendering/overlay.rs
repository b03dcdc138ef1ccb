//! SVG scene for the vector overlay of a [`Frame`].
//!
//! The scene has the canvas size and no background, so rasterising it onto
//! the frame bitmap composites labels, crosshair and rings over the pixels.

use diffrant_core::render::style;
use diffrant_core::{Frame, HorizontalAlign, LabelAlignment, VerticalAlign};

/// Build the overlay SVG for `frame`.
pub fn overlay_svg(frame: &Frame) -> String {
    let (w, h) = (frame.bitmap.width(), frame.bitmap.height());
    let mut svg = String::with_capacity(512 + frame.labels.len() * 96);
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    ));

    if !frame.labels.is_empty() {
        svg.push_str(&format!(
            r#"<g font-family="{}" text-anchor="middle" dominant-baseline="central">"#,
            style::PIXEL_FONT_FAMILY
        ));
        for label in &frame.labels {
            let [r, g, b] = label.color.rgb();
            svg.push_str(&format!(
                r#"<text x="{:.2}" y="{:.2}" font-size="{:.2}" fill="rgb({r},{g},{b})">{}</text>"#,
                label.position.x, label.position.y, label.font_size, label.text
            ));
        }
        svg.push_str("</g>");
    }

    let c = &frame.crosshair;
    let [r, g, b] = style::CROSSHAIR_COLOR;
    svg.push_str(&format!(
        r#"<path d="M {:.2} {:.2} H {:.2} M {:.2} {:.2} V {:.2}" fill="none" stroke="rgb({r},{g},{b})" stroke-width="{}"/>"#,
        c.center.x - c.arm,
        c.center.y,
        c.center.x + c.arm,
        c.center.x,
        c.center.y - c.arm,
        c.center.y + c.arm,
        style::CROSSHAIR_WIDTH
    ));

    if !frame.rings.is_empty() {
        let [r, g, b] = style::RING_COLOR;
        let [dash, gap] = style::RING_DASH;
        svg.push_str(&format!(
            r#"<g fill="none" stroke="rgb({r},{g},{b})" stroke-opacity="{}" stroke-width="{}" stroke-dasharray="{dash} {gap}">"#,
            style::RING_STROKE_OPACITY,
            style::RING_WIDTH
        ));
        for ring in frame.rings.iter().filter(|ring| ring.ring.radius > 0.0) {
            svg.push_str(&format!(
                r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}"/>"#,
                ring.center.x, ring.center.y, ring.ring.radius
            ));
        }
        svg.push_str("</g>");

        svg.push_str(&format!(
            r#"<g font-family="{}" font-size="{}" fill="rgb({r},{g},{b})" fill-opacity="{}">"#,
            style::RING_FONT_FAMILY,
            style::RING_FONT_SIZE,
            style::RING_LABEL_OPACITY
        ));
        for ring in &frame.rings {
            let (anchor, baseline) = svg_alignment(ring.alignment);
            svg.push_str(&format!(
                r#"<text x="{:.2}" y="{:.2}" text-anchor="{anchor}" dominant-baseline="{baseline}">{}</text>"#,
                ring.label_position.x, ring.label_position.y, ring.label
            ));
        }
        svg.push_str("</g>");
    }

    svg.push_str("</svg>");
    svg
}

/// `text-anchor` and `dominant-baseline` for a label alignment.
fn svg_alignment(alignment: LabelAlignment) -> (&'static str, &'static str) {
    let anchor = match alignment.horizontal {
        HorizontalAlign::Left => "start",
        HorizontalAlign::Center => "middle",
        HorizontalAlign::Right => "end",
    };
    let baseline = match alignment.vertical {
        VerticalAlign::Top => "text-before-edge",
        VerticalAlign::Middle => "central",
        VerticalAlign::Bottom => "text-after-edge",
    };
    (anchor, baseline)
}
