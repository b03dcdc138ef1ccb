//! Crystallographic resolution from detector geometry.
//!
//! A detector position at distance `r` (pixels) from the beam center sees
//! scattering angle `2θ = atan(r * pixel_size / distance)`; Bragg's law turns
//! that into a d-spacing `λ / (2 sin θ)`. Everything here is undefined when
//! the metadata carries no beam energy.

use crate::metadata::ImageMetadata;
use crate::view::{CanvasSize, Point, ViewerState};

/// Planck constant times speed of light, in keV·Å.
pub const HC_KEV_ANGSTROM: f64 = 12.398419843;

/// Resolutions eligible for a ring, from low to high resolution.
pub const RING_CANDIDATES_ANGSTROM: [f64; 18] = [
    50.0, 20.0, 10.0, 8.0, 6.0, 5.0, 4.0, 3.5, 3.0, 2.5, 2.0, 1.8, 1.5, 1.4, 1.2, 1.0, 0.9, 0.8,
];

/// Rings are spread evenly in `1/d²` over this many steps.
pub const RING_COUNT: usize = 5;

/// Gap in canvas pixels between a ring and its label.
pub const RING_LABEL_OFFSET: f64 = 4.0;

/// Direction component below which a label is centred on that axis.
const ALIGN_THRESHOLD: f64 = 0.1;

/// `λ = hc / E`
#[inline]
pub fn wavelength_angstrom(energy_kev: f64) -> f64 {
    HC_KEV_ANGSTROM / energy_kev
}

/// d-spacing seen at `distance_px` from the beam center.
fn resolution_at_distance(distance_px: f64, metadata: &ImageMetadata, wavelength: f64) -> Option<f64> {
    let two_theta = (distance_px * metadata.pixel_size_mm).atan2(metadata.panel_distance_mm);
    let sin_theta = (two_theta / 2.0).sin();
    if sin_theta <= 0.0 {
        return None;
    }
    Some(wavelength / (2.0 * sin_theta))
}

/// Resolution in Å at image pixel `(fast, slow)`.
///
/// `None` without beam energy or exactly at the beam center.
pub fn pixel_resolution(fast: f64, slow: f64, metadata: &ImageMetadata) -> Option<f64> {
    let energy = metadata.energy_kev()?;
    let (bx, by) = metadata.beam_center;
    let distance = (fast - bx).hypot(slow - by);
    if distance == 0.0 {
        return None;
    }
    resolution_at_distance(distance, metadata, wavelength_angstrom(energy))
}

/// Panel corner farthest from the beam center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FarthestCorner {
    pub distance_px: f64,
    /// Unit vector from the beam center towards the corner.
    pub direction: Point,
}

pub fn farthest_corner(metadata: &ImageMetadata) -> FarthestCorner {
    let (bx, by) = metadata.beam_center;
    let (w, h) = (metadata.panel_size.0 as f64, metadata.panel_size.1 as f64);

    let mut best = FarthestCorner {
        distance_px: 0.0,
        direction: Point::new(1.0, -1.0),
    };
    for (cx, cy) in [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)] {
        let distance = (cx - bx).hypot(cy - by);
        if distance > best.distance_px {
            best = FarthestCorner {
                distance_px: distance,
                direction: Point::new((cx - bx) / distance, (cy - by) / distance),
            };
        }
    }
    best
}

/// The d-spacings that get a ring, in display order.
///
/// Targets are `RING_COUNT` even steps of `1/d²` up to the farthest corner;
/// each snaps to the nearest candidate that is still on the panel.
pub fn ring_resolutions(metadata: &ImageMetadata) -> Vec<f64> {
    let Some(energy) = metadata.energy_kev() else {
        return Vec::new();
    };
    let corner = farthest_corner(metadata);
    let Some(d_corner) =
        resolution_at_distance(corner.distance_px, metadata, wavelength_angstrom(energy))
    else {
        return Vec::new();
    };

    let on_panel: Vec<f64> = RING_CANDIDATES_ANGSTROM
        .iter()
        .copied()
        .filter(|&d| d >= d_corner)
        .collect();
    if on_panel.is_empty() {
        return Vec::new();
    }

    let d_star_sq_max = 1.0 / (d_corner * d_corner);
    let mut rings: Vec<f64> = Vec::with_capacity(RING_COUNT);
    for step in 1..=RING_COUNT {
        let target = 1.0 / (step as f64 / RING_COUNT as f64 * d_star_sq_max).sqrt();
        let nearest = on_panel.iter().copied().fold(on_panel[0], |best, d| {
            if (d - target).abs() < (best - target).abs() {
                d
            } else {
                best
            }
        });
        if !rings.contains(&nearest) {
            rings.push(nearest);
        }
    }
    rings
}

/// Horizontal text anchor for a ring label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

/// Vertical text anchor for a ring label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAlign {
    Top,
    Middle,
    Bottom,
}

/// Text alignment that keeps a label outside its ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelAlignment {
    pub horizontal: HorizontalAlign,
    pub vertical: VerticalAlign,
}

impl LabelAlignment {
    pub fn from_direction(direction: Point) -> Self {
        let horizontal = if direction.x > ALIGN_THRESHOLD {
            HorizontalAlign::Left
        } else if direction.x < -ALIGN_THRESHOLD {
            HorizontalAlign::Right
        } else {
            HorizontalAlign::Center
        };
        let vertical = if direction.y > ALIGN_THRESHOLD {
            VerticalAlign::Top
        } else if direction.y < -ALIGN_THRESHOLD {
            VerticalAlign::Bottom
        } else {
            VerticalAlign::Middle
        };
        Self {
            horizontal,
            vertical,
        }
    }
}

/// One resolution ring in canvas space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolutionRing {
    pub d_spacing: f64,
    /// Radius in canvas pixels at the current zoom.
    pub radius: f64,
    pub label_direction: Point,
}

impl ResolutionRing {
    /// Where the label goes for a beam center drawn at `beam_canvas`.
    pub fn label_position(&self, beam_canvas: Point) -> Point {
        let reach = self.radius + RING_LABEL_OFFSET;
        Point::new(
            beam_canvas.x + self.label_direction.x * reach,
            beam_canvas.y + self.label_direction.y * reach,
        )
    }

    pub fn alignment(&self) -> LabelAlignment {
        LabelAlignment::from_direction(self.label_direction)
    }

    /// `"3.5Å"`, `"1Å"`
    pub fn label(&self) -> String {
        format!("{}Å", self.d_spacing)
    }
}

/// Rings to draw for this geometry at the current zoom.
///
/// Empty without beam energy; d-spacings below `λ/2` are skipped.
pub fn ring_radii(metadata: &ImageMetadata, view: &ViewerState) -> Vec<ResolutionRing> {
    let Some(energy) = metadata.energy_kev() else {
        return Vec::new();
    };
    let wavelength = wavelength_angstrom(energy);
    let direction = farthest_corner(metadata).direction;

    ring_resolutions(metadata)
        .into_iter()
        .filter_map(|d| {
            let sin_theta = wavelength / (2.0 * d);
            if sin_theta >= 1.0 {
                return None;
            }
            let two_theta = 2.0 * sin_theta.asin();
            let radius =
                metadata.panel_distance_mm * two_theta.tan() / metadata.pixel_size_mm * view.zoom;
            Some(ResolutionRing {
                d_spacing: d,
                radius,
                label_direction: direction,
            })
        })
        .collect()
}

/// Canvas position of the beam center.
pub fn beam_center_canvas(metadata: &ImageMetadata, view: &ViewerState, canvas: CanvasSize) -> Point {
    let (bx, by) = metadata.beam_center;
    view.image_to_canvas(canvas, Point::new(bx, by))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::BitDepth;

    fn metadata(energy: Option<f64>) -> ImageMetadata {
        ImageMetadata {
            beam_center: (2074.0, 2181.0),
            pixel_size_mm: 0.075,
            panel_distance_mm: 150.0,
            panel_size: (4148, 4362),
            image_depth: BitDepth::Sixteen,
            trusted_range_max: 65_534,
            beam_energy_kev: energy,
        }
    }

    #[test]
    fn test_wavelength_at_12_4_kev() {
        assert!((wavelength_angstrom(12.398419843) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_undefined_at_beam_center() {
        let meta = metadata(Some(12.4));
        assert_eq!(pixel_resolution(2074.0, 2181.0, &meta), None);
    }

    #[test]
    fn test_undefined_without_energy() {
        let meta = metadata(None);
        assert_eq!(pixel_resolution(0.0, 0.0, &meta), None);
        assert!(ring_radii(&meta, &ViewerState::default()).is_empty());
    }

    #[test]
    fn test_zero_energy_disables_resolution() {
        let meta = metadata(Some(0.0));
        assert_eq!(pixel_resolution(0.0, 0.0, &meta), None);
        assert!(ring_resolutions(&meta).is_empty());
        assert!(ring_radii(&meta, &ViewerState::default()).is_empty());
    }

    #[test]
    fn test_matches_bragg() {
        let meta = metadata(Some(HC_KEV_ANGSTROM)); // λ = 1 Å
        // 1000 px * 0.075 mm = 75 mm off-axis at 150 mm.
        let d = pixel_resolution(3074.0, 2181.0, &meta).unwrap();
        let two_theta = (75.0f64 / 150.0).atan();
        let expected = 1.0 / (2.0 * (two_theta / 2.0).sin());
        assert!((d - expected).abs() < 1e-12, "{d} vs {expected}");
    }

    #[test]
    fn test_farthest_corner_direction_is_unit() {
        let mut meta = metadata(Some(12.4));
        meta.beam_center = (100.0, 100.0);
        let corner = farthest_corner(&meta);
        let (dx, dy) = (4148.0 - 100.0, 4362.0 - 100.0);
        assert!((corner.distance_px - f64::hypot(dx, dy)).abs() < 1e-9);
        assert!((corner.direction.x.hypot(corner.direction.y) - 1.0).abs() < 1e-12);
        assert!(corner.direction.x > 0.0 && corner.direction.y > 0.0);
    }

    #[test]
    fn test_rings_are_unique_candidates_on_panel() {
        let meta = metadata(Some(12.4));
        let rings = ring_resolutions(&meta);
        assert!(!rings.is_empty() && rings.len() <= RING_COUNT);
        let corner = farthest_corner(&meta);
        let d_corner = resolution_at_distance(
            corner.distance_px,
            &meta,
            wavelength_angstrom(12.4),
        )
        .unwrap();
        for (i, d) in rings.iter().enumerate() {
            assert!(RING_CANDIDATES_ANGSTROM.contains(d));
            assert!(*d >= d_corner);
            assert!(!rings[..i].contains(d), "duplicate ring {d}");
        }
    }

    #[test]
    fn test_ring_radius_tracks_zoom() {
        let meta = metadata(Some(12.4));
        let near = ViewerState {
            zoom: 1.0,
            ..Default::default()
        };
        let far = ViewerState {
            zoom: 0.5,
            ..Default::default()
        };
        let a = ring_radii(&meta, &near);
        let b = ring_radii(&meta, &far);
        assert_eq!(a.len(), b.len());
        for (ra, rb) in a.iter().zip(&b) {
            assert!((ra.radius / 2.0 - rb.radius).abs() < 1e-9);
        }
        // Higher resolution sits farther out.
        for pair in a.windows(2) {
            assert!(pair[0].d_spacing > pair[1].d_spacing);
            assert!(pair[0].radius < pair[1].radius);
        }
    }

    #[test]
    fn test_ring_radius_inverts_pixel_resolution() {
        let meta = metadata(Some(12.4));
        let view = ViewerState {
            zoom: 1.0,
            ..Default::default()
        };
        let ring = ring_radii(&meta, &view)[0];
        let d = pixel_resolution(2074.0 + ring.radius, 2181.0, &meta).unwrap();
        assert!((d - ring.d_spacing).abs() < 1e-9);
    }

    #[test]
    fn test_no_rings_when_panel_within_lowest_candidate() {
        let mut meta = metadata(Some(12.4));
        // Tiny panel around the beam: the corner is beyond 50 Å.
        meta.panel_size = (2, 2);
        meta.beam_center = (1.0, 1.0);
        assert!(ring_resolutions(&meta).is_empty());
    }

    #[test]
    fn test_label_alignment() {
        let a = LabelAlignment::from_direction(Point::new(0.7, -0.7));
        assert_eq!(a.horizontal, HorizontalAlign::Left);
        assert_eq!(a.vertical, VerticalAlign::Bottom);
        let a = LabelAlignment::from_direction(Point::new(-0.05, 0.99));
        assert_eq!(a.horizontal, HorizontalAlign::Center);
        assert_eq!(a.vertical, VerticalAlign::Top);
    }

    #[test]
    fn test_label_position_and_text() {
        let ring = ResolutionRing {
            d_spacing: 3.5,
            radius: 96.0,
            label_direction: Point::new(0.6, 0.8),
        };
        assert_eq!(ring.label_position(Point::new(10.0, 20.0)), Point::new(70.0, 100.0));
        assert_eq!(ring.label(), "3.5Å");
        let whole = ResolutionRing {
            d_spacing: 1.0,
            ..ring
        };
        assert_eq!(whole.label(), "1Å");
    }
}
