//! Named false-color palettes.
//!
//! A [`ColormapTable`] maps an 8-bit display intensity (the exposure LUT
//! output) to an opaque RGBA color. Tables are pure functions of the
//! [`ColormapName`] and are memoized by [`PipelineCache`](crate::PipelineCache).

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Entries per colormap table.
pub const COLORMAP_LEN: usize = 256;

/// The supported palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColormapName {
    Grayscale,
    Inverse,
    Heat,
    Rainbow,
}

impl ColormapName {
    pub const ALL: [ColormapName; 4] = [
        ColormapName::Grayscale,
        ColormapName::Inverse,
        ColormapName::Heat,
        ColormapName::Rainbow,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColormapName::Grayscale => "grayscale",
            ColormapName::Inverse => "inverse",
            ColormapName::Heat => "heat",
            ColormapName::Rainbow => "rainbow",
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ColormapName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColormapName {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColormapName::ALL
            .into_iter()
            .find(|name| name.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PipelineError::UnknownColormap(s.to_string()))
    }
}

/// 256 opaque RGBA entries.
#[derive(Clone, PartialEq, Eq)]
pub struct ColormapTable {
    name: ColormapName,
    entries: [[u8; 4]; COLORMAP_LEN],
}

impl fmt::Debug for ColormapTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColormapTable")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl ColormapTable {
    /// Precompute the table for `name`.
    pub fn build(name: ColormapName) -> Self {
        let map: fn(u8) -> [u8; 3] = match name {
            ColormapName::Grayscale => |v| [v, v, v],
            ColormapName::Inverse => |v| {
                let i = 255 - v;
                [i, i, i]
            },
            ColormapName::Heat => heat,
            ColormapName::Rainbow => rainbow,
        };

        let mut entries = [[0u8; 4]; COLORMAP_LEN];
        for (i, entry) in entries.iter_mut().enumerate() {
            let [r, g, b] = map(i as u8);
            *entry = [r, g, b, 255];
        }
        Self { name, entries }
    }

    pub fn name(&self) -> ColormapName {
        self.name
    }

    /// RGBA for a display intensity.
    #[inline]
    pub fn color(&self, index: u8) -> [u8; 4] {
        self.entries[index as usize]
    }

    pub fn entries(&self) -> &[[u8; 4]; COLORMAP_LEN] {
        &self.entries
    }
}

/// Black → red → yellow → white, one third of the domain each.
fn heat(v: u8) -> [u8; 3] {
    let v = v as u16;
    if v < 85 {
        [(v * 3) as u8, 0, 0]
    } else if v < 170 {
        [255, ((v - 85) * 3) as u8, 0]
    } else {
        [255, 255, ((v - 170) * 3).min(255) as u8]
    }
}

/// Hue sweep 0°–300° at full saturation, lightness 0.5.
fn rainbow(v: u8) -> [u8; 3] {
    let h = v as f64 / 255.0 * 300.0;
    let saturation = 1.0;
    let lightness = 0.5;
    let c = (1.0 - (2.0 * lightness - 1.0f64).abs()) * saturation;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = lightness - c / 2.0;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    let channel = |value: f64| ((value + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [channel(r), channel(g), channel(b)]
}
