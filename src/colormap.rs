//! Closed set of continuous colormaps and their packed 24-bit colors.
//!
//! Names are resolved once (at settings construction) into a [`Colormap`];
//! drawing never looks a name up again.

use std::fmt;
use std::str::FromStr;

use gpui::Hsla;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VizError};

/// 24-bit RGB packed as `0xRRGGBB`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PackedColor(pub u32);

impl PackedColor {
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn b(self) -> u8 {
        self.0 as u8
    }

    pub fn to_hsla(self) -> Hsla {
        gpui::rgb(self.0).into()
    }

    pub fn to_hex(self) -> String {
        format!("#{:06x}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Colormap {
    RdBu,
    Reds,
    Oranges,
    PuOr,
    Blues,
    Turbo,
    Viridis,
    Magma,
    Bwr,
    Seismic,
    Coolwarm,
    Greys,
}

const RD_BU: &[u32] = &[
    0x67001f, 0xb2182b, 0xd6604d, 0xf4a582, 0xfddbc7, 0xf7f7f7, 0xd1e5f0, 0x92c5de, 0x4393c3,
    0x2166ac, 0x053061,
];
const REDS: &[u32] = &[
    0xfff5f0, 0xfee0d2, 0xfcbba1, 0xfc9272, 0xfb6a4a, 0xef3b2c, 0xcb181d, 0xa50f15, 0x67000d,
];
const ORANGES: &[u32] = &[
    0xfff5eb, 0xfee6ce, 0xfdd0a2, 0xfdae6b, 0xfd8d3c, 0xf16913, 0xd94801, 0xa63603, 0x7f2704,
];
const PU_OR: &[u32] = &[
    0x2d004b, 0x542788, 0x8073ac, 0xb2abd2, 0xd8daeb, 0xf7f7f7, 0xfee0b6, 0xfdb863, 0xe08214,
    0xb35806, 0x7f3b08,
];
const BLUES: &[u32] = &[
    0xf7fbff, 0xdeebf7, 0xc6dbef, 0x9ecae1, 0x6baed6, 0x4292c6, 0x2171b5, 0x08519c, 0x08306b,
];
const VIRIDIS: &[u32] = &[
    0x440154, 0x472d7b, 0x3b528b, 0x2c728e, 0x21918c, 0x28ae80, 0x5ec962, 0xaddc30, 0xfde725,
];
const MAGMA: &[u32] = &[
    0x000004, 0x1c1044, 0x4f127b, 0x812581, 0xb5367a, 0xe55064, 0xfb8761, 0xfec287, 0xfcfdbf,
];
const BWR: &[u32] = &[0x0000ff, 0xffffff, 0xff0000];
const SEISMIC: &[u32] = &[0x00004c, 0x0000ff, 0xffffff, 0xff0000, 0x7f0000];
const COOLWARM: &[u32] = &[0x3b4cc0, 0x8db0fe, 0xdddddd, 0xf49a7b, 0xb40426];
const GREYS: &[u32] = &[0xffffff, 0x000000];

impl Colormap {
    pub const ALL: [Colormap; 12] = [
        Self::RdBu,
        Self::Reds,
        Self::Oranges,
        Self::PuOr,
        Self::Blues,
        Self::Turbo,
        Self::Viridis,
        Self::Magma,
        Self::Bwr,
        Self::Seismic,
        Self::Coolwarm,
        Self::Greys,
    ];

    /// Resolves a symbolic name. Accepts d3-style (`interpolateRdBu`) and bare (`rdbu`) names.
    pub fn resolve(name: &str) -> Result<Self> {
        let key = name.trim().to_ascii_lowercase();
        let key = key.strip_prefix("interpolate").unwrap_or(&key);
        let cmap = match key {
            "rdbu" => Self::RdBu,
            "reds" => Self::Reds,
            "oranges" => Self::Oranges,
            "puor" => Self::PuOr,
            "blues" => Self::Blues,
            "turbo" => Self::Turbo,
            "viridis" => Self::Viridis,
            "magma" => Self::Magma,
            "bwr" => Self::Bwr,
            "seismic" => Self::Seismic,
            "coolwarm" => Self::Coolwarm,
            "greys" | "binary" => Self::Greys,
            _ => {
                return Err(VizError::UnknownColormap {
                    name: name.to_string(),
                })
            }
        };
        Ok(cmap)
    }

    /// Canonical d3 name, used on the wire.
    pub fn name(self) -> &'static str {
        match self {
            Self::RdBu => "interpolateRdBu",
            Self::Reds => "interpolateReds",
            Self::Oranges => "interpolateOranges",
            Self::PuOr => "interpolatePuOr",
            Self::Blues => "interpolateBlues",
            Self::Turbo => "interpolateTurbo",
            Self::Viridis => "interpolateViridis",
            Self::Magma => "interpolateMagma",
            Self::Bwr => "interpolateBwr",
            Self::Seismic => "interpolateSeismic",
            Self::Coolwarm => "interpolateCoolwarm",
            Self::Greys => "interpolateGreys",
        }
    }

    /// Evaluates the continuous colormap; returns channels in `[0, 255]` before rounding.
    pub fn sample(self, t: f64) -> [f64; 3] {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Turbo => turbo(t),
            Self::RdBu => ramp(RD_BU, t),
            Self::Reds => ramp(REDS, t),
            Self::Oranges => ramp(ORANGES, t),
            Self::PuOr => ramp(PU_OR, t),
            Self::Blues => ramp(BLUES, t),
            Self::Viridis => ramp(VIRIDIS, t),
            Self::Magma => ramp(MAGMA, t),
            Self::Bwr => ramp(BWR, t),
            Self::Seismic => ramp(SEISMIC, t),
            Self::Coolwarm => ramp(COOLWARM, t),
            Self::Greys => ramp(GREYS, t),
        }
    }

    pub fn color(self, t: f64) -> PackedColor {
        to_packed_color(self, t)
    }
}

/// Renders the continuous color at `value` and packs it for the rasterizer.
pub fn to_packed_color(cmap: Colormap, value: f64) -> PackedColor {
    let [r, g, b] = cmap.sample(value);
    let channel = |c: f64| c.round().clamp(0.0, 255.0) as u8;
    PackedColor::from_rgb(channel(r), channel(g), channel(b))
}

fn ramp(stops: &[u32], t: f64) -> [f64; 3] {
    let n = stops.len() - 1;
    let pos = t * n as f64;
    let i = (pos.floor() as usize).min(n - 1);
    let frac = pos - i as f64;
    let a = PackedColor(stops[i]);
    let b = PackedColor(stops[i + 1]);
    let lerp = |x: u8, y: u8| x as f64 + (y as f64 - x as f64) * frac;
    [lerp(a.r(), b.r()), lerp(a.g(), b.g()), lerp(a.b(), b.b())]
}

// Polynomial approximation of Google's Turbo.
fn turbo(t: f64) -> [f64; 3] {
    let r = 34.61 + t * (1172.33 - t * (10793.56 - t * (33300.12 - t * (38394.49 - t * 14825.05))));
    let g = 23.31 + t * (557.33 + t * (1225.33 - t * (3574.96 - t * (1073.77 + t * 707.56))));
    let b = 27.2 + t * (3211.1 - t * (15327.97 - t * (27814.0 - t * (22073.03 - t * 6838.66))));
    [r, g, b]
}

impl FromStr for Colormap {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self> {
        Self::resolve(s)
    }
}

impl TryFrom<String> for Colormap {
    type Error = VizError;

    fn try_from(s: String) -> Result<Self> {
        Self::resolve(&s)
    }
}

impl From<Colormap> for String {
    fn from(c: Colormap) -> Self {
        c.name().to_string()
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
