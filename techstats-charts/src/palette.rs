//! Fixed colour palettes for series.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb`
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

/// Palette for topic and language series.
pub const SERIES_PALETTE: [Color; 12] = [
    Color::rgb(0x8b, 0x5c, 0xf6),
    Color::rgb(0xfb, 0x92, 0x3c),
    Color::rgb(0x06, 0xb6, 0xd4),
    Color::rgb(0xf4, 0x72, 0xb6),
    Color::rgb(0x10, 0xb9, 0x81),
    Color::rgb(0xef, 0x44, 0x44),
    Color::rgb(0x60, 0xa5, 0xfa),
    Color::rgb(0xa7, 0x8b, 0xfa),
    Color::rgb(0xf5, 0x9e, 0x0b),
    Color::rgb(0x34, 0xd3, 0x99),
    Color::rgb(0xc0, 0x84, 0xfc),
    Color::rgb(0xf9, 0x73, 0x16),
];

/// Palette for the repository comparison chart.
pub const REPO_PALETTE: [Color; 6] = [
    Color::rgb(0xff, 0x63, 0x84),
    Color::rgb(0x36, 0xa2, 0xeb),
    Color::rgb(0xff, 0xce, 0x56),
    Color::rgb(0x4b, 0xc0, 0xc0),
    Color::rgb(0x99, 0x66, 0xff),
    Color::rgb(0xff, 0x9f, 0x40),
];

/// Colour for the series at `index`, wrapping around the palette.
///
/// An empty palette yields mid grey.
pub fn color_at(palette: &[Color], index: usize) -> Color {
    if palette.is_empty() {
        return Color::rgb(0x80, 0x80, 0x80);
    }
    palette[index % palette.len()]
}
